//! srcfetch core: idempotent, checksum-verified acquisition of source
//! archives into a target directory.
//!
//! [`reconcile::StateReconciler`] drives a validated
//! [`request::DownloadSpec`] to its desired end state (present or absent)
//! through the digest resolver, artifact acquirer and verification gate.

pub mod config;
pub mod error;
pub mod logging;

pub mod acquire;
pub mod batch;
pub mod checksum;
pub mod command;
pub mod digest;
pub mod manifest;
pub mod reconcile;
pub mod request;
pub mod retry;
pub mod storage;
pub mod transport;
pub mod verify;

pub use error::{Error, Result};
