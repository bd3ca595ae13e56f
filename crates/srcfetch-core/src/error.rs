//! Error taxonomy for the acquisition engine.
//!
//! Configuration-shape errors (`UnsupportedDigest`, `UnsupportedScheme`,
//! `MissingDigest`, `InvalidState`) are raised before any file is touched.
//! `VerificationFailed` is raised only after both files were rolled back.

use std::path::PathBuf;

use crate::transport::TransportError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported digest type {0:?} (expected one of md5, sha1, sha224, sha256, sha384, sha512)")]
    UnsupportedDigest(String),

    #[error("unsupported url scheme in {url:?}: {reason}")]
    UnsupportedScheme { url: String, reason: String },

    #[error("{url} is a local-copy source; an inline digest string is required when checksum is enabled")]
    MissingDigest { url: String },

    #[error("failed to fetch digest from {url}")]
    DigestFetch {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("transfer of {url} timed out after {timeout_secs}s")]
    TransportTimeout { url: String, timeout_secs: u64 },

    #[error("transfer of {url} failed")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error(
        "checksum verification failed for {} ({command} exited with {exit_code}); artifact and digest removed",
        artifact.display()
    )]
    VerificationFailed {
        artifact: PathBuf,
        command: String,
        exit_code: i32,
    },

    #[error("invalid ensure value {0:?} (expected present or absent)")]
    InvalidState(String),

    #[error("could not run checksum command {command:?}")]
    Command {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{op} {}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
