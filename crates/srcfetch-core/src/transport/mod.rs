//! Byte-transfer collaborators: the remote [`Transport`] and the
//! [`LocalCopier`] used for `file://` sources.
//!
//! Both contracts require that `dest` is created only on success; an
//! implementation must never leave a partially written `dest` behind.

mod remote;
mod local;

pub use remote::CurlTransport;
pub use local::FsCopier;

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Per-transfer flags derived from the download spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Skip TLS certificate verification (`-k`).
    pub insecure: bool,
    /// Follow redirects (`-L`).
    pub follow_redirects: bool,
    /// Hard limit for the whole transfer.
    pub timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Curl(#[from] curl::Error),

    #[error("{url} returned HTTP {code}")]
    Http { url: String, code: u32 },

    #[error("writing {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transport tool unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Curl(e) if e.is_operation_timedout())
    }
}

pub trait Transport: Send + Sync {
    /// Makes sure the transfer tool is usable. Idempotent.
    fn ensure_present(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn fetch(&self, url: &str, dest: &Path, opts: &FetchOptions) -> Result<(), TransportError>;
}

pub trait LocalCopier: Send + Sync {
    fn copy(&self, source: &Path, dest: &Path) -> std::io::Result<()>;
}

/// Wraps a transport so that `ensure_present` runs once, lazily, right
/// before the first fetch. A failed check is retried on the next fetch.
pub struct LazyTransport {
    inner: Arc<dyn Transport>,
    ready: OnceLock<()>,
}

impl LazyTransport {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self {
            inner,
            ready: OnceLock::new(),
        }
    }

    fn prepare(&self) -> Result<(), TransportError> {
        if self.ready.get().is_none() {
            self.inner.ensure_present()?;
            let _ = self.ready.set(());
        }
        Ok(())
    }
}

impl Transport for LazyTransport {
    fn ensure_present(&self) -> Result<(), TransportError> {
        self.prepare()
    }

    fn fetch(&self, url: &str, dest: &Path, opts: &FetchOptions) -> Result<(), TransportError> {
        self.prepare()?;
        self.inner.fetch(url, dest, opts)
    }
}
