//! Filesystem collaborator and file lifecycle helpers.
//!
//! Existence checks, writes and deletes are synchronous and idempotent.
//! Transfers land in a `.part` sibling first and are renamed into place, so a
//! failed transfer never leaves a partially written destination.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.tar.gz` → `a.tar.gz.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Moves a completed temp file onto its final path.
pub fn finalize(temp: &Path, final_path: &Path) -> io::Result<()> {
    fs::rename(temp, final_path)
}

/// Best-effort removal of a temp file after a failed transfer.
pub fn discard(temp: &Path) {
    if let Err(e) = fs::remove_file(temp) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %temp.display(), "could not remove temp file: {}", e);
        }
    }
}

pub trait Filesystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Reads `path`, or `None` if it does not exist.
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>>;

    /// Writes `bytes` to `path`, replacing any previous content.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Deletes `path`. A missing file is not an error.
    fn remove(&self, path: &Path) -> Result<()>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;
}

/// [`Filesystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl Filesystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io("read", path, e)),
        }
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let temp = temp_path(path);
        fs::write(&temp, bytes).map_err(|e| Error::io("write", &temp, e))?;
        finalize(&temp, path).map_err(|e| {
            discard(&temp);
            Error::io("rename into", path, e)
        })
    }

    fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "deleted file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io("remove", path, e)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| Error::io("create directory", path, e))
    }
}
