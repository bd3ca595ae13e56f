//! Artifact acquisition: picks the transport by URL scheme and skips
//! entirely when the artifact already exists.
//!
//! Only a [`AcquireStatus::Fetched`] result makes the caller verify; an
//! artifact that was already present was verified by the run that fetched it.

use crate::error::{Error, Result};
use crate::request::{DownloadSpec, Source};
use crate::storage::Filesystem;
use crate::transport::{FetchOptions, LocalCopier, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireStatus {
    /// The artifact was transferred during this run.
    Fetched,
    AlreadyPresent,
}

pub struct ArtifactAcquirer<'a> {
    fs: &'a dyn Filesystem,
    transport: &'a dyn Transport,
    copier: &'a dyn LocalCopier,
}

impl<'a> ArtifactAcquirer<'a> {
    pub fn new(
        fs: &'a dyn Filesystem,
        transport: &'a dyn Transport,
        copier: &'a dyn LocalCopier,
    ) -> Self {
        Self {
            fs,
            transport,
            copier,
        }
    }

    pub fn acquire(&self, spec: &DownloadSpec) -> Result<AcquireStatus> {
        let path = spec.artifact_path();
        if self.fs.exists(&path) {
            tracing::debug!(path = %path.display(), "artifact already present");
            return Ok(AcquireStatus::AlreadyPresent);
        }

        match &spec.source {
            Source::Remote(_) => {
                let opts = FetchOptions {
                    insecure: spec.allow_insecure,
                    follow_redirects: spec.follow_redirects,
                    timeout: spec.timeout,
                };
                self.transport
                    .fetch(&spec.url, &path, &opts)
                    .map_err(|source| {
                        if source.is_timeout() {
                            Error::TransportTimeout {
                                url: spec.url.clone(),
                                timeout_secs: spec.timeout.as_secs(),
                            }
                        } else {
                            Error::Transport {
                                url: spec.url.clone(),
                                source,
                            }
                        }
                    })?;
            }
            Source::LocalCopy(src) => {
                // The copy is verified against an inline digest written beforehand.
                if spec.checksum && !self.fs.exists(&spec.digest_path()) {
                    return Err(Error::MissingDigest {
                        url: spec.url.clone(),
                    });
                }
                self.copier
                    .copy(src, &path)
                    .map_err(|e| Error::io("copy", src, e))?;
            }
        }

        tracing::info!(url = %spec.url, path = %path.display(), "acquired artifact");
        Ok(AcquireStatus::Fetched)
    }

    /// Deletes the artifact. Missing is fine.
    pub fn remove(&self, spec: &DownloadSpec) -> Result<()> {
        self.fs.remove(&spec.artifact_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SrcfetchConfig;
    use crate::request::DownloadRequest;
    use crate::storage::LocalFs;
    use crate::transport::{FsCopier, TransportError};
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeTransport {
        calls: Mutex<Vec<(String, FetchOptions)>>,
        fail_timeout: bool,
    }

    impl Transport for FakeTransport {
        fn fetch(&self, url: &str, dest: &Path, opts: &FetchOptions) -> Result<(), TransportError> {
            self.calls.lock().unwrap().push((url.to_string(), *opts));
            if self.fail_timeout {
                return Err(TransportError::Curl(curl::Error::new(28)));
            }
            std::fs::write(dest, b"artifact").unwrap();
            Ok(())
        }
    }

    fn spec(dir: &Path, url: &str, f: impl FnOnce(&mut DownloadRequest)) -> DownloadSpec {
        let mut req = DownloadRequest::new("a.tar.gz", url);
        req.src_target = Some(dir.to_path_buf());
        f(&mut req);
        req.resolve(&SrcfetchConfig::default()).unwrap()
    }

    #[test]
    fn remote_fetch_passes_flags() {
        let dir = tempfile::tempdir().unwrap();
        let transport = FakeTransport::default();
        let acq = ArtifactAcquirer::new(&LocalFs, &transport, &FsCopier);
        let spec = spec(dir.path(), "https://x/a.tar.gz", |r| {
            r.allow_insecure = Some(true);
            r.follow_redirects = Some(true);
            r.timeout = Some(7);
        });

        assert_eq!(acq.acquire(&spec).unwrap(), AcquireStatus::Fetched);
        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://x/a.tar.gz");
        assert!(calls[0].1.insecure);
        assert!(calls[0].1.follow_redirects);
        assert_eq!(calls[0].1.timeout.as_secs(), 7);
    }

    #[test]
    fn existing_artifact_not_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let transport = FakeTransport::default();
        let acq = ArtifactAcquirer::new(&LocalFs, &transport, &FsCopier);
        let spec = spec(dir.path(), "http://x/a.tar.gz", |_| {});
        std::fs::write(spec.artifact_path(), b"old").unwrap();

        assert_eq!(acq.acquire(&spec).unwrap(), AcquireStatus::AlreadyPresent);
        assert!(transport.calls.lock().unwrap().is_empty());
        assert_eq!(std::fs::read(spec.artifact_path()).unwrap(), b"old");
    }

    #[test]
    fn timeout_surfaces_as_transport_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let transport = FakeTransport {
            fail_timeout: true,
            ..FakeTransport::default()
        };
        let acq = ArtifactAcquirer::new(&LocalFs, &transport, &FsCopier);
        let spec = spec(dir.path(), "http://x/a.tar.gz", |r| r.timeout = Some(3));
        match acq.acquire(&spec) {
            Err(Error::TransportTimeout { timeout_secs, .. }) => assert_eq!(timeout_secs, 3),
            other => panic!("expected TransportTimeout, got {:?}", other),
        }
    }

    #[test]
    fn local_copy_requires_digest_record_first() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("source.tar.gz");
        std::fs::write(&src, b"local").unwrap();
        let url = format!("file://{}", src.display());
        let transport = FakeTransport::default();
        let acq = ArtifactAcquirer::new(&LocalFs, &transport, &FsCopier);
        let spec = spec(dir.path(), &url, |r| r.digest_string = Some("abc".into()));

        assert!(matches!(acq.acquire(&spec), Err(Error::MissingDigest { .. })));
        assert!(!spec.artifact_path().exists());

        std::fs::write(spec.digest_path(), b"abc *a.tar.gz").unwrap();
        assert_eq!(acq.acquire(&spec).unwrap(), AcquireStatus::Fetched);
        assert_eq!(std::fs::read(spec.artifact_path()).unwrap(), b"local");
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn local_copy_without_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("source.tar.gz");
        std::fs::write(&src, b"local").unwrap();
        let url = format!("file://{}", src.display());
        let transport = FakeTransport::default();
        let acq = ArtifactAcquirer::new(&LocalFs, &transport, &FsCopier);
        let spec = spec(dir.path(), &url, |r| r.checksum = Some(false));
        assert_eq!(acq.acquire(&spec).unwrap(), AcquireStatus::Fetched);
    }

    #[test]
    fn missing_local_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("file://{}", dir.path().join("missing").display());
        let transport = FakeTransport::default();
        let acq = ArtifactAcquirer::new(&LocalFs, &transport, &FsCopier);
        let spec = spec(dir.path(), &url, |r| r.checksum = Some(false));
        assert!(matches!(acq.acquire(&spec), Err(Error::Io { op: "copy", .. })));
        assert!(!spec.artifact_path().exists());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let transport = FakeTransport::default();
        let acq = ArtifactAcquirer::new(&LocalFs, &transport, &FsCopier);
        let spec = spec(dir.path(), "http://x/a.tar.gz", |_| {});
        std::fs::write(spec.artifact_path(), b"x").unwrap();
        acq.remove(&spec).unwrap();
        acq.remove(&spec).unwrap();
        assert!(!spec.artifact_path().exists());
    }
}
