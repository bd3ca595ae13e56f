//! Materializes the digest record before the artifact is acquired.
//!
//! Source priority: inline `digest_string`, then `digest_url`, then
//! `{url}.{digest_type}`. Exactly one applies per run. The record file's
//! existence marks a completed remote fetch.

use super::record_line;
use crate::error::{Error, Result};
use crate::request::{DownloadSpec, Source};
use crate::storage::Filesystem;
use crate::transport::{FetchOptions, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestStatus {
    /// The record was written or fetched during this run.
    Created,
    /// A record with the expected content or from a previous fetch exists.
    AlreadyPresent,
    /// Checksum is disabled; no digest work done.
    Skipped,
}

pub struct DigestResolver<'a> {
    fs: &'a dyn Filesystem,
    transport: &'a dyn Transport,
}

impl<'a> DigestResolver<'a> {
    pub fn new(fs: &'a dyn Filesystem, transport: &'a dyn Transport) -> Self {
        Self { fs, transport }
    }

    pub fn ensure_digest(&self, spec: &DownloadSpec) -> Result<DigestStatus> {
        if !spec.checksum {
            tracing::info!(
                name = %spec.name,
                "checksum disabled: no digest will be fetched and the artifact will not be verified"
            );
            return Ok(DigestStatus::Skipped);
        }

        match &spec.digest_string {
            Some(digest) => self.write_inline(spec, digest),
            None => self.fetch_remote(spec),
        }
    }

    fn write_inline(&self, spec: &DownloadSpec, digest: &str) -> Result<DigestStatus> {
        let path = spec.digest_path();
        let content = record_line(digest, &spec.name);
        if self.fs.read(&path)?.as_deref() == Some(content.as_bytes()) {
            tracing::debug!(path = %path.display(), "inline digest record up to date");
            return Ok(DigestStatus::AlreadyPresent);
        }
        self.fs.write(&path, content.as_bytes())?;
        tracing::info!(path = %path.display(), "wrote inline digest record");
        Ok(DigestStatus::Created)
    }

    fn fetch_remote(&self, spec: &DownloadSpec) -> Result<DigestStatus> {
        if let Source::LocalCopy(_) = spec.source {
            return Err(Error::MissingDigest {
                url: spec.url.clone(),
            });
        }

        let path = spec.digest_path();
        if self.fs.exists(&path) {
            tracing::debug!(path = %path.display(), "digest record already fetched");
            return Ok(DigestStatus::AlreadyPresent);
        }

        let src = spec.digest_source();
        let opts = FetchOptions {
            insecure: spec.allow_insecure,
            follow_redirects: spec.follow_redirects,
            timeout: spec.timeout,
        };
        self.transport
            .fetch(&src, &path, &opts)
            .map_err(|source| {
                if source.is_timeout() {
                    Error::TransportTimeout {
                        url: src.clone(),
                        timeout_secs: spec.timeout.as_secs(),
                    }
                } else {
                    Error::DigestFetch {
                        url: src.clone(),
                        source,
                    }
                }
            })?;
        tracing::info!(url = %src, path = %path.display(), "fetched digest record");
        Ok(DigestStatus::Created)
    }

    /// Deletes the digest record. Missing is fine.
    pub fn remove_digest(&self, spec: &DownloadSpec) -> Result<()> {
        self.fs.remove(&spec.digest_path())
    }
}
