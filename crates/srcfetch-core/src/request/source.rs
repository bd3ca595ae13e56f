//! Transport classification of a source URL.

use std::path::PathBuf;

use url::Url;

use crate::error::Error;

/// Schemes fetched through the remote transport.
pub const REMOTE_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Scheme copied from the local filesystem.
pub const LOCAL_COPY_SCHEME: &str = "file";

/// Where the artifact comes from, decided by URL scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Fetched by the transport collaborator (http, https, ftp).
    Remote(Url),
    /// Copied from a local path (`file://`). No digest can be fetched for it.
    LocalCopy(PathBuf),
}

impl Source {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let unsupported = |reason: String| Error::UnsupportedScheme {
            url: raw.to_string(),
            reason,
        };
        let url = Url::parse(raw).map_err(|e| unsupported(e.to_string()))?;
        let scheme = url.scheme();
        if REMOTE_SCHEMES.contains(&scheme) {
            if url.host_str().map_or(true, str::is_empty) {
                return Err(unsupported("missing host".to_string()));
            }
            return Ok(Source::Remote(url));
        }
        if scheme == LOCAL_COPY_SCHEME {
            let path = url
                .to_file_path()
                .map_err(|()| unsupported("file url is not an absolute local path".to_string()))?;
            return Ok(Source::LocalCopy(path));
        }
        Err(unsupported(format!(
            "scheme {:?} is neither remote ({}) nor local-copy ({})",
            scheme,
            REMOTE_SCHEMES.join(", "),
            LOCAL_COPY_SCHEME
        )))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Source::Remote(_))
    }
}
