//! Remote transport over libcurl (http, https, ftp).
//!
//! Streams the body into `{dest}.part` and renames it onto `dest` once the
//! transfer and status check succeed.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use super::{FetchOptions, Transport, TransportError};
use crate::request::REMOTE_SCHEMES;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::storage;

const MAX_REDIRECTS: u32 = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CurlTransport {
    proxy: Option<String>,
    retry: RetryPolicy,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            proxy: None,
            retry: RetryPolicy::once(),
        }
    }
}

impl CurlTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn fetch_once(&self, url: &str, dest: &Path, opts: &FetchOptions) -> Result<(), TransportError> {
        let temp = storage::temp_path(dest);
        let mut file = File::create(&temp).map_err(|source| TransportError::Storage {
            path: temp.clone(),
            source,
        })?;

        let result = self
            .transfer(url, &mut file, &temp, opts)
            .and_then(|()| {
                file.sync_all().map_err(|source| TransportError::Storage {
                    path: temp.clone(),
                    source,
                })
            });
        drop(file);

        match result {
            Ok(()) => storage::finalize(&temp, dest).map_err(|source| {
                storage::discard(&temp);
                TransportError::Storage {
                    path: dest.to_path_buf(),
                    source,
                }
            }),
            Err(e) => {
                storage::discard(&temp);
                Err(e)
            }
        }
    }

    fn transfer(
        &self,
        url: &str,
        file: &mut File,
        temp: &Path,
        opts: &FetchOptions,
    ) -> Result<(), TransportError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(opts.follow_redirects)?;
        if opts.follow_redirects {
            easy.max_redirections(MAX_REDIRECTS)?;
        }
        if opts.insecure {
            easy.ssl_verify_peer(false)?;
            easy.ssl_verify_host(false)?;
        }
        if let Some(proxy) = &self.proxy {
            easy.proxy(proxy)?;
        }
        easy.connect_timeout(CONNECT_TIMEOUT.min(opts.timeout))?;
        easy.timeout(opts.timeout)?;

        let mut write_error: Option<std::io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match file.write_all(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    write_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Some(source) = write_error {
            return Err(TransportError::Storage {
                path: temp.to_path_buf(),
                source,
            });
        }
        performed?;

        if url.starts_with("http") {
            let code = easy.response_code()?;
            if !(200..300).contains(&code) {
                return Err(TransportError::Http {
                    url: url.to_string(),
                    code,
                });
            }
        }
        Ok(())
    }
}

impl Transport for CurlTransport {
    /// Checks that the linked libcurl can speak HTTP at all; other remote
    /// schemes it lacks are logged and fail at transfer time.
    fn ensure_present(&self) -> Result<(), TransportError> {
        let version = curl::Version::get();
        let protocols: Vec<&str> = version.protocols().collect();
        if !protocols.contains(&"http") {
            return Err(TransportError::Unavailable(format!(
                "libcurl {} was built without http support",
                version.version()
            )));
        }
        let missing: Vec<&str> = REMOTE_SCHEMES
            .iter()
            .copied()
            .filter(|s| !protocols.contains(s))
            .collect();
        if !missing.is_empty() {
            tracing::warn!("libcurl {} lacks {}", version.version(), missing.join(", "));
        }
        tracing::debug!("using libcurl {}", version.version());
        Ok(())
    }

    fn fetch(&self, url: &str, dest: &Path, opts: &FetchOptions) -> Result<(), TransportError> {
        tracing::debug!(url, dest = %dest.display(), timeout_secs = opts.timeout.as_secs(), "fetch");
        run_with_retry(&self.retry, || self.fetch_once(url, dest, opts))
    }
}
