use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::digest::DigestType;
use crate::error::Error;
use crate::retry::RetryPolicy;

/// Transport retry parameters (optional section in config.toml).
/// Without this section every transfer is attempted exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per transfer (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    /// Fails on a base delay that is negative, NaN or too large for a `Duration`.
    pub fn policy(&self) -> Result<RetryPolicy, Error> {
        let base_delay = Duration::try_from_secs_f64(self.base_delay_secs).map_err(|e| {
            Error::Config(format!(
                "retry.base_delay_secs = {}: {}",
                self.base_delay_secs, e
            ))
        })?;
        Ok(RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(self.max_delay_secs),
        })
    }
}

/// How checksum commands are executed: in process for the sha2 family
/// (falling back to the system tool for md5/sha1), or always via the system tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verifier {
    #[default]
    Builtin,
    System,
}

/// Global configuration loaded from `~/.config/srcfetch/config.toml`.
/// Values are defaults for requests that leave the matching field unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrcfetchConfig {
    /// Transfer timeout in seconds.
    pub timeout_secs: u64,
    /// Directory holding artifacts and their digest records.
    pub src_target: PathBuf,
    pub digest_type: DigestType,
    /// Verify fresh downloads against a digest record.
    pub checksum: bool,
    /// Skip TLS peer and host verification (curl `-k`).
    pub allow_insecure: bool,
    /// Follow HTTP redirects (curl `-L`).
    pub follow_redirects: bool,
    #[serde(default)]
    pub verifier: Verifier,
    /// Optional proxy URL passed to libcurl.
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for SrcfetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            src_target: PathBuf::from("/usr/src"),
            digest_type: DigestType::Md5,
            checksum: true,
            allow_insecure: false,
            follow_redirects: false,
            verifier: Verifier::Builtin,
            proxy: None,
            retry: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("srcfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SrcfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SrcfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SrcfetchConfig = toml::from_str(&data)?;
    if let Some(retry) = &cfg.retry {
        retry.policy()?;
    }
    Ok(cfg)
}
