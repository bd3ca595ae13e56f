//! Download requests: raw input from CLI flags or a manifest, and the
//! validated, immutable [`DownloadSpec`] the engine runs on.
//!
//! All shape errors (ensure value, digest type, scheme, missing inline digest
//! for local copies) are raised here, before anything touches the disk.

mod source;

pub use source::{Source, LOCAL_COPY_SCHEME, REMOTE_SCHEMES};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::config::SrcfetchConfig;
use crate::digest::{record_file_name, DigestType};
use crate::error::Error;

/// Desired end state of the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

impl FromStr for Ensure {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Ensure::Present),
            "absent" => Ok(Ensure::Absent),
            other => Err(Error::InvalidState(other.to_string())),
        }
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Ensure::Present => "present",
            Ensure::Absent => "absent",
        })
    }
}

/// Unvalidated request. Unset fields fall back to [`SrcfetchConfig`] defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadRequest {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub ensure: Option<String>,
    #[serde(default)]
    pub checksum: Option<bool>,
    #[serde(default)]
    pub digest_url: Option<String>,
    #[serde(default)]
    pub digest_string: Option<String>,
    #[serde(default)]
    pub digest_type: Option<String>,
    /// Transfer timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub src_target: Option<PathBuf>,
    #[serde(default)]
    pub allow_insecure: Option<bool>,
    #[serde(default)]
    pub follow_redirects: Option<bool>,
}

impl DownloadRequest {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Validates the request and fills defaults from `cfg`.
    pub fn resolve(self, cfg: &SrcfetchConfig) -> Result<DownloadSpec, Error> {
        let ensure = match self.ensure.as_deref() {
            Some(s) => s.parse()?,
            None => Ensure::Present,
        };
        let digest_type = match self.digest_type.as_deref() {
            Some(s) => s.parse()?,
            None => cfg.digest_type,
        };
        validate_name(&self.name)?;
        let source = Source::parse(&self.url)?;

        let timeout_secs = self.timeout.unwrap_or(cfg.timeout_secs);
        if timeout_secs == 0 {
            return Err(Error::Config("timeout must be at least one second".into()));
        }

        let spec = DownloadSpec {
            name: self.name,
            url: self.url,
            source,
            ensure,
            digest_url: non_empty(self.digest_url),
            digest_string: non_empty(self.digest_string),
            digest_type,
            timeout: Duration::from_secs(timeout_secs),
            target_dir: self.src_target.unwrap_or_else(|| cfg.src_target.clone()),
            allow_insecure: self.allow_insecure.unwrap_or(cfg.allow_insecure),
            follow_redirects: self.follow_redirects.unwrap_or(cfg.follow_redirects),
            checksum: self.checksum.unwrap_or(cfg.checksum),
        };

        if spec.ensure == Ensure::Present
            && spec.checksum
            && !spec.source.is_remote()
            && spec.digest_string.is_none()
        {
            return Err(Error::MissingDigest { url: spec.url });
        }
        Ok(spec)
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Artifact names are single path components inside the target directory.
fn validate_name(name: &str) -> Result<(), Error> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\0')
    {
        return Err(Error::Config(format!(
            "artifact name {:?} must be a plain file name",
            name
        )));
    }
    Ok(())
}

/// Validated, immutable description of one acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSpec {
    pub name: String,
    pub url: String,
    pub source: Source,
    pub ensure: Ensure,
    pub digest_url: Option<String>,
    pub digest_string: Option<String>,
    pub digest_type: DigestType,
    pub timeout: Duration,
    pub target_dir: PathBuf,
    pub allow_insecure: bool,
    pub follow_redirects: bool,
    pub checksum: bool,
}

impl DownloadSpec {
    /// `{targetDir}/{name}`
    pub fn artifact_path(&self) -> PathBuf {
        self.target_dir.join(&self.name)
    }

    /// `{targetDir}/{name}.{digestType}`
    pub fn digest_path(&self) -> PathBuf {
        self.target_dir
            .join(record_file_name(&self.name, self.digest_type))
    }

    /// Remote location of the digest: explicit `digest_url`, else `{url}.{digestType}`.
    pub fn digest_source(&self) -> String {
        match &self.digest_url {
            Some(u) => u.clone(),
            None => format!("{}.{}", self.url, self.digest_type),
        }
    }

    /// Identity used to detect two specs racing on the same files.
    pub fn target_key(&self) -> (&Path, &str) {
        (&self.target_dir, &self.name)
    }
}
