//! TOML manifest listing several downloads:
//!
//! ```toml
//! [[download]]
//! name = "nginx-1.26.2.tar.gz"
//! url = "https://nginx.org/download/nginx-1.26.2.tar.gz"
//! digest_type = "sha256"
//! digest_string = "..."
//! ```
//!
//! Every entry is validated, and duplicate `(src_target, name)` pairs are
//! rejected, before anything runs: two entries on the same files would race.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::config::SrcfetchConfig;
use crate::error::{Error, Result};
use crate::request::{DownloadRequest, DownloadSpec};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, rename = "download")]
    pub downloads: Vec<DownloadRequest>,
}

impl Manifest {
    pub fn parse(data: &str) -> Result<Self> {
        toml::from_str(data).map_err(|e| Error::Config(format!("manifest: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| Error::io("read manifest", path, e))?;
        Self::parse(&data)
    }

    /// Resolves every entry against `cfg`. Fails on the first invalid entry
    /// or on two entries sharing a target file.
    pub fn resolve(self, cfg: &SrcfetchConfig) -> Result<Vec<DownloadSpec>> {
        let mut specs = Vec::with_capacity(self.downloads.len());
        for (i, req) in self.downloads.into_iter().enumerate() {
            let name = req.name.clone();
            let spec = req.resolve(cfg).map_err(|e| {
                tracing::error!(entry = i, %name, "invalid manifest entry: {}", e);
                e
            })?;
            specs.push(spec);
        }

        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.target_key()) {
                return Err(Error::Config(format!(
                    "manifest lists {} in {} more than once",
                    spec.name,
                    spec.target_dir.display()
                )));
            }
        }
        Ok(specs)
    }
}
