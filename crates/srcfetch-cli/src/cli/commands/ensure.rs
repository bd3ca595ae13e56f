//! `srcfetch ensure <name> <url>` – reconcile a single archive.

use anyhow::{Context, Result};
use srcfetch_core::acquire::AcquireStatus;
use srcfetch_core::config::SrcfetchConfig;
use srcfetch_core::digest::DigestStatus;
use srcfetch_core::reconcile::{Outcome, StateReconciler};
use srcfetch_core::request::DownloadRequest;
use std::path::PathBuf;

/// Flags of `srcfetch ensure`, before config defaults are applied.
#[derive(Debug)]
pub struct EnsureArgs {
    pub name: String,
    pub url: String,
    pub ensure: String,
    pub checksum: Option<bool>,
    pub digest_url: Option<String>,
    pub digest_string: Option<String>,
    pub digest_type: Option<String>,
    pub timeout: Option<u64>,
    pub src_target: Option<PathBuf>,
    pub allow_insecure: Option<bool>,
    pub follow_redirects: Option<bool>,
}

impl EnsureArgs {
    /// Unset options fall back to the config.
    fn into_request(self) -> DownloadRequest {
        DownloadRequest {
            name: self.name,
            url: self.url,
            ensure: Some(self.ensure),
            checksum: self.checksum,
            digest_url: self.digest_url,
            digest_string: self.digest_string,
            digest_type: self.digest_type,
            timeout: self.timeout,
            src_target: self.src_target,
            allow_insecure: self.allow_insecure,
            follow_redirects: self.follow_redirects,
        }
    }
}

pub async fn run_ensure(cfg: &SrcfetchConfig, args: EnsureArgs) -> Result<()> {
    let spec = args.into_request().resolve(cfg)?;
    let reconciler = StateReconciler::from_config(cfg)?;
    let name = spec.name.clone();

    // libcurl and the checksum runner block.
    let outcome = tokio::task::spawn_blocking(move || reconciler.reconcile(&spec))
        .await
        .context("reconcile task join")??;

    println!("{}: {}", name, describe(&outcome));
    Ok(())
}

/// One-line human summary of an outcome.
pub(crate) fn describe(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Absent => "absent",
        Outcome::Present {
            artifact: AcquireStatus::Fetched,
            verified: true,
            ..
        } => "fetched and verified",
        Outcome::Present {
            artifact: AcquireStatus::Fetched,
            digest: DigestStatus::Skipped,
            ..
        } => "fetched (checksum disabled)",
        Outcome::Present {
            artifact: AcquireStatus::Fetched,
            ..
        } => "fetched",
        Outcome::Present {
            digest: DigestStatus::Created,
            ..
        } => "already present, digest record updated",
        Outcome::Present { .. } => "already present",
    }
}
