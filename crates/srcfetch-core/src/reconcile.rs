//! Top-level present/absent state machine.
//!
//! There is no persisted state besides the two files themselves:
//! `{target}/{name}` and `{target}/{name}.{digest_type}`.
//!
//! Present: digest record, then artifact, then (fresh artifact and checksum
//! enabled only) verification with rollback on mismatch.
//! Absent: delete both files, whatever exists.

use std::sync::Arc;

use crate::acquire::{AcquireStatus, ArtifactAcquirer};
use crate::command::{BuiltinChecksumRunner, CommandRunner, SystemCommandRunner};
use crate::config::{SrcfetchConfig, Verifier};
use crate::digest::{DigestResolver, DigestStatus};
use crate::error::{Error, Result};
use crate::request::{DownloadSpec, Ensure};
use crate::retry::RetryPolicy;
use crate::storage::{Filesystem, LocalFs};
use crate::transport::{CurlTransport, FsCopier, LazyTransport, LocalCopier, Transport};
use crate::verify::{VerificationGate, VerifyResult};

/// What a reconciliation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Present {
        digest: DigestStatus,
        artifact: AcquireStatus,
        /// True when the checksum command ran and matched during this run.
        verified: bool,
    },
    Absent,
}

impl Outcome {
    /// True when this run changed anything on disk (or, for absent, may have).
    pub fn changed(&self) -> bool {
        match self {
            Outcome::Present {
                digest, artifact, ..
            } => *digest == DigestStatus::Created || *artifact == AcquireStatus::Fetched,
            Outcome::Absent => true,
        }
    }
}

pub struct StateReconciler {
    fs: Arc<dyn Filesystem>,
    transport: LazyTransport,
    copier: Arc<dyn LocalCopier>,
    runner: Arc<dyn CommandRunner>,
}

impl StateReconciler {
    pub fn new(
        fs: Arc<dyn Filesystem>,
        transport: Arc<dyn Transport>,
        copier: Arc<dyn LocalCopier>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            fs,
            transport: LazyTransport::new(transport),
            copier,
            runner,
        }
    }

    /// Production wiring: libcurl transport, local filesystem, and the
    /// checksum runner selected by `cfg.verifier`. Fails on an invalid
    /// `[retry]` section.
    pub fn from_config(cfg: &SrcfetchConfig) -> Result<Self> {
        let retry = match &cfg.retry {
            Some(r) => r.policy()?,
            None => RetryPolicy::once(),
        };
        let transport = CurlTransport::new()
            .with_proxy(cfg.proxy.clone())
            .with_retry(retry);
        let runner: Arc<dyn CommandRunner> = match cfg.verifier {
            Verifier::Builtin => Arc::new(BuiltinChecksumRunner::new()),
            Verifier::System => Arc::new(SystemCommandRunner),
        };
        Ok(Self::new(
            Arc::new(LocalFs),
            Arc::new(transport),
            Arc::new(FsCopier),
            runner,
        ))
    }

    pub fn reconcile(&self, spec: &DownloadSpec) -> Result<Outcome> {
        tracing::info!(name = %spec.name, url = %spec.url, ensure = %spec.ensure, "reconciling");
        match spec.ensure {
            Ensure::Present => self.present(spec),
            Ensure::Absent => self.absent(spec),
        }
    }

    fn resolver(&self) -> DigestResolver<'_> {
        DigestResolver::new(self.fs.as_ref(), &self.transport)
    }

    fn acquirer(&self) -> ArtifactAcquirer<'_> {
        ArtifactAcquirer::new(self.fs.as_ref(), &self.transport, self.copier.as_ref())
    }

    fn present(&self, spec: &DownloadSpec) -> Result<Outcome> {
        self.fs.create_dir_all(&spec.target_dir)?;
        let resolver = self.resolver();
        let acquirer = self.acquirer();

        let digest = resolver.ensure_digest(spec)?;
        let artifact = acquirer.acquire(spec)?;

        let mut verified = false;
        if artifact == AcquireStatus::Fetched && digest != DigestStatus::Skipped {
            let gate = VerificationGate::new(self.runner.as_ref(), &acquirer, &resolver);
            match gate.verify(spec)? {
                VerifyResult::Ok => verified = true,
                VerifyResult::Failed { command, exit_code } => {
                    return Err(Error::VerificationFailed {
                        artifact: spec.artifact_path(),
                        command,
                        exit_code,
                    });
                }
            }
        }

        Ok(Outcome::Present {
            digest,
            artifact,
            verified,
        })
    }

    fn absent(&self, spec: &DownloadSpec) -> Result<Outcome> {
        let artifact = self.acquirer().remove(spec);
        let digest = self.resolver().remove_digest(spec);
        artifact.and(digest)?;
        tracing::info!(name = %spec.name, "artifact and digest record absent");
        Ok(Outcome::Absent)
    }
}
