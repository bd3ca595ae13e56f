//! Verification gate: checks a freshly acquired artifact against its digest
//! record and rolls both files back on mismatch.

use crate::acquire::ArtifactAcquirer;
use crate::command::CommandRunner;
use crate::digest::{command_for, DigestResolver};
use crate::error::Result;
use crate::request::DownloadSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    Ok,
    /// Mismatch. Artifact and digest record have already been removed.
    Failed { command: String, exit_code: i32 },
}

pub struct VerificationGate<'a> {
    runner: &'a dyn CommandRunner,
    acquirer: &'a ArtifactAcquirer<'a>,
    resolver: &'a DigestResolver<'a>,
}

impl<'a> VerificationGate<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        acquirer: &'a ArtifactAcquirer<'a>,
        resolver: &'a DigestResolver<'a>,
    ) -> Self {
        Self {
            runner,
            acquirer,
            resolver,
        }
    }

    /// Runs the checksum command in the target directory. Call only after a
    /// fresh acquisition with checksum enabled.
    pub fn verify(&self, spec: &DownloadSpec) -> Result<VerifyResult> {
        let command = command_for(spec.digest_type.as_str(), &spec.name)?.to_string();
        let exit_code = match self.runner.run(&command, &spec.target_dir) {
            Ok(code) => code,
            Err(e) => {
                // An artifact that could not be checked must not survive.
                tracing::warn!(
                    name = %spec.name,
                    %command,
                    "checksum command did not run, removing artifact and digest record: {}",
                    e
                );
                if let Err(cleanup) = self.rollback(spec) {
                    tracing::error!(name = %spec.name, "rollback failed: {}", cleanup);
                }
                return Err(e);
            }
        };
        if exit_code == 0 {
            tracing::info!(name = %spec.name, %command, "checksum verified");
            return Ok(VerifyResult::Ok);
        }

        tracing::warn!(
            name = %spec.name,
            %command,
            exit_code,
            "checksum mismatch, removing artifact and digest record"
        );
        self.rollback(spec)?;
        Ok(VerifyResult::Failed { command, exit_code })
    }

    /// Removes both files; both removals are attempted, the first error wins.
    fn rollback(&self, spec: &DownloadSpec) -> Result<()> {
        let artifact = self.acquirer.remove(spec);
        let digest = self.resolver.remove_digest(spec);
        artifact.and(digest)
    }
}
