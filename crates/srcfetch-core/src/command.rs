//! Checksum command execution.
//!
//! [`SystemCommandRunner`] hands the command line to `sh -c`.
//! [`BuiltinChecksumRunner`] evaluates `<sha2 type>sum -c <record>` in
//! process with the same exit-code contract (0 = every entry matched) and
//! falls back to the system runner for anything else.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::checksum;
use crate::digest::{parse_record, ChecksumCommand};
use crate::error::{Error, Result};

pub trait CommandRunner: Send + Sync {
    /// Runs `command` with `cwd` as working directory and returns its exit code.
    fn run(&self, command: &str, cwd: &Path) -> Result<i32>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &str, cwd: &Path) -> Result<i32> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .output()
            .map_err(|source| Error::Command {
                command: command.to_string(),
                source,
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::debug!(command, stdout = %stdout.trim(), stderr = %stderr.trim(), "checksum command finished");
        // Killed by a signal: no exit code.
        Ok(output.status.code().unwrap_or(-1))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinChecksumRunner {
    fallback: SystemCommandRunner,
}

impl BuiltinChecksumRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&self, cmd: &ChecksumCommand, cwd: &Path) -> i32 {
        let record_path = cwd.join(&cmd.record);
        let content = match fs::read_to_string(&record_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(record = %record_path.display(), "cannot read digest record: {}", e);
                return 1;
            }
        };
        // A digest of the wrong length for this algorithm is an improperly
        // formatted line, as `<type>sum -c` treats it.
        let expected_len = cmd.digest_type.hex_len();
        let entries: Vec<_> = parse_record(&content)
            .into_iter()
            .filter(|e| {
                let ok = e.digest.len() == expected_len;
                if !ok {
                    tracing::warn!(file = %e.file_name, len = e.digest.len(), expected_len, "skipping digest of wrong length");
                }
                ok
            })
            .collect();
        if entries.is_empty() {
            tracing::warn!(record = %record_path.display(), "no properly formatted checksum lines");
            return 1;
        }

        let mut failed = 0usize;
        for entry in &entries {
            let path = cwd.join(&entry.file_name);
            match checksum::hex_digest_path(cmd.digest_type, &path) {
                Ok(Some(actual)) if actual == entry.digest => {
                    tracing::debug!(file = %entry.file_name, "checksum OK");
                }
                Ok(Some(actual)) => {
                    tracing::warn!(file = %entry.file_name, expected = %entry.digest, actual = %actual, "checksum mismatch");
                    failed += 1;
                }
                Ok(None) => failed += 1,
                Err(e) => {
                    tracing::warn!(file = %entry.file_name, "cannot hash: {}", e);
                    failed += 1;
                }
            }
        }
        if failed == 0 {
            0
        } else {
            1
        }
    }
}

impl CommandRunner for BuiltinChecksumRunner {
    fn run(&self, command: &str, cwd: &Path) -> Result<i32> {
        match ChecksumCommand::parse(command) {
            Some(cmd) if checksum::supports(cmd.digest_type) => Ok(self.check(&cmd, cwd)),
            _ => self.fallback.run(command, cwd),
        }
    }
}
