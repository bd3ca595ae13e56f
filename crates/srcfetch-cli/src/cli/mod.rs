//! CLI for srcfetch.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use srcfetch_core::config;
use std::path::PathBuf;

use commands::{run_apply, run_command, run_completions, run_ensure, run_man, EnsureArgs};

/// Top-level CLI for srcfetch.
#[derive(Debug, Parser)]
#[command(name = "srcfetch")]
#[command(about = "srcfetch: idempotent source archive acquisition with checksum verification", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Bring one archive (and its digest record) to the desired state.
    Ensure {
        /// File name of the artifact inside the target directory.
        name: String,

        /// Source URL (http, https, ftp or file).
        url: String,

        /// Desired state: present or absent.
        #[arg(long, default_value = "present")]
        ensure: String,

        /// Enable or disable checksum handling (default from config).
        #[arg(long, value_name = "BOOL")]
        checksum: Option<bool>,

        /// Explicit digest URL (default: <url>.<digest-type>).
        #[arg(long, value_name = "URL")]
        digest_url: Option<String>,

        /// Inline hex digest; takes precedence over --digest-url.
        #[arg(long, value_name = "HEX")]
        digest_string: Option<String>,

        /// md5, sha1, sha224, sha256, sha384 or sha512 (default from config).
        #[arg(long, value_name = "TYPE")]
        digest_type: Option<String>,

        /// Transfer timeout in seconds (default from config).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Target directory (default from config).
        #[arg(long, value_name = "DIR")]
        src_target: Option<PathBuf>,

        /// Skip TLS peer and host verification; `--allow-insecure=false`
        /// overrides a config default of true.
        #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
        allow_insecure: Option<bool>,

        /// Follow HTTP redirects; `--follow-redirects=false` overrides a
        /// config default of true.
        #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
        follow_redirects: Option<bool>,
    },

    /// Reconcile every `[[download]]` entry of a TOML manifest.
    Apply {
        /// Path to the manifest.
        manifest: PathBuf,

        /// Run up to N entries concurrently (default 1).
        #[arg(long, default_value = "1", value_name = "N")]
        jobs: usize,
    },

    /// Print the checksum command that verifies an artifact.
    Command {
        /// Artifact file name.
        name: String,

        /// Digest type (default from config).
        #[arg(long, value_name = "TYPE")]
        digest_type: Option<String>,
    },

    /// Generate shell completions on stdout.
    Completions {
        /// Target shell.
        shell: Shell,
    },

    /// Render the man page on stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // These only describe the CLI; no config needed.
        match cli.command {
            CliCommand::Completions { shell } => return run_completions(shell),
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Ensure {
                name,
                url,
                ensure,
                checksum,
                digest_url,
                digest_string,
                digest_type,
                timeout,
                src_target,
                allow_insecure,
                follow_redirects,
            } => {
                let args = EnsureArgs {
                    name,
                    url,
                    ensure,
                    checksum,
                    digest_url,
                    digest_string,
                    digest_type,
                    timeout,
                    src_target,
                    allow_insecure,
                    follow_redirects,
                };
                run_ensure(&cfg, args).await?;
            }
            CliCommand::Apply { manifest, jobs } => run_apply(&cfg, &manifest, jobs).await?,
            CliCommand::Command { name, digest_type } => {
                run_command(&cfg, &name, digest_type.as_deref())?
            }
            CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
