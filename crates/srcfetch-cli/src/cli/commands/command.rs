//! `srcfetch command <name>` – print the verification command line.

use anyhow::Result;
use srcfetch_core::config::SrcfetchConfig;
use srcfetch_core::digest::command_for;

pub fn run_command(cfg: &SrcfetchConfig, name: &str, digest_type: Option<&str>) -> Result<()> {
    let digest_type = digest_type.unwrap_or(cfg.digest_type.as_str());
    println!("{}", command_for(digest_type, name)?);
    Ok(())
}
