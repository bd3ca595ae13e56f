//! `srcfetch apply <manifest>` – reconcile every entry of a manifest.

use anyhow::{bail, Result};
use srcfetch_core::batch::{apply_all, EntryReport};
use srcfetch_core::config::SrcfetchConfig;
use srcfetch_core::manifest::Manifest;
use srcfetch_core::reconcile::StateReconciler;
use std::path::Path;
use std::sync::Arc;

use super::ensure::describe;

#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    changed: usize,
    unchanged: usize,
    failed: usize,
}

fn tally(reports: &[EntryReport]) -> Tally {
    let mut t = Tally::default();
    for report in reports {
        match &report.result {
            Ok(outcome) if outcome.changed() => t.changed += 1,
            Ok(_) => t.unchanged += 1,
            Err(_) => t.failed += 1,
        }
    }
    t
}

/// Validates the whole manifest first, then runs up to `jobs` entries at once.
/// Prints one line per entry and fails if any entry failed.
pub async fn run_apply(cfg: &SrcfetchConfig, manifest: &Path, jobs: usize) -> Result<()> {
    let specs = Manifest::load(manifest)?.resolve(cfg)?;
    if specs.is_empty() {
        println!("No downloads in {}.", manifest.display());
        return Ok(());
    }

    let reconciler = Arc::new(StateReconciler::from_config(cfg)?);
    let reports = apply_all(reconciler, specs, jobs).await?;

    for report in &reports {
        match &report.result {
            Ok(outcome) => println!("{}: {}", report.name, describe(outcome)),
            Err(e) => println!("{}: FAILED: {}", report.name, e),
        }
    }

    let t = tally(&reports);
    println!(
        "{} entries: {} changed, {} unchanged, {} failed",
        reports.len(),
        t.changed,
        t.unchanged,
        t.failed
    );

    if t.failed > 0 {
        bail!("{} of {} downloads failed", t.failed, reports.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use srcfetch_core::acquire::AcquireStatus;
    use srcfetch_core::digest::DigestStatus;
    use srcfetch_core::reconcile::Outcome;
    use srcfetch_core::Error;

    fn report(name: &str, result: Result<Outcome, Error>) -> EntryReport {
        EntryReport {
            name: name.to_string(),
            result,
        }
    }

    #[test]
    fn tally_splits_changed_unchanged_failed() {
        let reports = vec![
            report(
                "fresh",
                Ok(Outcome::Present {
                    digest: DigestStatus::Created,
                    artifact: AcquireStatus::Fetched,
                    verified: true,
                }),
            ),
            report(
                "noop",
                Ok(Outcome::Present {
                    digest: DigestStatus::AlreadyPresent,
                    artifact: AcquireStatus::AlreadyPresent,
                    verified: false,
                }),
            ),
            report("gone", Ok(Outcome::Absent)),
            report("bad", Err(Error::InvalidState("latest".into()))),
        ];
        assert_eq!(
            tally(&reports),
            Tally {
                changed: 2,
                unchanged: 1,
                failed: 1,
            }
        );
    }
}
