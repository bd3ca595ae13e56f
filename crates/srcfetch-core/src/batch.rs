//! Run several reconciliations concurrently.
//!
//! Keeps up to `max_concurrent` specs in flight on tokio's blocking pool;
//! when one finishes, the next queued spec starts. Specs must target
//! distinct files (see [`crate::manifest::Manifest::resolve`]).

use anyhow::Result;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::Error;
use crate::reconcile::{Outcome, StateReconciler};
use crate::request::DownloadSpec;

/// Result of one spec, in manifest order.
#[derive(Debug)]
pub struct EntryReport {
    pub name: String,
    pub result: Result<Outcome, Error>,
}

pub async fn apply_all(
    reconciler: Arc<StateReconciler>,
    specs: Vec<DownloadSpec>,
    max_concurrent: usize,
) -> Result<Vec<EntryReport>> {
    let max_concurrent = max_concurrent.max(1);
    let mut queue: VecDeque<(usize, DownloadSpec)> = specs.into_iter().enumerate().collect();
    let mut reports: Vec<Option<EntryReport>> = (0..queue.len()).map(|_| None).collect();
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while join_set.len() < max_concurrent {
            let Some((idx, spec)) = queue.pop_front() else {
                break;
            };
            let reconciler = Arc::clone(&reconciler);
            join_set.spawn_blocking(move || {
                let result = reconciler.reconcile(&spec);
                if let Err(e) = &result {
                    tracing::error!(name = %spec.name, "reconcile failed: {}", e);
                }
                (
                    idx,
                    EntryReport {
                        name: spec.name,
                        result,
                    },
                )
            });
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        let (idx, report) = res.map_err(|e| anyhow::anyhow!("reconcile task join: {}", e))?;
        reports[idx] = Some(report);
    }

    Ok(reports.into_iter().flatten().collect())
}
