//! One-time collapse of duplicate player rows left by stores written before
//! the unique index existed.

use std::collections::BTreeMap;

use beatdeck_core::score::{PlayerId, ScoreRecord, is_better};
use serde::Serialize;
use tracing::{debug, info};

use super::ScoreBackend;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Index was already in place; nothing was read or rewritten.
    pub already_unique: bool,
    pub groups_collapsed: usize,
    pub rows_removed: usize,
}

/// Keeps the best row per player, then enforces the unique index. Returns
/// immediately once the index exists, so repeated startups never rewrite data.
pub fn reconcile<B: ScoreBackend + ?Sized>(backend: &B) -> Result<ReconcileReport, StoreError> {
    if backend.unique_index_enforced()? {
        debug!("unique index present, skipping reconciliation");
        return Ok(ReconcileReport {
            already_unique: true,
            ..ReconcileReport::default()
        });
    }

    let mut groups: BTreeMap<PlayerId, Vec<ScoreRecord>> = BTreeMap::new();
    for row in backend.all_rows()? {
        groups.entry(row.player_id.clone()).or_default().push(row);
    }

    let mut report = ReconcileReport::default();
    for (player, rows) in groups {
        if rows.len() < 2 {
            continue;
        }
        let count = rows.len();
        let Some(best) = rows
            .into_iter()
            .reduce(|best, row| if is_better(&row, &best) { row } else { best })
        else {
            continue;
        };
        let removed = backend.collapse_player(&player, best)?;
        debug!(player = %player, rows = count, "collapsed duplicate rows");
        report.groups_collapsed += 1;
        report.rows_removed += removed.saturating_sub(1);
    }

    backend.create_unique_index()?;
    info!(
        groups = report.groups_collapsed,
        removed = report.rows_removed,
        "reconciled leaderboard and enforced unique player index"
    );
    Ok(report)
}
