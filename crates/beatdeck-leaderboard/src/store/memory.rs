use std::sync::atomic::{AtomicBool, Ordering};

use beatdeck_core::score::{PlayerId, ScoreRecord};

use super::ScoreBackend;
use super::table::{ScoreTable, SnapshotCell};
use crate::error::StoreError;

/// In-process backend. Can be switched offline to exercise outage handling.
#[derive(Debug)]
pub struct MemoryBackend {
    table: SnapshotCell,
    reachable: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::from_table(ScoreTable::unique())
    }

    /// Rows written before the unique index existed; may repeat a player.
    pub fn with_legacy_rows(rows: Vec<ScoreRecord>) -> Self {
        Self::from_table(ScoreTable {
            rows,
            unique: false,
        })
    }

    fn from_table(table: ScoreTable) -> Self {
        Self {
            table: SnapshotCell::new(table),
            reachable: AtomicBool::new(true),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.table.snapshot().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory backend offline".to_string()))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreBackend for MemoryBackend {
    fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }

    fn unique_index_enforced(&self) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.table.snapshot().unique)
    }

    fn all_rows(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        self.check()?;
        Ok(self.table.snapshot().rows.clone())
    }

    fn find(&self, player: &PlayerId) -> Result<Option<ScoreRecord>, StoreError> {
        self.check()?;
        Ok(self.table.snapshot().find(player).cloned())
    }

    fn insert(&self, record: ScoreRecord) -> Result<(), StoreError> {
        self.check()?;
        self.table.update(|table| table.insert(record), |_| Ok(()))
    }

    fn replace_if(&self, expected: &ScoreRecord, record: ScoreRecord) -> Result<bool, StoreError> {
        self.check()?;
        self.table
            .update(|table| Ok(table.replace_if(expected, record)), |_| Ok(()))
    }

    fn collapse_player(&self, player: &PlayerId, keep: ScoreRecord) -> Result<usize, StoreError> {
        self.check()?;
        self.table
            .update(|table| Ok(table.collapse_player(player, keep)), |_| Ok(()))
    }

    fn create_unique_index(&self) -> Result<(), StoreError> {
        self.check()?;
        self.table.update(ScoreTable::create_unique_index, |_| Ok(()))
    }
}
