use std::sync::Arc;

use beatdeck_core::score::{PlayerId, ScoreRecord};
use parking_lot::{Mutex, RwLock};

use crate::error::StoreError;

/// Rows plus the uniqueness flag. The file backend loads a fresh copy per call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ScoreTable {
    pub(crate) rows: Vec<ScoreRecord>,
    pub(crate) unique: bool,
}

impl ScoreTable {
    pub(crate) fn unique() -> Self {
        Self {
            rows: Vec::new(),
            unique: true,
        }
    }

    pub(crate) fn find(&self, player: &PlayerId) -> Option<&ScoreRecord> {
        self.rows.iter().find(|row| &row.player_id == player)
    }

    pub(crate) fn insert(&mut self, record: ScoreRecord) -> Result<(), StoreError> {
        if self.unique && self.find(&record.player_id).is_some() {
            return Err(StoreError::DuplicateKey(record.player_id));
        }
        self.rows.push(record);
        Ok(())
    }

    pub(crate) fn replace_if(&mut self, expected: &ScoreRecord, record: ScoreRecord) -> bool {
        match self.rows.iter_mut().find(|row| **row == *expected) {
            Some(row) => {
                *row = record;
                true
            }
            None => false,
        }
    }

    pub(crate) fn collapse_player(&mut self, player: &PlayerId, keep: ScoreRecord) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| &row.player_id != player);
        let removed = before - self.rows.len();
        self.rows.push(keep);
        removed
    }

    pub(crate) fn create_unique_index(&mut self) -> Result<(), StoreError> {
        let mut seen = std::collections::HashSet::new();
        for row in &self.rows {
            if !seen.insert(&row.player_id) {
                return Err(StoreError::DuplicateKey(row.player_id.clone()));
            }
        }
        self.unique = true;
        Ok(())
    }
}

/// Copy-on-write table: readers take the current snapshot without waiting
/// on writers, writers are serialized and publish a new snapshot.
#[derive(Debug)]
pub(crate) struct SnapshotCell {
    current: RwLock<Arc<ScoreTable>>,
    writer: Mutex<()>,
}

impl SnapshotCell {
    pub(crate) fn new(table: ScoreTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
            writer: Mutex::new(()),
        }
    }

    pub(crate) fn snapshot(&self) -> Arc<ScoreTable> {
        Arc::clone(&self.current.read())
    }

    /// Applies `change` to a copy of the latest table, runs `commit` on the
    /// result, and publishes it only if both succeed.
    pub(crate) fn update<T, F, C>(&self, change: F, commit: C) -> Result<T, StoreError>
    where
        F: FnOnce(&mut ScoreTable) -> Result<T, StoreError>,
        C: FnOnce(&ScoreTable) -> Result<(), StoreError>,
    {
        let _writer = self.writer.lock();
        let mut next = ScoreTable::clone(&self.snapshot());
        let value = change(&mut next)?;
        commit(&next)?;
        *self.current.write() = Arc::new(next);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ScoreTable, SnapshotCell};
    use crate::error::StoreError;
    use beatdeck_core::model::result::GameResult;
    use beatdeck_core::score::{PlayerId, ScoreRecord};

    fn row(player: &str, ts: u64) -> ScoreRecord {
        ScoreRecord {
            player_id: PlayerId::new(player),
            player_name: player.to_string(),
            stacks_remaining: 0,
            longest_streak: 0,
            remaining_cards: 10,
            result: GameResult::Lose,
            timestamp: ts,
        }
    }

    #[test]
    fn unique_table_rejects_second_row_for_player() {
        let mut table = ScoreTable::unique();
        table.insert(row("a", 1)).expect("first insert");
        let err = table.insert(row("a", 2)).expect_err("duplicate");
        assert!(matches!(err, StoreError::DuplicateKey(player) if player.as_str() == "a"));
    }

    #[test]
    fn replace_if_requires_matching_row() {
        let mut table = ScoreTable::unique();
        table.insert(row("a", 1)).unwrap();
        assert!(!table.replace_if(&row("a", 5), row("a", 6)));
        assert!(table.replace_if(&row("a", 1), row("a", 6)));
        assert_eq!(table.find(&PlayerId::new("a")).map(|r| r.timestamp), Some(6));
    }

    #[test]
    fn unique_index_fails_while_duplicates_remain() {
        let mut table = ScoreTable::default();
        table.insert(row("a", 1)).unwrap();
        table.insert(row("a", 2)).unwrap();
        assert!(table.create_unique_index().is_err());
        assert_eq!(table.collapse_player(&PlayerId::new("a"), row("a", 2)), 2);
        assert!(table.create_unique_index().is_ok());
        assert!(table.unique);
    }

    #[test]
    fn failed_commit_keeps_previous_snapshot() {
        let cell = SnapshotCell::new(ScoreTable::unique());
        let result = cell.update(
            |table| table.insert(row("a", 1)),
            |_| Err(StoreError::Unavailable("disk gone".to_string())),
        );
        assert!(result.is_err());
        assert!(cell.snapshot().rows.is_empty());
    }

    #[test]
    fn readers_keep_their_snapshot_across_writes() {
        let cell = SnapshotCell::new(ScoreTable::unique());
        let before = cell.snapshot();
        cell.update(|table| table.insert(row("a", 1)), |_| Ok(())).unwrap();
        assert!(before.rows.is_empty());
        assert_eq!(cell.snapshot().rows.len(), 1);
    }
}
