//! Persistence boundary for leaderboard entries.

mod file;
pub mod leaderboard;
mod memory;
pub mod query;
pub mod reconcile;
mod table;

pub use file::JsonFileBackend;
pub use memory::MemoryBackend;

use std::sync::Arc;

use beatdeck_core::score::{PlayerId, ScoreRecord};

use crate::error::StoreError;

/// Storage operations the leaderboard needs. Implementations must make
/// `insert` and `replace_if` atomic with respect to each other: once the
/// unique index exists, `insert` fails with `DuplicateKey` for a player that
/// already has an entry, and `replace_if` only swaps when the stored entry
/// still equals `expected`.
pub trait ScoreBackend: Send + Sync {
    fn ping(&self) -> Result<(), StoreError>;

    fn unique_index_enforced(&self) -> Result<bool, StoreError>;

    /// Consistent snapshot of every stored row.
    fn all_rows(&self) -> Result<Vec<ScoreRecord>, StoreError>;

    fn find(&self, player: &PlayerId) -> Result<Option<ScoreRecord>, StoreError>;

    fn insert(&self, record: ScoreRecord) -> Result<(), StoreError>;

    fn replace_if(&self, expected: &ScoreRecord, record: ScoreRecord) -> Result<bool, StoreError>;

    /// Deletes every row for `player` and stores `keep` in their place.
    /// Returns how many rows were removed.
    fn collapse_player(&self, player: &PlayerId, keep: ScoreRecord) -> Result<usize, StoreError>;

    /// Fails with `DuplicateKey` while any player still has several rows.
    fn create_unique_index(&self) -> Result<(), StoreError>;
}

impl<B: ScoreBackend + ?Sized> ScoreBackend for Arc<B> {
    fn ping(&self) -> Result<(), StoreError> {
        (**self).ping()
    }

    fn unique_index_enforced(&self) -> Result<bool, StoreError> {
        (**self).unique_index_enforced()
    }

    fn all_rows(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        (**self).all_rows()
    }

    fn find(&self, player: &PlayerId) -> Result<Option<ScoreRecord>, StoreError> {
        (**self).find(player)
    }

    fn insert(&self, record: ScoreRecord) -> Result<(), StoreError> {
        (**self).insert(record)
    }

    fn replace_if(&self, expected: &ScoreRecord, record: ScoreRecord) -> Result<bool, StoreError> {
        (**self).replace_if(expected, record)
    }

    fn collapse_player(&self, player: &PlayerId, keep: ScoreRecord) -> Result<usize, StoreError> {
        (**self).collapse_player(player, keep)
    }

    fn create_unique_index(&self) -> Result<(), StoreError> {
        (**self).create_unique_index()
    }
}
