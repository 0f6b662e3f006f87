use beatdeck_core::score::{PlayerId, ScoreRecord, should_replace};
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, event};

use super::ScoreBackend;
use super::query::LeaderboardQuery;
use super::reconcile::{ReconcileReport, reconcile};
use crate::error::StoreError;

/// Lost races tolerated before an upsert reports contention.
pub const DEFAULT_MAX_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    Inserted,
    Updated,
    KeptExisting,
}

impl UpsertAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            UpsertAction::Inserted => "inserted",
            UpsertAction::Updated => "updated",
            UpsertAction::KeptExisting => "kept_existing",
        }
    }
}

/// What an upsert did, plus the entry now stored for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub action: UpsertAction,
    pub record: ScoreRecord,
}

/// Best-score-per-player table on top of a [`ScoreBackend`].
#[derive(Debug)]
pub struct Leaderboard<B> {
    backend: B,
    max_attempts: usize,
    reconciled: ReconcileReport,
}

impl<B: ScoreBackend> Leaderboard<B> {
    /// Checks the backend is reachable and reconciles legacy duplicates.
    pub fn open(backend: B) -> Result<Self, StoreError> {
        backend.ping()?;
        let reconciled = reconcile(&backend)?;
        Ok(Self {
            backend,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            reconciled,
        })
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn reconcile_report(&self) -> ReconcileReport {
        self.reconciled
    }

    pub fn entry(&self, player: &PlayerId) -> Result<Option<ScoreRecord>, StoreError> {
        self.backend.find(player)
    }

    /// Stores `record` if the player has no entry or if it ranks at least as
    /// high as the stored one. A lost insert or swap race re-reads the
    /// winner and decides again.
    pub fn upsert(&self, record: ScoreRecord) -> Result<UpsertOutcome, StoreError> {
        for attempt in 1..=self.max_attempts {
            match self.backend.find(&record.player_id)? {
                None => match self.backend.insert(record.clone()) {
                    Ok(()) => return Ok(self.decided(UpsertAction::Inserted, record)),
                    Err(StoreError::DuplicateKey(_)) => {
                        debug!(player = %record.player_id, attempt, "insert lost race, re-reading");
                    }
                    Err(err) => return Err(err),
                },
                Some(stored) if should_replace(&record, &stored) => {
                    if self.backend.replace_if(&stored, record.clone())? {
                        return Ok(self.decided(UpsertAction::Updated, record));
                    }
                    debug!(player = %record.player_id, attempt, "entry changed underneath, re-reading");
                }
                Some(stored) => return Ok(self.decided(UpsertAction::KeptExisting, stored)),
            }
        }

        event!(
            target: "beatdeck_leaderboard::upsert",
            Level::WARN,
            player = %record.player_id,
            attempts = self.max_attempts,
            "giving up after repeated conflicts"
        );
        Err(StoreError::Contention {
            player: record.player_id,
            attempts: self.max_attempts,
        })
    }

    pub fn query(&self, query: &LeaderboardQuery) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(query.apply(self.backend.all_rows()?))
    }

    fn decided(&self, action: UpsertAction, record: ScoreRecord) -> UpsertOutcome {
        if tracing::enabled!(target: "beatdeck_leaderboard::upsert", Level::DEBUG) {
            event!(
                target: "beatdeck_leaderboard::upsert",
                Level::DEBUG,
                player = %record.player_id,
                action = action.as_str(),
                result = record.result.as_str(),
                stacks_remaining = record.stacks_remaining,
                remaining_cards = record.remaining_cards,
                longest_streak = record.longest_streak,
            );
        }
        UpsertOutcome { action, record }
    }
}

#[cfg(test)]
mod tests {
    use super::{Leaderboard, UpsertAction};
    use crate::error::StoreError;
    use crate::store::{MemoryBackend, ScoreBackend};
    use beatdeck_core::model::result::GameResult;
    use beatdeck_core::score::{PlayerId, ScoreRecord};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    fn win(player: &str, stacks: u8, streak: u32, ts: u64) -> ScoreRecord {
        ScoreRecord {
            player_id: PlayerId::new(player),
            player_name: player.to_string(),
            stacks_remaining: stacks,
            longest_streak: streak,
            remaining_cards: 0,
            result: GameResult::Win,
            timestamp: ts,
        }
    }

    fn loss(player: &str, remaining: u8, streak: u32, ts: u64) -> ScoreRecord {
        ScoreRecord {
            result: GameResult::Lose,
            stacks_remaining: 0,
            remaining_cards: remaining,
            ..win(player, 0, streak, ts)
        }
    }

    #[test]
    fn first_submission_is_inserted() {
        let board = Leaderboard::open(MemoryBackend::new()).expect("open");
        let outcome = board.upsert(loss("a", 10, 3, 1)).expect("upsert");
        assert_eq!(outcome.action, UpsertAction::Inserted);
        assert_eq!(board.backend().len(), 1);
    }

    #[test]
    fn stacks_outrank_streak_among_wins() {
        let board = Leaderboard::open(MemoryBackend::new()).expect("open");
        board.upsert(win("a", 9, 52, 1)).expect("first");
        let outcome = board.upsert(win("a", 6, 60, 2)).expect("second");
        assert_eq!(outcome.action, UpsertAction::KeptExisting);
        assert_eq!(outcome.record.stacks_remaining, 9);
        assert_eq!(outcome.record.longest_streak, 52);
        let stored = board.entry(&PlayerId::new("a")).unwrap().unwrap();
        assert_eq!(stored.stacks_remaining, 9);
    }

    #[test]
    fn better_score_replaces_and_worse_is_kept_out() {
        let board = Leaderboard::open(MemoryBackend::new()).expect("open");
        board.upsert(loss("a", 20, 4, 1)).unwrap();
        assert_eq!(board.upsert(loss("a", 5, 4, 2)).unwrap().action, UpsertAction::Updated);
        assert_eq!(
            board.upsert(loss("a", 30, 40, 3)).unwrap().action,
            UpsertAction::KeptExisting
        );
        assert_eq!(board.upsert(win("a", 1, 0, 4)).unwrap().action, UpsertAction::Updated);
    }

    #[test]
    fn identical_resubmission_refreshes_timestamp() {
        let board = Leaderboard::open(MemoryBackend::new()).expect("open");
        board.upsert(win("a", 3, 8, 100)).unwrap();
        let outcome = board.upsert(win("a", 3, 8, 200)).unwrap();
        assert_eq!(outcome.action, UpsertAction::Updated);
        assert_eq!(board.backend().len(), 1);
        assert_eq!(board.entry(&PlayerId::new("a")).unwrap().unwrap().timestamp, 200);
    }

    #[test]
    fn open_fails_when_backend_is_down() {
        let backend = MemoryBackend::new();
        backend.set_reachable(false);
        assert!(matches!(
            Leaderboard::open(backend),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn open_reconciles_legacy_rows() {
        let backend =
            MemoryBackend::with_legacy_rows(vec![loss("a", 10, 1, 1), loss("a", 2, 1, 2)]);
        let board = Leaderboard::open(backend).expect("open");
        assert_eq!(board.reconcile_report().groups_collapsed, 1);
        assert_eq!(board.backend().len(), 1);
    }

    #[test]
    fn concurrent_submissions_keep_one_row_with_the_best_score() {
        let board = Arc::new(Leaderboard::open(MemoryBackend::new()).expect("open"));
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let board = Arc::clone(&board);
                thread::spawn(move || {
                    for round in 0..25u64 {
                        board
                            .upsert(loss("shared", 40 - i, 1, round))
                            .expect("upsert");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker");
        }

        assert_eq!(board.backend().len(), 1);
        let stored = board.entry(&PlayerId::new("shared")).unwrap().unwrap();
        assert_eq!(stored.remaining_cards, 33);
    }

    /// Lets a competing writer land between our read and our insert once.
    struct RacingBackend {
        inner: MemoryBackend,
        raced: AtomicBool,
        rival: ScoreRecord,
    }

    impl ScoreBackend for RacingBackend {
        fn ping(&self) -> Result<(), StoreError> {
            self.inner.ping()
        }
        fn unique_index_enforced(&self) -> Result<bool, StoreError> {
            self.inner.unique_index_enforced()
        }
        fn all_rows(&self) -> Result<Vec<ScoreRecord>, StoreError> {
            self.inner.all_rows()
        }
        fn find(&self, player: &PlayerId) -> Result<Option<ScoreRecord>, StoreError> {
            self.inner.find(player)
        }
        fn insert(&self, record: ScoreRecord) -> Result<(), StoreError> {
            if !self.raced.swap(true, Ordering::SeqCst) {
                self.inner.insert(self.rival.clone())?;
            }
            self.inner.insert(record)
        }
        fn replace_if(&self, expected: &ScoreRecord, record: ScoreRecord) -> Result<bool, StoreError> {
            self.inner.replace_if(expected, record)
        }
        fn collapse_player(&self, player: &PlayerId, keep: ScoreRecord) -> Result<usize, StoreError> {
            self.inner.collapse_player(player, keep)
        }
        fn create_unique_index(&self) -> Result<(), StoreError> {
            self.inner.create_unique_index()
        }
    }

    #[test]
    fn lost_insert_race_is_re_evaluated_against_the_winner() {
        let backend = RacingBackend {
            inner: MemoryBackend::new(),
            raced: AtomicBool::new(false),
            rival: win("a", 9, 1, 1),
        };
        let board = Leaderboard::open(backend).expect("open");
        let outcome = board.upsert(win("a", 2, 30, 2)).expect("no duplicate error");
        assert_eq!(outcome.action, UpsertAction::KeptExisting);
        assert_eq!(outcome.record.stacks_remaining, 9);
        assert_eq!(board.backend().inner.len(), 1);
    }

    /// Every swap fails, as if another writer always got there first.
    struct AlwaysStale(MemoryBackend);

    impl ScoreBackend for AlwaysStale {
        fn ping(&self) -> Result<(), StoreError> {
            self.0.ping()
        }
        fn unique_index_enforced(&self) -> Result<bool, StoreError> {
            self.0.unique_index_enforced()
        }
        fn all_rows(&self) -> Result<Vec<ScoreRecord>, StoreError> {
            self.0.all_rows()
        }
        fn find(&self, player: &PlayerId) -> Result<Option<ScoreRecord>, StoreError> {
            self.0.find(player)
        }
        fn insert(&self, record: ScoreRecord) -> Result<(), StoreError> {
            self.0.insert(record)
        }
        fn replace_if(&self, _: &ScoreRecord, _: ScoreRecord) -> Result<bool, StoreError> {
            Ok(false)
        }
        fn collapse_player(&self, player: &PlayerId, keep: ScoreRecord) -> Result<usize, StoreError> {
            self.0.collapse_player(player, keep)
        }
        fn create_unique_index(&self) -> Result<(), StoreError> {
            self.0.create_unique_index()
        }
    }

    #[test]
    fn endless_conflicts_report_contention() {
        let board = Leaderboard::open(AlwaysStale(MemoryBackend::new()))
            .expect("open")
            .with_max_attempts(3);
        board.upsert(loss("a", 10, 1, 1)).unwrap();
        let err = board.upsert(loss("a", 2, 1, 2)).expect_err("contention");
        assert!(matches!(err, StoreError::Contention { attempts: 3, .. }));
    }
}
