//! Request-facing wrapper around the leaderboard. Keeps serving while the
//! store is down: operations answer `ServiceError::Unavailable` and a
//! background thread retries opening the store on a fixed interval.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use beatdeck_core::score::ScoreRecord;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::{ServiceError, StoreError};
use crate::store::ScoreBackend;
use crate::store::leaderboard::{Leaderboard, UpsertAction};
use crate::store::query::{LeaderboardQuery, MonthWindow};
use crate::validation::{InvalidInput, NameFilter, ScoreSubmission};

const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub retry_interval: Duration,
    pub default_limit: usize,
    pub max_limit: usize,
    pub per_result_limit: Option<usize>,
    pub names: NameFilter,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            default_limit: 50,
            max_limit: 100,
            per_result_limit: Some(100),
            names: NameFilter::default(),
        }
    }
}

/// Leaderboard read parameters. `year` and `month` go together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRequest {
    pub year: Option<i32>,
    pub month: Option<u8>,
    pub limit: Option<usize>,
    pub per_result_limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    pub action: UpsertAction,
    pub record: ScoreRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub store_available: bool,
    pub timestamp: u64,
}

type Connector<B> = Box<dyn Fn() -> Result<B, StoreError> + Send + Sync>;

struct Shared<B: ScoreBackend> {
    board: RwLock<Option<Arc<Leaderboard<B>>>>,
    connect: Connector<B>,
    clock: Arc<dyn Clock>,
    settings: ServiceSettings,
    stop: AtomicBool,
}

impl<B: ScoreBackend> Shared<B> {
    fn try_connect(&self) -> bool {
        match (self.connect)().and_then(Leaderboard::open) {
            Ok(board) => {
                info!("leaderboard store available");
                *self.board.write() = Some(Arc::new(board));
                true
            }
            Err(err) => {
                warn!(
                    error = %err,
                    retry_in_ms = self.settings.retry_interval.as_millis() as u64,
                    "leaderboard store unavailable"
                );
                false
            }
        }
    }

    fn retry_until_connected(&self) {
        while !self.stop.load(Ordering::SeqCst) {
            thread::park_timeout(self.settings.retry_interval);
            if self.stop.load(Ordering::SeqCst) || self.try_connect() {
                break;
            }
        }
    }
}

fn spawn_retry<B: ScoreBackend + 'static>(shared: Arc<Shared<B>>) -> Option<JoinHandle<()>> {
    thread::Builder::new()
        .name("beatdeck-store-retry".to_string())
        .spawn(move || shared.retry_until_connected())
        .map_err(|err| warn!(error = %err, "could not spawn store retry thread"))
        .ok()
}

pub struct LeaderboardService<B: ScoreBackend + 'static> {
    shared: Arc<Shared<B>>,
    retry: Mutex<Option<JoinHandle<()>>>,
}

impl<B: ScoreBackend + 'static> LeaderboardService<B> {
    /// Tries `connect` once; if that fails the service starts degraded and
    /// keeps retrying in the background until the store opens.
    pub fn start<F>(connect: F, settings: ServiceSettings, clock: Arc<dyn Clock>) -> Self
    where
        F: Fn() -> Result<B, StoreError> + Send + Sync + 'static,
    {
        let shared = Arc::new(Shared {
            board: RwLock::new(None),
            connect: Box::new(connect),
            clock,
            settings,
            stop: AtomicBool::new(false),
        });

        let retry = if shared.try_connect() {
            None
        } else {
            spawn_retry(Arc::clone(&shared))
        };

        Self {
            shared,
            retry: Mutex::new(retry),
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.shared.settings
    }

    pub fn is_available(&self) -> bool {
        self.shared.board.read().is_some()
    }

    fn board(&self) -> Result<Arc<Leaderboard<B>>, ServiceError> {
        self.shared
            .board
            .read()
            .clone()
            .ok_or(ServiceError::Unavailable)
    }

    /// Validates, stamps and stores a finished game. Invalid input is
    /// reported even while the store is down.
    pub fn submit(&self, submission: &ScoreSubmission) -> Result<SubmitReceipt, ServiceError> {
        let valid = submission.validate(&self.shared.settings.names)?;
        let board = self.board()?;
        let record = valid.into_record(self.shared.clock.now_ms());
        let outcome = board.upsert(record)?;
        info!(
            player = %outcome.record.player_id,
            action = outcome.action.as_str(),
            "score submitted"
        );
        Ok(SubmitReceipt {
            action: outcome.action,
            record: outcome.record,
        })
    }

    pub fn leaderboard(&self, request: &LeaderboardRequest) -> Result<Vec<ScoreRecord>, ServiceError> {
        let query = self.build_query(request)?;
        let board = self.board()?;
        Ok(board.query(&query)?)
    }

    fn build_query(&self, request: &LeaderboardRequest) -> Result<LeaderboardQuery, InvalidInput> {
        let settings = &self.shared.settings;
        let window = match (request.year, request.month) {
            (Some(year), Some(month)) => Some(MonthWindow::new(year, month)?),
            (None, None) => None,
            (Some(_), None) => return Err(InvalidInput::MissingField("month")),
            (None, Some(_)) => return Err(InvalidInput::MissingField("year")),
        };
        if request.per_result_limit == Some(0) {
            return Err(InvalidInput::PerResultLimit);
        }
        Ok(LeaderboardQuery {
            window,
            per_result_limit: request.per_result_limit.or(settings.per_result_limit),
            limit: request
                .limit
                .unwrap_or(settings.default_limit)
                .clamp(1, settings.max_limit),
        })
    }

    pub fn health(&self) -> HealthStatus {
        let store_available = self
            .shared
            .board
            .read()
            .as_ref()
            .is_some_and(|board| board.backend().ping().is_ok());
        HealthStatus {
            status: if store_available { "ok" } else { "degraded" },
            store_available,
            timestamp: self.shared.clock.now_ms(),
        }
    }
}

impl<B: ScoreBackend + 'static> Drop for LeaderboardService<B> {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.retry.lock().take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}
