pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod store;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, LoggingConfig, ServiceConfig, ValidationError};
pub use error::{ServiceError, StoreError};
pub use logging::{LoggingGuard, init_logging};
pub use service::{
    HealthStatus, LeaderboardRequest, LeaderboardService, ServiceSettings, SubmitReceipt,
};
pub use store::leaderboard::{Leaderboard, UpsertAction, UpsertOutcome};
pub use store::query::{LeaderboardQuery, MonthWindow};
pub use store::reconcile::{ReconcileReport, reconcile};
pub use store::{JsonFileBackend, MemoryBackend, ScoreBackend};
pub use validation::{InvalidInput, NameFilter, ScoreSubmission, ValidSubmission};
