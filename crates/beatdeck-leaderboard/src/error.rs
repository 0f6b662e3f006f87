use std::path::PathBuf;

use beatdeck_core::score::PlayerId;
use thiserror::Error;

use crate::validation::InvalidInput;

/// Failures raised by a score backend or the leaderboard on top of it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("leaderboard store is unavailable: {0}")]
    Unavailable(String),
    #[error("an entry for player '{0}' already exists")]
    DuplicateKey(PlayerId),
    #[error("gave up on player '{player}' after {attempts} conflicting writes")]
    Contention { player: PlayerId, attempts: usize },
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store file {path:?} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Backend could not be reached; the caller should try again later.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Io { .. })
    }
}

/// Errors returned to whoever submits scores or reads the leaderboard.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error("service temporarily unavailable, try again")]
    Unavailable,
    #[error("leaderboard busy, try again")]
    Busy,
    #[error("leaderboard store failed: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            err if err.is_unavailable() => ServiceError::Unavailable,
            StoreError::Contention { .. } => ServiceError::Busy,
            other => ServiceError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ServiceError, StoreError};
    use beatdeck_core::score::PlayerId;

    #[test]
    fn unavailable_store_maps_to_try_again() {
        let err: ServiceError = StoreError::Unavailable("down".to_string()).into();
        assert!(matches!(err, ServiceError::Unavailable));
        assert_eq!(err.to_string(), "service temporarily unavailable, try again");
    }

    #[test]
    fn contention_maps_to_busy() {
        let err: ServiceError = StoreError::Contention {
            player: PlayerId::new("p"),
            attempts: 3,
        }
        .into();
        assert!(matches!(err, ServiceError::Busy));
    }
}
