use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

use crate::service::ServiceSettings;
use crate::validation::{DEFAULT_DENYLIST, DEFAULT_MAX_NAME_LEN, NameFilter};

const DEFAULT_STORE_PATH: &str = "leaderboard.json";
const DEFAULT_RETRY_INTERVAL_MS: u64 = 5_000;
const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 100;
const DEFAULT_PER_RESULT_LIMIT: usize = 100;
const DEFAULT_LOG_FILE: &str = "beatdeck.jsonl";

/// Root service configuration loaded from YAML. Every block is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ServiceConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub names: NamesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: ServiceConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.store.validate()?;
        self.leaderboard.validate()?;
        self.names.validate()?;
        self.logging.normalize();
        Ok(())
    }

    pub fn settings(&self) -> ServiceSettings {
        ServiceSettings {
            retry_interval: Duration::from_millis(self.store.retry_interval_ms),
            default_limit: self.leaderboard.default_limit,
            max_limit: MAX_LIMIT,
            per_result_limit: self.leaderboard.per_result_limit,
            names: NameFilter::new(self.names.max_len, &self.names.denylist),
        }
    }
}

/// Where the leaderboard lives and how often to retry reaching it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "store.path".to_string(),
                message: "path must not be empty".to_string(),
            });
        }

        if self.retry_interval_ms == 0 {
            return Err(ValidationError::InvalidField {
                field: "store.retry_interval_ms".to_string(),
                message: "retry interval must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL_MS
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LeaderboardConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_per_result_limit")]
    pub per_result_limit: Option<usize>,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            per_result_limit: default_per_result_limit(),
        }
    }
}

impl LeaderboardConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=MAX_LIMIT).contains(&self.default_limit) {
            return Err(ValidationError::InvalidField {
                field: "leaderboard.default_limit".to_string(),
                message: format!("limit must be between 1 and {MAX_LIMIT}"),
            });
        }

        if self.per_result_limit == Some(0) {
            return Err(ValidationError::InvalidField {
                field: "leaderboard.per_result_limit".to_string(),
                message: "per-result limit must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_per_result_limit() -> Option<usize> {
    Some(DEFAULT_PER_RESULT_LIMIT)
}

/// Player name rules.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NamesConfig {
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_NAME_LEN,
            denylist: default_denylist(),
        }
    }
}

impl NamesConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_len == 0 {
            return Err(ValidationError::InvalidField {
                field: "names.max_len".to_string(),
                message: "maximum name length must be greater than zero".to_string(),
            });
        }

        if let Some(index) = self.denylist.iter().position(|w| w.trim().is_empty()) {
            return Err(ValidationError::InvalidField {
                field: format!("names.denylist[{index}]"),
                message: "denylist entries must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn default_max_len() -> usize {
    DEFAULT_MAX_NAME_LEN
}

fn default_denylist() -> Vec<String> {
    DEFAULT_DENYLIST.iter().map(|w| w.to_string()).collect()
}

/// Logging configuration defaults to plain console output.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            file: default_log_file(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
        if self.file.as_os_str().is_empty() {
            self.file = default_log_file();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL_YAML: &str = r#"
store:
  path: "data/board.json"
  retry_interval_ms: 250
leaderboard:
  default_limit: 25
  per_result_limit: 10
names:
  max_len: 12
  denylist: ["boss", "root"]
logging:
  enable_structured: true
  tracing_level: "debug"
  file: "logs/beatdeck.jsonl"
"#;

    #[test]
    fn empty_document_uses_defaults() {
        let mut cfg: ServiceConfig = serde_yaml::from_str("{}").expect("parse yaml");
        cfg.validate().expect("validate");
        assert_eq!(cfg, ServiceConfig::default());

        let settings = cfg.settings();
        assert_eq!(settings.retry_interval, Duration::from_millis(5_000));
        assert_eq!(settings.default_limit, 50);
        assert_eq!(settings.per_result_limit, Some(100));
        assert_eq!(settings.names.max_len(), 20);
    }

    #[test]
    fn loads_full_config() {
        let mut cfg: ServiceConfig = serde_yaml::from_str(FULL_YAML).expect("parse yaml");
        cfg.validate().expect("validate");
        assert_eq!(cfg.store.path, PathBuf::from("data/board.json"));
        assert!(cfg.logging.enable_structured);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let settings = cfg.settings();
        assert_eq!(settings.retry_interval, Duration::from_millis(250));
        assert_eq!(settings.default_limit, 25);
        assert!(settings.names.is_denied("Root"));
        assert!(!settings.names.is_denied("admin"));
    }

    #[test]
    fn rejects_zero_retry_interval() {
        let yaml = FULL_YAML.replace("retry_interval_ms: 250", "retry_interval_ms: 0");
        let mut cfg: ServiceConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "store.retry_interval_ms"
        ));
    }

    #[test]
    fn rejects_limit_above_cap() {
        let yaml = FULL_YAML.replace("default_limit: 25", "default_limit: 500");
        let mut cfg: ServiceConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "leaderboard.default_limit"
        ));
    }

    #[test]
    fn blank_tracing_level_falls_back_to_info() {
        let yaml = FULL_YAML.replace("tracing_level: \"debug\"", "tracing_level: \"  \"");
        let mut cfg: ServiceConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.logging.tracing_level, "info");
    }

    #[test]
    fn from_path_reports_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"names:\n  max_len: 0\n").expect("write");
        let err = ServiceConfig::from_path(file.path()).expect_err("invalid");
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert_eq!(err.path(), file.path());
    }
}
