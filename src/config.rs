use std::{path::PathBuf, time::Duration};

use chess_core::TimeControl;
use chess_session_app::SessionSettings;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("failed to initialise logging: {0}")]
    Logger(String),
}

#[derive(Clone, Debug)]
pub struct LogFileConfig {
    pub path: String,
    pub archive_pattern: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub session: SessionSettings,
    pub games_dir: PathBuf,
    /// Rolling log file, only when both path and archive pattern are configured.
    pub log_file: Option<LogFileConfig>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let number = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidNumber { key, value }),
            }
        };
        let positive = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match number(key, default)? {
                0 => Err(ConfigError::Zero(key)),
                n => Ok(n),
            }
        };

        let time_control = TimeControl::new(
            Duration::from_millis(positive("CHESS_INITIAL_TIME_MS", 600_000)?),
            Duration::from_millis(number("CHESS_INCREMENT_MS", 0)?),
        );
        let session = SessionSettings {
            time_control,
            invitation_ttl: Duration::from_secs(positive("CHESS_INVITATION_TTL_SECS", 86_400)?),
            invitation_sweep_interval: Duration::from_secs(positive(
                "CHESS_INVITATION_SWEEP_SECS",
                60,
            )?),
            clock_sweep_interval: Duration::from_millis(positive("CHESS_CLOCK_SWEEP_MS", 1_000)?),
        };

        let games_dir = lookup("CHESS_GAMES_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .unwrap_or_else(|| "./data/games".to_string());

        let log_file = match (lookup("LOG_FILE_PATH"), lookup("LOG_ARCHIVE_PATTERN")) {
            (Some(path), Some(archive_pattern)) => Some(LogFileConfig {
                path,
                archive_pattern,
            }),
            _ => None,
        };

        Ok(ServerConfig {
            session,
            games_dir: PathBuf::from(games_dir),
            log_file,
        })
    }
}
