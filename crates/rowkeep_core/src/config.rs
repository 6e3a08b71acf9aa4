//! Process-level configuration read from the environment.
//!
//! | Variable            | Meaning                                   |
//! |---------------------|-------------------------------------------|
//! | `ROWKEEP_DB_PATH`   | SQLite file; in-memory database if unset  |
//! | `ROWKEEP_LOG_LEVEL` | trace, debug, info, warn, error           |
//! | `ROWKEEP_LOG_DIR`   | absolute directory; file logging if set   |

use crate::logging::{default_log_level, normalize_level};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "ROWKEEP_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "ROWKEEP_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "ROWKEEP_LOG_DIR";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid ROWKEEP_LOG_LEVEL: {0}")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let log_level = match read(LOG_LEVEL_VAR) {
            Some(level) => normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        Ok(Self {
            db_path: read(DB_PATH_VAR).map(PathBuf::from),
            log_level,
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
        })
    }
}
