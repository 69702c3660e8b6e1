//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Resolution never fails; level validation happens in `init_logging`.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "KNOTRO_DB_PATH";
pub const BASE_URL_ENV: &str = "KNOTRO_BASE_URL";
pub const LOG_LEVEL_ENV: &str = "KNOTRO_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "KNOTRO_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "knotro.sqlite3";
const DEFAULT_BASE_URL: &str = "/";

/// Process configuration shared by the api and CLI entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file backing the note store.
    pub db_path: PathBuf,
    /// Base URL echoed back in note views.
    pub base_url: String,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Resolves configuration from `KNOTRO_*` variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        Self {
            db_path: value(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            base_url: value(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            log_level: value(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Configuration pointing at an explicit database file, other values
    /// defaulted.
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::from_lookup(|_| None)
        }
    }
}
