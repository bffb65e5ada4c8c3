//! Layered catalog configuration.
//!
//! # Responsibility
//! - Load database, logging and SQL-logging settings from defaults, an
//!   optional TOML file, `.env` and `BOOKSHELF__*` environment variables.
//!
//! # Invariants
//! - Every field has a default, so an empty source set yields a usable
//!   in-memory configuration.
//! - Later sources win: defaults < file < environment.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_PATH_ENV: &str = "BOOKSHELF_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "bookshelf.toml";
const ENV_PREFIX: &str = "BOOKSHELF";
const ENV_SEPARATOR: &str = "__";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration passed explicitly to catalog wiring.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CatalogConfig {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub sql: SqlLogSettings,
}

impl CatalogConfig {
    /// Loads configuration from `.env`, the config file and the environment.
    ///
    /// The file is `$BOOKSHELF_CONFIG` when set, `./bookshelf.toml` otherwise;
    /// a missing file is not an error.
    pub fn load() -> ConfigResult<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    /// Loads configuration from an explicit file path plus the environment.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let settings: Self = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> ConfigResult<()> {
        crate::logging::normalize_level(&self.logging.level).map_err(ConfigError::Invalid)?;
        if let Some(path) = self.database.path.as_deref() {
            if path.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "database.path cannot be blank; omit it for an in-memory database".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Where the catalog database lives.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// SQLite file path; `None` selects an in-memory database.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "DatabaseSettings::default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl DatabaseSettings {
    fn default_busy_timeout_ms() -> u64 {
        5_000
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: Self::default_busy_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingSettings {
    #[serde(default = "LoggingSettings::default_level")]
    pub level: String,
    /// Absolute directory for rotating log files; `None` logs to stderr.
    #[serde(default)]
    pub dir: Option<String>,
}

impl LoggingSettings {
    fn default_level() -> String {
        crate::logging::default_log_level().to_string()
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            dir: None,
        }
    }
}

/// Statement logging switches, the equivalent of `show_sql`/`format_sql`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SqlLogSettings {
    #[serde(default)]
    pub show: bool,
    #[serde(default = "SqlLogSettings::default_format")]
    pub format: bool,
}

impl SqlLogSettings {
    fn default_format() -> bool {
        true
    }
}

impl Default for SqlLogSettings {
    fn default() -> Self {
        Self {
            show: false,
            format: Self::default_format(),
        }
    }
}
