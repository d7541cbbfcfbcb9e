//! Process configuration for the album store.
//!
//! # Responsibility
//! - Describe store location, pool tuning and logging destination.
//! - Load values from an optional TOML file, then apply env overrides.
//!
//! # Invariants
//! - A loaded `AppConfig` has passed `validate()`.
//! - Env overrides always win over file values.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Env var naming the TOML config file to load.
pub const CONFIG_PATH_ENV: &str = "ALBUMSTORE_CONFIG";

const DATABASE_PATH_ENV: &str = "ALBUMSTORE_DATABASE_PATH";
const POOL_MAX_SIZE_ENV: &str = "ALBUMSTORE_POOL_MAX_SIZE";
const CONNECT_TIMEOUT_ENV: &str = "ALBUMSTORE_CONNECT_TIMEOUT_MS";
const BUSY_TIMEOUT_ENV: &str = "ALBUMSTORE_BUSY_TIMEOUT_MS";
const LOG_LEVEL_ENV: &str = "ALBUMSTORE_LOG_LEVEL";
const LOG_DIR_ENV: &str = "ALBUMSTORE_LOG_DIR";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config TOML: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// Store location and connection pool tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file. Created on first open.
    pub database_path: PathBuf,
    /// Upper bound of pooled connections.
    pub pool_max_size: u32,
    /// How long a checkout waits for a free or new connection.
    pub connect_timeout_ms: u64,
    /// SQLite busy handler timeout applied to every connection.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("albums.db"),
            pool_max_size: 4,
            connect_timeout_ms: 5_000,
            busy_timeout_ms: 5_000,
        }
    }
}

impl StoreConfig {
    /// Config for a database file at `path` with default pool tuning.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: path.into(),
            ..Self::default()
        }
    }
}

/// Logging level and destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rotating log files. `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads config from `$ALBUMSTORE_CONFIG` (when set) and the process env.
    pub fn load() -> ConfigResult<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::read_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file without applying overrides.
    pub fn read_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies overrides from a key lookup (normally the process env).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(DATABASE_PATH_ENV) {
            self.store.database_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(POOL_MAX_SIZE_ENV) {
            self.store.pool_max_size = parse_number(POOL_MAX_SIZE_ENV, &value)?;
        }
        if let Some(value) = lookup(CONNECT_TIMEOUT_ENV) {
            self.store.connect_timeout_ms = parse_number(CONNECT_TIMEOUT_ENV, &value)?;
        }
        if let Some(value) = lookup(BUSY_TIMEOUT_ENV) {
            self.store.busy_timeout_ms = parse_number(BUSY_TIMEOUT_ENV, &value)?;
        }
        if let Some(value) = lookup(LOG_LEVEL_ENV) {
            self.logging.level = value;
        }
        if let Some(value) = lookup(LOG_DIR_ENV) {
            let trimmed = value.trim();
            self.logging.log_dir = if trimmed.is_empty() {
                None
            } else {
                Some(PathBuf::from(trimmed))
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "store.database_path cannot be empty".to_string(),
            ));
        }
        if self.store.pool_max_size == 0 {
            return Err(ConfigError::Invalid(
                "store.pool_max_size must be at least 1".to_string(),
            ));
        }
        if self.store.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.connect_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key} must be a number, got `{value}`")))
}
