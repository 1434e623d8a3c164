//! Store configuration and bootstrap.
//!
//! # Responsibility
//! - Describe where the collection lives and how logging is set up.
//! - Resolve configuration from defaults and `USERBOOK_*` environment values.
//! - Open a ready-to-use reactive store from a configuration.
//!
//! # Invariants
//! - The storage key is never empty.
//! - `db_path = None` selects an in-memory medium.

use crate::logging::default_log_level;
use crate::notify::ChangeNotifier;
use crate::repo::user_repo::StoreUserRepository;
use crate::service::user_store::ReactiveUserStore;
use crate::storage::medium::{KeyValueMedium, MediumError, MemoryMedium};
use crate::storage::sqlite::SqliteMedium;
use crate::storage::store::{PersistentStore, DEFAULT_STORAGE_KEY};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

pub const ENV_STORAGE_KEY: &str = "USERBOOK_STORAGE_KEY";
pub const ENV_DB_PATH: &str = "USERBOOK_DB";
pub const ENV_LOG_LEVEL: &str = "USERBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "USERBOOK_LOG_DIR";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration or bootstrap failure.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, message: String },
    Medium(MediumError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, message } => write!(f, "invalid {field}: {message}"),
            Self::Medium(err) => write!(f, "failed to open storage: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidValue { .. } => None,
            Self::Medium(err) => Some(err),
        }
    }
}

impl From<MediumError> for ConfigError {
    fn from(value: MediumError) -> Self {
        Self::Medium(value)
    }
}

/// Runtime configuration for one store instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_key: String,
    /// SQLite file; `None` keeps the collection in memory.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute log directory; `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by `USERBOOK_*` process environment values.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by values from `lookup`; blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(key) = read(ENV_STORAGE_KEY) {
            config.storage_key = key;
        }
        config.db_path = read(ENV_DB_PATH).map(PathBuf::from);
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage_key",
                message: "storage key cannot be empty".to_string(),
            });
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    field: "log_dir",
                    message: format!("must be an absolute path, got `{}`", dir.display()),
                });
            }
        }
        Ok(())
    }

    /// Opens the configured medium.
    pub fn open_medium(&self) -> ConfigResult<Arc<dyn KeyValueMedium>> {
        let medium: Arc<dyn KeyValueMedium> = match &self.db_path {
            Some(path) => Arc::new(SqliteMedium::open(path)?),
            None => Arc::new(MemoryMedium::new()),
        };
        Ok(medium)
    }

    /// Opens a persistent store signalling on `notifier`.
    pub fn open_store(&self, notifier: ChangeNotifier) -> ConfigResult<PersistentStore> {
        self.validate()?;
        Ok(PersistentStore::with_key(
            self.open_medium()?,
            self.storage_key.clone(),
            notifier,
        ))
    }

    /// Opens a reactive store on the process-wide notifier.
    pub fn open_user_store(&self) -> ConfigResult<ReactiveUserStore<StoreUserRepository>> {
        let store = self.open_store(ChangeNotifier::global().clone())?;
        Ok(ReactiveUserStore::open(store))
    }
}
