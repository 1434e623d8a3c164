//! Synchronous key-value medium contract.
//!
//! # Responsibility
//! - Abstract the single-blob string storage the record store sits on.
//! - Provide an in-memory implementation for tests and ephemeral sessions.
//!
//! # Invariants
//! - `set` replaces the whole value for a key; there are no partial writes.
//! - `get` of a never-written key is `Ok(None)`, not an error.

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

pub type MediumResult<T> = Result<T, MediumError>;

/// Transport-level failure from a storage medium.
#[derive(Debug)]
pub enum MediumError {
    Sqlite(rusqlite::Error),
    Db(crate::db::DbError),
}

impl Display for MediumError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MediumError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for MediumError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<crate::db::DbError> for MediumError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Db(value)
    }
}

/// Untyped string storage keyed by name.
pub trait KeyValueMedium: Send + Sync {
    fn get(&self, key: &str) -> MediumResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> MediumResult<()>;
    fn remove(&self, key: &str) -> MediumResult<()>;
}

impl<M: KeyValueMedium + ?Sized> KeyValueMedium for Arc<M> {
    fn get(&self, key: &str) -> MediumResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> MediumResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> MediumResult<()> {
        (**self).remove(key)
    }
}

/// Process-local medium backed by a hash map.
///
/// Clones share the same entries, which models several store handles
/// looking at one browser profile.
#[derive(Debug, Clone, Default)]
pub struct MemoryMedium {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueMedium for MemoryMedium {
    fn get(&self, key: &str) -> MediumResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> MediumResult<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> MediumResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}
