//! Typed collection store over a key-value medium.
//!
//! # Responsibility
//! - Read and write the whole user collection as one JSON payload.
//! - Publish a change signal after every successful write.
//!
//! # Invariants
//! - Reads never fail: a missing, unreadable or corrupt payload reads as an
//!   empty collection.
//! - Writes replace the full collection under a single key.
//! - `write` and `modify` on one handle are serialized by a shared cycle
//!   lock; the change signal fires after that lock is released.

use super::medium::{KeyValueMedium, MediumError};
use crate::model::user::UserRecord;
use crate::notify::ChangeNotifier;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

/// Default storage key holding the serialized collection.
pub const DEFAULT_STORAGE_KEY: &str = "users_db";

pub type StoreResult<T> = Result<T, StoreError>;

/// Write-path failure of the persistent store.
#[derive(Debug)]
pub enum StoreError {
    Medium(MediumError),
    Serialize(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Medium(err) => write!(f, "storage medium failure: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize user collection: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Medium(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<MediumError> for StoreError {
    fn from(value: MediumError) -> Self {
        Self::Medium(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Handle to the persisted user collection.
///
/// Clones share the medium, key, notifier and cycle lock.
#[derive(Clone)]
pub struct PersistentStore {
    medium: Arc<dyn KeyValueMedium>,
    key: Arc<str>,
    notifier: ChangeNotifier,
    cycle_lock: Arc<Mutex<()>>,
}

impl PersistentStore {
    /// Creates a store on `medium` under the default key.
    pub fn new(medium: Arc<dyn KeyValueMedium>, notifier: ChangeNotifier) -> Self {
        Self::with_key(medium, DEFAULT_STORAGE_KEY, notifier)
    }

    pub fn with_key(
        medium: Arc<dyn KeyValueMedium>,
        key: impl Into<String>,
        notifier: ChangeNotifier,
    ) -> Self {
        Self {
            medium,
            key: Arc::from(key.into()),
            notifier,
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Notifier signalled after each write.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Returns the persisted collection, or an empty one.
    pub fn read(&self) -> Vec<UserRecord> {
        let raw = match self.medium.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(
                    "event=store_read module=storage status=degraded key={} reason=medium_error error={}",
                    self.key, err
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<UserRecord>>(&raw) {
            Ok(users) => users,
            Err(err) => {
                warn!(
                    "event=store_read module=storage status=degraded key={} reason=corrupt_payload payload_bytes={} error={}",
                    self.key,
                    raw.len(),
                    err
                );
                Vec::new()
            }
        }
    }

    /// Replaces the persisted collection and publishes a change signal.
    pub fn write(&self, users: &[UserRecord]) -> StoreResult<()> {
        {
            let _cycle = self.lock_cycle();
            self.persist(users)?;
        }
        self.notifier.publish();
        Ok(())
    }

    /// Runs one read-modify-write cycle and publishes afterwards.
    ///
    /// `apply` sees the current collection; whatever it leaves behind is
    /// written back, even when it made no change.
    pub fn modify<T, F>(&self, apply: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Vec<UserRecord>) -> T,
    {
        let outcome = {
            let _cycle = self.lock_cycle();
            let mut users = self.read();
            let outcome = apply(&mut users);
            self.persist(&users)?;
            outcome
        };
        self.notifier.publish();
        Ok(outcome)
    }

    fn lock_cycle(&self) -> MutexGuard<'_, ()> {
        self.cycle_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, users: &[UserRecord]) -> StoreResult<()> {
        let payload = serde_json::to_string(users)?;
        self.medium.set(&self.key, &payload)?;
        debug!(
            "event=store_write module=storage status=ok key={} records={} payload_bytes={}",
            self.key,
            users.len(),
            payload.len()
        );
        Ok(())
    }
}
