//! User repository contracts and store-backed implementation.
//!
//! # Responsibility
//! - Provide typed CRUD APIs over the persisted user collection.
//! - Own id assignment and read-modify-write sequencing.
//!
//! # Invariants
//! - Every mutation is one read-modify-write cycle that writes (and
//!   therefore notifies) unconditionally, even when nothing changed.
//! - Assigned ids are distinct from every id present at creation time.
//! - Missing ids are reported as `None`/`false`, never as errors.

use crate::model::user::{NewUser, UserId, UserPatch, UserRecord};
use crate::storage::store::{PersistentStore, StoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for user persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Source of the monotonic reading new ids derive from.
pub trait Clock: Send + Sync {
    /// Current time in epoch milliseconds.
    fn now_millis(&self) -> i64;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
            })
    }
}

/// Repository interface for user CRUD operations.
pub trait UserRepository: Send + Sync {
    fn list(&self) -> Vec<UserRecord>;
    fn get(&self, id: UserId) -> Option<UserRecord>;
    fn create(&self, fields: NewUser) -> RepoResult<UserRecord>;
    fn update(&self, id: UserId, patch: &UserPatch) -> RepoResult<Option<UserRecord>>;
    fn delete(&self, id: UserId) -> RepoResult<bool>;
}

/// Repository over a `PersistentStore`.
pub struct StoreUserRepository<C: Clock = SystemClock> {
    store: PersistentStore,
    clock: C,
}

impl StoreUserRepository<SystemClock> {
    pub fn new(store: PersistentStore) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<C: Clock> StoreUserRepository<C> {
    pub fn with_clock(store: PersistentStore, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &PersistentStore {
        &self.store
    }
}

impl<C: Clock> UserRepository for StoreUserRepository<C> {
    fn list(&self) -> Vec<UserRecord> {
        self.store.read()
    }

    fn get(&self, id: UserId) -> Option<UserRecord> {
        self.store.read().into_iter().find(|user| user.id == id)
    }

    fn create(&self, fields: NewUser) -> RepoResult<UserRecord> {
        let tick = self.clock.now_millis();
        let created = self.store.modify(|users| {
            let id = next_id(tick, users);
            let user = UserRecord::from_new(id, fields);
            users.push(user.clone());
            user
        })?;

        info!(
            "event=user_create module=repo status=ok id={} clock_ms={}",
            created.id, tick
        );
        Ok(created)
    }

    fn update(&self, id: UserId, patch: &UserPatch) -> RepoResult<Option<UserRecord>> {
        let updated = self.store.modify(|users| {
            users.iter_mut().find(|user| user.id == id).map(|user| {
                user.apply_patch(patch);
                user.clone()
            })
        })?;

        info!(
            "event=user_update module=repo status={} id={}",
            if updated.is_some() { "ok" } else { "not_found" },
            id
        );
        Ok(updated)
    }

    fn delete(&self, id: UserId) -> RepoResult<bool> {
        let removed = self.store.modify(|users| {
            let before = users.len();
            users.retain(|user| user.id != id);
            users.len() != before
        })?;

        info!(
            "event=user_delete module=repo status={} id={}",
            if removed { "ok" } else { "not_found" },
            id
        );
        Ok(removed)
    }
}

/// Picks the clock tick unless it would collide with (or fall behind) an
/// existing id, in which case the id after the current maximum is used.
fn next_id(tick: i64, users: &[UserRecord]) -> UserId {
    match users.iter().map(|user| user.id).max() {
        Some(max_id) if max_id >= tick => max_id.saturating_add(1),
        _ => tick,
    }
}

#[cfg(test)]
mod tests {
    use super::next_id;
    use crate::model::user::{NewUser, UserRecord};

    #[test]
    fn next_id_uses_tick_when_free() {
        assert_eq!(next_id(1_000, &[]), 1_000);
        let users = vec![UserRecord::from_new(10, NewUser::default())];
        assert_eq!(next_id(1_000, &users), 1_000);
    }

    #[test]
    fn next_id_steps_past_colliding_or_newer_ids() {
        let users = vec![
            UserRecord::from_new(1_000, NewUser::default()),
            UserRecord::from_new(1_005, NewUser::default()),
        ];
        assert_eq!(next_id(1_000, &users), 1_006);
        assert_eq!(next_id(1_003, &users), 1_006);
    }
}
