//! Reactive user store.
//!
//! # Responsibility
//! - Mirror the persisted collection in an in-memory snapshot cache.
//! - Refresh the cache on every change signal and after every own mutation.
//! - Notify snapshot consumers whenever the cache reference is replaced.
//!
//! # Invariants
//! - The cache is always rebuilt wholesale from `UserRepository::list`.
//! - Mutation methods reload unconditionally before returning, so callers
//!   observe their own write in `snapshot()` immediately.
//! - Redundant reloads are harmless: each one recomputes from storage.
//! - Reloads are serialized: listing and cache replacement happen under one
//!   lock, so a slow reload cannot overwrite a newer cache. Snapshot
//!   subscribers fire after that lock is released.

use crate::filter::UserFilter;
use crate::model::user::{NewUser, UserId, UserPatch, UserRecord};
use crate::notify::{ChangeNotifier, Subscription};
use crate::repo::user_repo::{RepoResult, StoreUserRepository, UserRepository};
use crate::storage::store::PersistentStore;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

struct Shared<R> {
    repo: R,
    cache: RwLock<Arc<Vec<UserRecord>>>,
    reload_lock: Mutex<()>,
    snapshot_changes: ChangeNotifier,
    generation: AtomicU64,
}

impl<R: UserRepository> Shared<R> {
    fn reload(&self) {
        let (records, generation) = {
            let _reload = self
                .reload_lock
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let users = Arc::new(self.repo.list());
            let records = users.len();
            *self
                .cache
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = users;
            (records, self.generation.fetch_add(1, Ordering::SeqCst) + 1)
        };
        debug!(
            "event=cache_reload module=service status=ok records={} generation={}",
            records, generation
        );
        self.snapshot_changes.publish();
    }

    fn snapshot(&self) -> Arc<Vec<UserRecord>> {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Cached, self-refreshing view over a user repository.
pub struct ReactiveUserStore<R: UserRepository + 'static> {
    shared: Arc<Shared<R>>,
    _changes: Subscription,
}

impl ReactiveUserStore<StoreUserRepository> {
    /// Builds a store over `store` using its own change notifier.
    pub fn open(store: PersistentStore) -> Self {
        let changes = store.notifier().clone();
        Self::new(StoreUserRepository::new(store), &changes)
    }
}

impl<R: UserRepository + 'static> ReactiveUserStore<R> {
    /// Subscribes to `changes` and performs the initial reload.
    pub fn new(repo: R, changes: &ChangeNotifier) -> Self {
        let shared = Arc::new(Shared {
            repo,
            cache: RwLock::new(Arc::new(Vec::new())),
            reload_lock: Mutex::new(()),
            snapshot_changes: ChangeNotifier::new(),
            generation: AtomicU64::new(0),
        });

        let weak = Arc::downgrade(&shared);
        let subscription = changes.subscribe(move || {
            if let Some(shared) = weak.upgrade() {
                shared.reload();
            }
        });

        shared.reload();
        Self {
            shared,
            _changes: subscription,
        }
    }

    /// Current cached collection.
    pub fn snapshot(&self) -> Arc<Vec<UserRecord>> {
        self.shared.snapshot()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Number of reloads performed so far.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    /// Registers a handler fired after every cache replacement.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.snapshot_changes.subscribe(handler)
    }

    /// Replaces the cache with the authoritative collection.
    pub fn reload(&self) {
        self.shared.reload();
    }

    /// Reads one record from storage, bypassing the cache.
    pub fn get(&self, id: UserId) -> Option<UserRecord> {
        self.shared.repo.get(id)
    }

    pub fn add(&self, fields: NewUser) -> RepoResult<UserRecord> {
        let result = self.shared.repo.create(fields);
        self.reload();
        result
    }

    pub fn update(&self, id: UserId, patch: &UserPatch) -> RepoResult<Option<UserRecord>> {
        let result = self.shared.repo.update(id, patch);
        self.reload();
        result
    }

    pub fn remove(&self, id: UserId) -> RepoResult<bool> {
        let result = self.shared.repo.delete(id);
        self.reload();
        result
    }

    /// Applies `filter` to the current cache.
    pub fn filtered(&self, filter: &UserFilter) -> Vec<UserRecord> {
        filter.apply(&self.snapshot())
    }
}
