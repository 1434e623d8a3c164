//! Core record store for userbook.
//! This crate is the single source of truth for record invariants: id
//! uniqueness, read-modify-write sequencing and date-format round-tripping.

pub mod config;
pub mod date;
pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod storage;
pub mod view;

pub use config::{ConfigError, ConfigResult, StoreConfig};
pub use date::{
    compare_dates, sort_by_availability, to_canonical, to_display, to_picker, to_sort_key,
};
pub use filter::UserFilter;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::user::{NewUser, UserId, UserPatch, UserRecord};
pub use notify::{ChangeNotifier, Subscription};
pub use repo::user_repo::{
    Clock, RepoError, RepoResult, StoreUserRepository, SystemClock, UserRepository,
};
pub use service::user_store::ReactiveUserStore;
pub use storage::{
    KeyValueMedium, MediumError, MediumResult, MemoryMedium, PersistentStore, SqliteMedium,
    StoreError, StoreResult, DEFAULT_STORAGE_KEY,
};
pub use view::{Page, SortColumn};

/// Minimal health-check API for linkage probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
