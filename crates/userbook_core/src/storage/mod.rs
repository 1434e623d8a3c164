//! Persistence boundary for the user collection.
//!
//! # Responsibility
//! - Define the raw key-value medium contract and its implementations.
//! - Turn the untyped medium into a typed, notifying collection store.
//!
//! # Invariants
//! - The whole collection lives under one key; there is no secondary index.

pub mod medium;
pub mod sqlite;
pub mod store;

pub use medium::{KeyValueMedium, MediumError, MediumResult, MemoryMedium};
pub use sqlite::SqliteMedium;
pub use store::{PersistentStore, StoreError, StoreResult, DEFAULT_STORAGE_KEY};
