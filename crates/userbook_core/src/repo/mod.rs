//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate collection storage details from store/business orchestration.
//!
//! # Invariants
//! - Repository APIs report missing records as absent values, and only
//!   surface storage transport errors as `RepoError`.

pub mod user_repo;
