//! Domain model for person records.
//!
//! # Responsibility
//! - Define canonical data structures used by store and repository logic.
//!
//! # Invariants
//! - Every record is identified by a stable, repository-assigned `UserId`.
//! - Deletion removes the record from the collection; there are no tombstones.

pub mod user;
