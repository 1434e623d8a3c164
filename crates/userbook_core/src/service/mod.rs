//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into consumer-facing APIs.
//! - Keep UI/CLI layers decoupled from storage details.

pub mod user_store;
