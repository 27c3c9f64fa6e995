//! rxboard Redis Data Layer
//!
//! Async Redis persistence for the pharmacy display board: the single
//! "last update" document and the read-only patient records.

pub mod client;
pub mod queries;

pub use client::{RedisError, RedisPool, RedisResult, init_pool};
pub use queries::latest;
pub use queries::patients;
pub use queries::relationships;

/// Prefix shared by every key this crate reads or writes.
pub const KEY_PREFIX: &str = "rxboard";
