//! Storage seams for the broadcaster and the lookup service.
//!
//! Both services talk to storage through these traits so they can run
//! against Redis in production and against [`MemoryStore`] in tests.

mod memory;
mod redis_store;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BoardResult;
use crate::lookup::{FamilyRelationship, Patient};

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Durable single-document store holding the latest payload.
#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// The most recently written payload, if any.
    async fn find_latest(&self) -> BoardResult<Option<Value>>;

    /// Replace the tracked payload, creating it if absent.
    async fn upsert_latest(&self, payload: &Value) -> BoardResult<()>;
}

/// Read-only patient and relationship records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_patient(&self, pid: &str) -> BoardResult<Option<Patient>>;

    /// Relationship records that may involve `pid`. Implementations may
    /// over-match; the lookup service filters on the parsed pair code.
    async fn relationships_mentioning(&self, pid: &str) -> BoardResult<Vec<FamilyRelationship>>;
}
