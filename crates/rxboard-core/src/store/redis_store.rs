use async_trait::async_trait;
use rxboard_redis::{latest, patients, relationships, RedisPool};
use serde_json::Value;

use super::{PayloadStore, RecordStore};
use crate::error::BoardResult;
use crate::lookup::{FamilyRelationship, Patient};

/// Redis-backed implementation of both store traits.
#[derive(Clone)]
pub struct RedisStore {
    pool: RedisPool,
}

impl RedisStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PayloadStore for RedisStore {
    async fn find_latest(&self) -> BoardResult<Option<Value>> {
        let row = latest::get_latest(&self.pool).await?;
        Ok(row.map(|r| r.data))
    }

    async fn upsert_latest(&self, payload: &Value) -> BoardResult<()> {
        let row = latest::upsert_latest(&self.pool, payload).await?;
        tracing::debug!(updated_at = %row.updated_at, "Latest payload stored");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn find_patient(&self, pid: &str) -> BoardResult<Option<Patient>> {
        let row = patients::get_patient(&self.pool, pid).await?;
        Ok(row.map(Patient::from_row))
    }

    async fn relationships_mentioning(&self, pid: &str) -> BoardResult<Vec<FamilyRelationship>> {
        let rows = relationships::list_relationships_mentioning(&self.pool, pid).await?;
        Ok(rows.into_iter().map(FamilyRelationship::from_row).collect())
    }
}
