//! Family relationship queries — Redis implementation.
//!
//! Each record lives in `rxboard:relationship:{pair_code}` under the `data`
//! field. Pair codes look like `{pid_a}-{pid_b}` with an optional trailing
//! `-{suffix}`.

use std::collections::{BTreeMap, BTreeSet};

use crate::client::{escape_glob, RedisPool, RedisResult};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipRow {
    pub pair_code: String,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

pub fn relationship_key(pair_code: &str) -> String {
    format!("{}:relationship:{}", crate::KEY_PREFIX, pair_code)
}

/// List relationship records whose key mentions `pid` next to a dash.
///
/// This is a coarse key match; callers decide whether `pid` really is one
/// side of the pair.
pub async fn list_relationships_mentioning(
    pool: &RedisPool,
    pid: &str,
) -> RedisResult<Vec<RelationshipRow>> {
    let pid = escape_glob(pid);
    let patterns = [
        relationship_key(&format!("{}-*", pid)),
        relationship_key(&format!("*-{}*", pid)),
    ];

    let mut keys = BTreeSet::new();
    for pattern in &patterns {
        let mut conn = pool.clone();
        let mut scan: redis::AsyncIter<String> = conn.scan_match(pattern).await?;
        while let Some(key) = scan.next_item().await {
            keys.insert(key);
        }
    }

    let mut rows = Vec::with_capacity(keys.len());
    for key in keys {
        let mut conn = pool.clone();
        let json: Option<String> = conn.hget(&key, "data").await?;
        if let Some(j) = json {
            rows.push(serde_json::from_str(&j)?);
        } else {
            tracing::warn!(key = %key, "Relationship key without data field");
        }
    }
    Ok(rows)
}
