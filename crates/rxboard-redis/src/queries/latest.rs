//! Last-update queries — a single Redis hash holds the one tracked document.
//!
//! Layout: `rxboard:last_update` with fields `data` (JSON text) and
//! `updated_at` (RFC 3339). Both fields are written by one `HSET`, which
//! Redis applies atomically.

use std::collections::HashMap;

use crate::client::{RedisPool, RedisResult};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

fn latest_key() -> String {
    format!("{}:last_update", crate::KEY_PREFIX)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestRow {
    pub data: serde_json::Value,
    pub updated_at: String,
}

/// Read the tracked document, if one was ever written.
pub async fn get_latest(pool: &RedisPool) -> RedisResult<Option<LatestRow>> {
    let mut conn = pool.clone();
    let fields: HashMap<String, String> = conn.hgetall(latest_key()).await?;
    let Some(json) = fields.get("data") else {
        return Ok(None);
    };
    Ok(Some(LatestRow {
        data: serde_json::from_str(json)?,
        updated_at: fields.get("updated_at").cloned().unwrap_or_default(),
    }))
}

/// Create or replace the tracked document.
pub async fn upsert_latest(pool: &RedisPool, data: &serde_json::Value) -> RedisResult<LatestRow> {
    let mut conn = pool.clone();
    let json = serde_json::to_string(data)?;
    let now = chrono::Utc::now().to_rfc3339();
    conn.hset_multiple::<_, _, _, ()>(
        latest_key(),
        &[("data", json.as_str()), ("updated_at", now.as_str())],
    )
    .await?;
    Ok(LatestRow {
        data: data.clone(),
        updated_at: now,
    })
}

