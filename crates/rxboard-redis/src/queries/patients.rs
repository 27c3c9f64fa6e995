//! Patient queries — Redis implementation.
//!
//! Each patient lives in `rxboard:patient:{pid}` under the `data` field.

use std::collections::BTreeMap;

use crate::client::{RedisPool, RedisResult};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRow {
    pub pid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

pub fn patient_key(pid: &str) -> String {
    format!("{}:patient:{}", crate::KEY_PREFIX, pid)
}

pub async fn get_patient(pool: &RedisPool, pid: &str) -> RedisResult<Option<PatientRow>> {
    let mut conn = pool.clone();
    let json: Option<String> = conn.hget(patient_key(pid), "data").await?;
    match json {
        Some(j) => Ok(Some(serde_json::from_str(&j)?)),
        None => Ok(None),
    }
}
