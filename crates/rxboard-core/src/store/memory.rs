use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{PayloadStore, RecordStore};
use crate::error::{BoardError, BoardResult};
use crate::lookup::{FamilyRelationship, Patient};

/// In-process store. Nothing survives the process; writes can be made to
/// fail on demand.
#[derive(Default)]
pub struct MemoryStore {
    latest: RwLock<Option<Value>>,
    patients: RwLock<BTreeMap<String, Patient>>,
    relationships: RwLock<BTreeMap<String, FamilyRelationship>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `upsert_latest` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful payload writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn insert_patient(&self, patient: Patient) {
        self.patients
            .write()
            .await
            .insert(patient.pid.clone(), patient);
    }

    pub async fn insert_relationship(&self, relationship: FamilyRelationship) {
        self.relationships
            .write()
            .await
            .insert(relationship.pair_code.clone(), relationship);
    }
}

#[async_trait]
impl PayloadStore for MemoryStore {
    async fn find_latest(&self) -> BoardResult<Option<Value>> {
        Ok(self.latest.read().await.clone())
    }

    async fn upsert_latest(&self, payload: &Value) -> BoardResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BoardError::unavailable("memory store is rejecting writes"));
        }
        *self.latest.write().await = Some(payload.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_patient(&self, pid: &str) -> BoardResult<Option<Patient>> {
        Ok(self.patients.read().await.get(pid).cloned())
    }

    async fn relationships_mentioning(&self, pid: &str) -> BoardResult<Vec<FamilyRelationship>> {
        Ok(self
            .relationships
            .read()
            .await
            .values()
            .filter(|rel| rel.pair_code.contains(pid))
            .cloned()
            .collect())
    }
}
