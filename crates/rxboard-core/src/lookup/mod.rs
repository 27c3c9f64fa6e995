//! Patient relationship lookup.
//!
//! Independent of the broadcaster: it owns its own store handle and
//! nothing else.

pub mod model;

use std::sync::Arc;

use crate::error::BoardResult;
use crate::store::RecordStore;
pub use model::{FamilyRelationship, PairCode, Patient};

/// Result of looking up a patient identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The identifier was blank.
    InvalidPid,
    /// No patient has this identifier.
    NotFound { pid: String },
    Found {
        patient: Patient,
        relationships: Vec<FamilyRelationship>,
    },
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found { .. })
    }

    /// Relationships of the found patient; empty otherwise.
    pub fn relationships(&self) -> &[FamilyRelationship] {
        match self {
            LookupOutcome::Found { relationships, .. } => relationships,
            _ => &[],
        }
    }
}

/// Read-only lookup over patient and relationship records.
#[derive(Clone)]
pub struct LookupService {
    store: Arc<dyn RecordStore>,
}

impl LookupService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Find a patient and every relationship naming them on either side.
    pub async fn lookup(&self, pid: &str) -> BoardResult<LookupOutcome> {
        let pid = pid.trim();
        if pid.is_empty() {
            return Ok(LookupOutcome::InvalidPid);
        }

        let Some(patient) = self.store.find_patient(pid).await? else {
            tracing::debug!(pid = %pid, "Patient not found");
            return Ok(LookupOutcome::NotFound {
                pid: pid.to_string(),
            });
        };

        let mut relationships: Vec<FamilyRelationship> = self
            .store
            .relationships_mentioning(pid)
            .await?
            .into_iter()
            .filter(|rel| rel.pair().is_some_and(|pair| pair.involves(pid)))
            .collect();
        relationships.sort_by(|a, b| a.pair_code.cmp(&b.pair_code));
        relationships.dedup_by(|a, b| a.pair_code == b.pair_code);

        tracing::debug!(pid = %pid, count = relationships.len(), "Patient found");
        Ok(LookupOutcome::Found {
            patient,
            relationships,
        })
    }
}
