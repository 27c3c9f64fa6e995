//! Patient and family relationship models.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rxboard_redis::patients::PatientRow;
use rxboard_redis::relationships::RelationshipRow;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BoardError;

/// A patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub pid: String,
    pub name: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    /// Attributes the board does not interpret.
    pub extra: BTreeMap<String, Value>,
}

impl Patient {
    pub fn new(pid: impl Into<String>) -> Self {
        Self {
            pid: pid.into(),
            name: None,
            birth_date: None,
            gender: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn from_row(row: PatientRow) -> Self {
        Self {
            pid: row.pid,
            name: row.name,
            birth_date: row.birth_date,
            gender: row.gender,
            extra: row.extra,
        }
    }
}

/// A family relationship between two patients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyRelationship {
    pub pair_code: String,
    pub relationship: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

impl FamilyRelationship {
    pub fn new(pair_code: impl Into<String>, relationship: Option<&str>) -> Self {
        Self {
            pair_code: pair_code.into(),
            relationship: relationship.map(str::to_string),
            extra: BTreeMap::new(),
        }
    }

    pub fn from_row(row: RelationshipRow) -> Self {
        Self {
            pair_code: row.pair_code,
            relationship: row.relationship,
            extra: row.extra,
        }
    }

    /// Parsed pair code, or `None` when the stored code is malformed.
    pub fn pair(&self) -> Option<PairCode> {
        self.pair_code.parse().ok()
    }

    /// The other patient in this relationship, seen from `pid`.
    pub fn counterpart(&self, pid: &str) -> Option<String> {
        self.pair()
            .and_then(|pair| pair.counterpart(pid).map(str::to_string))
    }
}

/// A composite relationship key: `{first}-{second}` with an optional
/// `-{suffix}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairCode {
    first: String,
    second: String,
    suffix: Option<String>,
}

impl PairCode {
    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// Whether `pid` is either side of the pair.
    pub fn involves(&self, pid: &str) -> bool {
        self.first == pid || self.second == pid
    }

    pub fn counterpart(&self, pid: &str) -> Option<&str> {
        if self.first == pid {
            Some(&self.second)
        } else if self.second == pid {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl FromStr for PairCode {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        let first = parts.next().unwrap_or_default();
        let second = parts.next().unwrap_or_default();
        if first.is_empty() || second.is_empty() {
            return Err(BoardError::validation(format!("invalid pair code: {}", s)));
        }
        Ok(Self {
            first: first.to_string(),
            second: second.to_string(),
            suffix: parts.next().filter(|rest| !rest.is_empty()).map(str::to_string),
        })
    }
}

impl fmt::Display for PairCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.second)?;
        if let Some(suffix) = &self.suffix {
            write!(f, "-{}", suffix)?;
        }
        Ok(())
    }
}
