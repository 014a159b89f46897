//! Relation — a typed, temporally-scoped statement between two entities
//! in the context of a memory (§3 "Relation").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a relation under the bi-temporal model (§3, §8.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationStatus {
    Active,
    Superseded,
    Invalid,
}

impl RelationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationStatus::Active => "active",
            RelationStatus::Superseded => "superseded",
            RelationStatus::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for RelationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: String,
    pub memory_id: String,
    pub subject_entity_id: String,
    /// Free-form predicate; canonical examples: `solved`, `uses`,
    /// `caused_by`, `co-occurs` (§3).
    pub predicate: String,
    pub object_entity_id: String,
    pub confidence: f32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
    pub relation_status: RelationStatus,
}

impl Relation {
    /// Bi-temporal invariant (i): `valid_from <= transaction_time`.
    pub fn respects_monotone_time(&self, transaction_time: DateTime<Utc>) -> bool {
        self.valid_from <= transaction_time
    }
}
