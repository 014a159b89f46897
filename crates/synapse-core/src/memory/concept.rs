//! Concept — a named cluster of meaning that can seed spreading
//! activation (§3 "Concept").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: String,
    pub name: String,
    pub current_activation: f32,
    pub last_activated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
