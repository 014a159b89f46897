//! Memory domain model
//!
//! Defines the record types of the associative memory engine: memories,
//! concepts, entities, and relations (§3). These are pure data types with
//! no storage or retrieval behavior attached — `storage::Storage` persists
//! them, `activation` spreads over them, `consolidation` rewires them.

mod concept;
mod entity;
mod record;
mod relation;

pub use concept::Concept;
pub use entity::{Entity, EntityType};
pub use record::{MemoryRecord, MemoryType, NodeKind, NodeRef};
pub use relation::{Relation, RelationStatus};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sidecar map carried on a memory record (`storage_method`, surprise
/// flags, `original_length` when compressed, …). Kept as a loosely typed
/// map because its key set is open-ended (§3 "Memory" — `context`), unlike
/// the closed enums the rest of the model uses.
pub type MemoryContext = HashMap<String, serde_json::Value>;

/// Aggregate statistics over the memory store (§4.B "Statistics").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total_memories: i64,
    pub by_type: HashMap<String, i64>,
    pub by_source_agent: HashMap<String, i64>,
}
