//! The memory record — unit of recall (§3 "Memory").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MemoryContext;

/// One of {episodic, semantic, procedural} (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    Episodic,
    Semantic,
    Procedural,
}

impl MemoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryType::Episodic => "episodic",
            MemoryType::Semantic => "semantic",
            MemoryType::Procedural => "procedural",
        }
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "episodic" => Ok(MemoryType::Episodic),
            "semantic" => Ok(MemoryType::Semantic),
            "procedural" => Ok(MemoryType::Procedural),
            other => Err(format!("unknown memory type: {other}")),
        }
    }
}

/// What kind of node a connection endpoint refers to — memories and
/// concepts share the plasticity graph but live in separate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Memory,
    Concept,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Memory => "memory",
            NodeKind::Concept => "concept",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed reference to either a memory or a concept — the addressing
/// scheme `Connection::source`/`target` use (§3 "Connection").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: String,
    pub kind: NodeKind,
}

impl NodeRef {
    pub fn memory(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Memory,
        }
    }

    pub fn concept(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Concept,
        }
    }
}

/// A memory: the unit of recall (§3 "Memory").
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    pub id: String,
    pub content: String,
    /// Shorter derived summary, present when `content` exceeded the
    /// configured compression ceiling at write time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub trigger_situation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub memory_type: MemoryType,
    pub source_agent: String,
    pub keywords: Vec<String>,
    pub salience_score: f32,
    pub retrieval_count: u64,
    pub last_retrieved_at: Option<DateTime<Utc>>,
    pub current_activation: f32,
    pub last_activated: Option<DateTime<Utc>>,
    pub context: MemoryContext,
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Content used for retrieval: the summary when present, else the
    /// full content — "progressive" fetch per §4.E step 5.
    pub fn display_content(&self) -> &str {
        self.summary.as_deref().unwrap_or(&self.content)
    }
}
