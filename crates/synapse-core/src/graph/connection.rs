//! Connection — a typed weighted edge in the plasticity graph (§3
//! "Connection").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::memory::NodeRef;

/// Edge kind, mirroring the semantic taxonomy the consolidator and the
/// extractor both reason about (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Semantic,
    Temporal,
    Causal,
    Procedural,
    Hierarchical,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Semantic => "semantic",
            ConnectionType::Temporal => "temporal",
            ConnectionType::Causal => "causal",
            ConnectionType::Procedural => "procedural",
            ConnectionType::Hierarchical => "hierarchical",
        }
    }
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ConnectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "semantic" => Ok(ConnectionType::Semantic),
            "temporal" => Ok(ConnectionType::Temporal),
            "causal" => Ok(ConnectionType::Causal),
            "procedural" => Ok(ConnectionType::Procedural),
            "hierarchical" => Ok(ConnectionType::Hierarchical),
            other => Err(format!("unknown connection type: {other}")),
        }
    }
}

/// Floor below which an edge is pruning-eligible and invisible to
/// `get_outgoing` (§3, §4.D).
pub const STRENGTH_FLOOR: f32 = 0.05;

/// Cap on outgoing edges returned per node — a correctness contract for
/// spreading activation, not an optimization (§4.D, §4.E edge cases).
pub const MAX_OUTGOING: usize = 20;

#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: NodeRef,
    pub target: NodeRef,
    pub connection_type: ConnectionType,
    pub strength: f32,
    pub usage_count: u64,
    pub last_used_at: DateTime<Utc>,
}
