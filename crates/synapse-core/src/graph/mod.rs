//! Plasticity graph domain model and update rules (§3 "Connection", §4.D).

pub mod hebbian;

mod connection;

pub use connection::{Connection, ConnectionType, MAX_OUTGOING, STRENGTH_FLOOR};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate statistics over the connection graph (§4.D "Statistics").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStats {
    pub total_connections: i64,
    pub by_type: HashMap<String, i64>,
    pub strong_count: i64,
    pub weak_count: i64,
    pub mean_strength: f32,
}
