//! Entity — a typed noun lifted from a memory's text (§3 "Entity").

use serde::{Deserialize, Serialize};

/// Closed set of entity kinds the extractor recognizes (§4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Person,
    Tool,
    Concept,
    File,
    Error,
    Solution,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Tool => "TOOL",
            EntityType::Concept => "CONCEPT",
            EntityType::File => "FILE",
            EntityType::Error => "ERROR",
            EntityType::Solution => "SOLUTION",
        }
    }

    /// Default salience assigned by the extractor, before dedup takes the
    /// max across occurrences (§4.C "Salience defaults per kind").
    pub fn default_salience(&self) -> f32 {
        match self {
            EntityType::Solution => 0.9,
            EntityType::Error => 0.8,
            EntityType::File => 0.7,
            EntityType::Tool => 0.6,
            EntityType::Concept => 0.5,
            EntityType::Person => 0.5,
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    pub memory_id: String,
    pub entity_text: String,
    pub entity_type: EntityType,
    pub salience_score: f32,
}
