//! Deterministic entity and relation extraction (§4.C).

mod entities;

pub use entities::{extract, first_solution_fragment, ExtractedEntity, ExtractedRelation, MAX_ENTITIES};
