//! Storage layer: the persistence boundary for memories, concepts,
//! entities, relations, and the plasticity graph (§4.B, §4.D).

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{ActivationLogEntry, NewMemory, Result, Storage, StorageError};
