//! # Synapse Core
//!
//! Associative memory engine for cooperating AI agents:
//!
//! - **Spreading activation**: Collins & Loftus style max-plus relaxation
//!   over a typed, weighted plasticity graph.
//! - **Hebbian plasticity**: connections strengthen on co-activation and
//!   decay with disuse, saturating rather than growing unbounded.
//! - **Sleep-inspired consolidation**: a "dream" pass links semantically
//!   similar memories, binds temporally adjacent ones, reinforces
//!   co-activated pairs, and prunes weak unused edges.
//! - **Bi-temporal relations**: subject/predicate/object facts with
//!   validity windows, superseded rather than overwritten.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use synapse_core::{Engine, EngineConfig, MemoryType, RecallOptions};
//!
//! let engine = Engine::new(EngineConfig::default())?;
//! let outcome = engine.store(
//!     "fixed the flaky upload test by awaiting the retry".into(),
//!     "CI kept failing on upload_spec.rs".into(),
//!     None,
//!     MemoryType::Episodic,
//!     None,
//!     "agent-1".into(),
//! )?;
//! let hits = engine.recall("flaky upload test", RecallOptions::default())?;
//! ```
//!
//! ## Feature flags
//!
//! - `bundled-sqlite` (default): vendor and statically link SQLite.
//! - `encryption`: swap in SQLCipher, mutually exclusive with
//!   `bundled-sqlite`.
//! - `embeddings` (default): local ONNX inference via `fastembed`. Without
//!   it the engine falls back to a deterministic hash-based gateway that
//!   still satisfies every retrieval and plasticity contract.

#![warn(rustdoc::missing_crate_level_docs)]

pub mod activation;
pub mod config;
pub mod consolidation;
pub mod embeddings;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod graph;
pub mod memory;
pub mod storage;
pub mod write_pipeline;

pub use activation::{ActivatedMemory, ActivationStats, SpreadResult};
pub use config::{DecayConfig, DreamConfig, EngineConfig, PoolConfig, SpreadingConfig, WriteConfig};
pub use consolidation::{DecayStats, DreamResult};
pub use embeddings::{cosine_similarity, DeterministicGateway, EmbeddingError, EmbeddingGateway};
pub use engine::{DecayOverrides, DreamOverrides, Engine, RecallHit, RecallOptions};
pub use error::{EngineError, FailureKind, Result};
pub use extraction::{extract, ExtractedEntity, ExtractedRelation};
pub use graph::{Connection, ConnectionStats, ConnectionType};
pub use memory::{
    Concept, Entity, EntityType, MemoryContext, MemoryRecord, MemoryStats, MemoryType, NodeKind,
    NodeRef, Relation, RelationStatus,
};
pub use storage::{NewMemory, Storage, StorageError};
pub use write_pipeline::{
    AutoSaveOutcome, EffortLevel, SalienceSignals, SurpriseDetection, WriteOutcome, WriteRequest,
};

#[cfg(feature = "embeddings")]
pub use embeddings::LocalGateway;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::{
        Engine, EngineConfig, EngineError, MemoryRecord, MemoryType, RecallHit, RecallOptions,
        Result, SalienceSignals, Storage, WriteOutcome,
    };
}
