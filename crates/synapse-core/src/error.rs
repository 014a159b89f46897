//! Crate-level error taxonomy
//!
//! Every public operation returns either a domain result or a single
//! structured failure carrying a `FailureKind` and a human-readable
//! message, per the error handling design: transient dependency failures,
//! missing references, validation failures, and conflicts are distinct
//! kinds; conflicts on duplicate entity/relation inserts are swallowed by
//! the callers that can treat them as idempotent, never surfaced here.

use crate::embeddings::EmbeddingError;
use crate::storage::StorageError;

/// Coarse failure category, stable across module boundaries.
///
/// The outer host decides whether to serialize this as an RPC error or an
/// in-band status; the engine only commits to the kind and a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The embedding gateway or store timed out or returned a retryable
    /// status. No partial state was written downstream.
    Transient,
    /// A lookup by id found nothing.
    NotFound,
    /// Caller input failed validation before any write occurred.
    Validation,
    /// A duplicate insert collided with a uniqueness invariant.
    Conflict,
}

/// Unified engine error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Underlying embedding gateway failure.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Entry-point validation failure (empty agent name, non-positive
    /// window, out-of-range threshold, too-small sample for statistics).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Lookup by id returned nothing.
    #[error("not found: {0}")]
    NotFound(String),
}

impl EngineError {
    /// Classify this error into the §7 failure taxonomy.
    pub fn kind(&self) -> FailureKind {
        match self {
            EngineError::Storage(e) => e.kind(),
            EngineError::Embedding(_) => FailureKind::Transient,
            EngineError::Validation(_) => FailureKind::Validation,
            EngineError::NotFound(_) => FailureKind::NotFound,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;
