//! Embedding gateway (§4.A) — the engine's only point of contact with a
//! text-to-vector provider. Two implementations are provided: a
//! `fastembed`-backed local gateway (feature `embeddings`, the default),
//! and a deterministic hash-based fallback used in tests and whenever the
//! `embeddings` feature is disabled.

mod deterministic;
mod gateway;

#[cfg(feature = "embeddings")]
mod local;

pub use deterministic::DeterministicGateway;
pub use gateway::{cosine_similarity, EmbeddingGateway};

#[cfg(feature = "embeddings")]
pub use local::LocalGateway;

use crate::error::FailureKind;

/// Failures from an embedding provider are, by construction, non-local:
/// a remote call, a model load, or a malformed request (§7).
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding model initialization failed: {0}")]
    ModelInit(String),
    #[error("embedding generation failed: {0}")]
    EmbeddingFailed(String),
    #[error("invalid embedding input: {0}")]
    InvalidInput(String),
}

impl EmbeddingError {
    pub fn kind(&self) -> FailureKind {
        match self {
            EmbeddingError::ModelInit(_) | EmbeddingError::EmbeddingFailed(_) => {
                FailureKind::Transient
            }
            EmbeddingError::InvalidInput(_) => FailureKind::Validation,
        }
    }
}

/// Construct the default gateway for a given dimension: the local
/// fastembed model when the `embeddings` feature is enabled, otherwise
/// the deterministic fallback.
pub fn default_gateway(dimension: usize) -> Box<dyn EmbeddingGateway> {
    #[cfg(feature = "embeddings")]
    {
        Box::new(LocalGateway::new(dimension))
    }
    #[cfg(not(feature = "embeddings"))]
    {
        Box::new(DeterministicGateway::new(dimension))
    }
}
