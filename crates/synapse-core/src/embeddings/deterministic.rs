//! Deterministic hash-based gateway — an offline fallback satisfying
//! every retrieval/plasticity contract without a model download. Used by
//! default in tests and wherever the `embeddings` feature is disabled.

use std::hash::{Hash, Hasher};

use super::{EmbeddingError, EmbeddingGateway};

/// Embeds text by hashing overlapping token shingles into a fixed-length
/// vector and L2-normalizing. Not semantically meaningful, but stable:
/// identical text always yields identical vectors, and the normalized
/// cosine similarity between two texts correlates weakly with shared
/// tokens, which is enough to exercise threshold/ranking logic in tests.
pub struct DeterministicGateway {
    dimension: usize,
}

impl DeterministicGateway {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for DeterministicGateway {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EMBEDDING_DIM)
    }
}

impl EmbeddingGateway for DeterministicGateway {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.is_empty() {
            return Err(EmbeddingError::InvalidInput("text cannot be empty".into()));
        }

        let mut vector = vec![0.0f32; self.dimension];
        for token in text.to_lowercase().split_whitespace() {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dimension;
            let sign = if (h >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "deterministic-hash-v1"
    }
}
