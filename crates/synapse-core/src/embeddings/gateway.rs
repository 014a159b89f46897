//! The embedding gateway contract (§4.A).
//!
//! Sole operation: `embed(text) -> vector of length d`. The rest of the
//! system treats embeddings as opaque real vectors; d is fixed per
//! gateway instance and surfaced via `dimension()`.

use super::EmbeddingError;

pub trait EmbeddingGateway: Send + Sync {
    /// Embed a single piece of text. A thin remote/local call whose
    /// failure is non-local (§7) — callers decide retry policy.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed a batch, in order. Default impl is sequential; local
    /// backends override this to batch internally.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Vector length this gateway produces (§3 "embedding: dense real
    /// vector of fixed dimension d").
    fn dimension(&self) -> usize;

    /// Human-readable identifier, stored alongside persisted vectors so a
    /// later dimension/model change is detectable (§7 degrade paths).
    fn model_name(&self) -> &str;
}

/// Cosine similarity between two vectors of equal length. Returns 0.0 on
/// dimension mismatch or a zero-magnitude vector rather than erroring —
/// callers treat 0.0 as "no similarity", which is always a safe default
/// for a threshold comparison (§4.B).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
