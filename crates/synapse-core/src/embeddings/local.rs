//! Local embedding inference via fastembed (ONNX) — no external API calls,
//! no network dependency at request time, model weights cached on disk.

use std::sync::{Mutex, OnceLock};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::{EmbeddingError, EmbeddingGateway};

/// Maximum text length for embedding; longer inputs are truncated rather
/// than rejected, matching the write pipeline's own compression ceiling.
pub const MAX_TEXT_LENGTH: usize = 8192;

/// Batch size for efficient embedding generation.
pub const BATCH_SIZE: usize = 32;

static MODEL: OnceLock<Result<Mutex<TextEmbedding>, String>> = OnceLock::new();

fn cache_dir() -> std::path::PathBuf {
    if let Ok(path) = std::env::var("FASTEMBED_CACHE_PATH") {
        return std::path::PathBuf::from(path);
    }
    if let Some(proj_dirs) = directories::ProjectDirs::from("dev", "synapse", "core") {
        return proj_dirs.cache_dir().join("fastembed");
    }
    std::path::PathBuf::from(".fastembed_cache")
}

fn get_model() -> Result<std::sync::MutexGuard<'static, TextEmbedding>, EmbeddingError> {
    let result = MODEL.get_or_init(|| {
        let dir = cache_dir();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!("failed to create fastembed cache dir {:?}: {}", dir, e);
        }

        TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::NomicEmbedTextV15).with_cache_dir(dir),
        )
        .map(Mutex::new)
        .map_err(|e| e.to_string())
    });

    match result {
        Ok(m) => m
            .lock()
            .map_err(|e| EmbeddingError::ModelInit(format!("lock poisoned: {e}"))),
        Err(err) => Err(EmbeddingError::ModelInit(err.clone())),
    }
}

/// Native output width of the underlying ONNX model, before the gateway
/// resizes to its configured `dimension`.
const NATIVE_DIMENSIONS: usize = 768;

fn resize(mut vector: Vec<f32>, dimension: usize) -> Vec<f32> {
    match vector.len().cmp(&dimension) {
        std::cmp::Ordering::Greater => {
            // Matryoshka truncation: the first N dims of a Matryoshka-trained
            // model already are the N-dim representation.
            vector.truncate(dimension);
            vector
        }
        std::cmp::Ordering::Less => {
            vector.resize(dimension, 0.0);
            vector
        }
        std::cmp::Ordering::Equal => vector,
    }
}

/// fastembed-backed gateway. `dimension` is the configured system-wide d
/// (§3, §4.A); the native 768-dim model output is truncated or zero-padded
/// to match it.
pub struct LocalGateway {
    dimension: usize,
}

impl LocalGateway {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Force model initialization (downloads weights on first use).
    pub fn warm_up(&self) -> Result<(), EmbeddingError> {
        get_model().map(|_| ())
    }
}

impl Default for LocalGateway {
    fn default() -> Self {
        Self::new(NATIVE_DIMENSIONS)
    }
}

impl EmbeddingGateway for LocalGateway {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.is_empty() {
            return Err(EmbeddingError::InvalidInput("text cannot be empty".into()));
        }

        let mut model = get_model()?;
        let truncated = if text.len() > MAX_TEXT_LENGTH {
            &text[..MAX_TEXT_LENGTH]
        } else {
            text
        };

        let embeddings = model
            .embed(vec![truncated], None)
            .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

        let vector = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::EmbeddingFailed("no embedding generated".into()))?;

        Ok(resize(vector, self.dimension))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut model = get_model()?;
        let mut out = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let truncated: Vec<&str> = chunk
                .iter()
                .map(|t| if t.len() > MAX_TEXT_LENGTH { &t[..MAX_TEXT_LENGTH] } else { *t })
                .collect();

            let embeddings = model
                .embed(truncated, None)
                .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

            out.extend(embeddings.into_iter().map(|v| resize(v, self.dimension)));
        }

        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "nomic-ai/nomic-embed-text-v1.5"
    }
}
