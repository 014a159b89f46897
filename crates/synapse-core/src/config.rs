//! Engine configuration
//!
//! Recognized keys and effects, per the system's configuration surface:
//! database location, embedding dimension, spreading-activation defaults,
//! dream defaults, decay defaults, and write-pipeline defaults. Values can
//! be overridden with environment variables the same way the storage layer
//! reads its encryption key from the environment rather than a config file.

use std::env;
use std::path::PathBuf;

/// Canonical embedding dimension when no gateway overrides it.
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// Spreading-activation defaults (§4.E, §6).
#[derive(Debug, Clone, Copy)]
pub struct SpreadingConfig {
    pub threshold: f32,
    pub max_depth: u32,
    pub decay_per_hop: f32,
    pub limit: usize,
}

impl Default for SpreadingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            max_depth: 3,
            decay_per_hop: 0.5,
            limit: 10,
        }
    }
}

/// Dream (consolidation) defaults (§4.F).
#[derive(Debug, Clone, Copy)]
pub struct DreamConfig {
    pub semantic_threshold: f32,
    pub temporal_window_hours: i64,
    pub prune_min_strength: f32,
    pub prune_days_unused: i64,
    /// Per-phase cap on candidate pairs considered, to bound work.
    pub max_pairs_per_phase: usize,
}

impl Default for DreamConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: 0.85,
            temporal_window_hours: 4,
            prune_min_strength: 0.05,
            prune_days_unused: 30,
            max_pairs_per_phase: 5_000,
        }
    }
}

/// Power-law decay defaults (§4.F).
#[derive(Debug, Clone, Copy)]
pub struct DecayConfig {
    pub exponent: f64,
    pub min_hours: f64,
    pub zero_threshold: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            exponent: 0.5,
            min_hours: 1.0,
            zero_threshold: 0.001,
        }
    }
}

/// Write-pipeline defaults (§4.G).
#[derive(Debug, Clone, Copy)]
pub struct WriteConfig {
    pub max_content_length: usize,
    pub surprise_threshold: f32,
    pub corrected_weight: f32,
    pub surprising_weight: f32,
    pub error_recovered_weight: f32,
    pub effort_high_weight: f32,
    pub effort_medium_weight: f32,
    pub base_salience: f32,
    pub surprise_boost_factor: f32,
    pub min_keyword_len: usize,
    pub max_keywords: usize,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            max_content_length: 500,
            surprise_threshold: 0.7,
            corrected_weight: 0.35,
            surprising_weight: 0.25,
            error_recovered_weight: 0.3,
            effort_high_weight: 0.25,
            effort_medium_weight: 0.15,
            base_salience: 0.3,
            surprise_boost_factor: 0.3,
            min_keyword_len: 4,
            max_keywords: 10,
        }
    }
}

/// Connection pool behavior (§5). The engine's own store is a pair of
/// bounded `Mutex`-guarded connections (see `storage::Storage`), so these
/// knobs only size that pair rather than configuring an external pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub pool_size: usize,
    pub idle_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            idle_timeout_secs: 30,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the SQLite database file. `None` resolves to the
    /// platform-specific application data directory.
    pub database_url: Option<PathBuf>,
    pub embedding_dim: usize,
    pub spreading: SpreadingConfig,
    pub dream: DreamConfig,
    pub decay: DecayConfig,
    pub write: WriteConfig,
    pub pool: PoolConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            spreading: SpreadingConfig::default(),
            dream: DreamConfig::default(),
            decay: DecayConfig::default(),
            write: WriteConfig::default(),
            pool: PoolConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Build a configuration from defaults overlaid with `SYNAPSE_*`
    /// environment variables, following the same env-driven override
    /// pattern used for the storage layer's encryption key.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("SYNAPSE_DATABASE_URL") {
            if !path.is_empty() {
                config.database_url = Some(PathBuf::from(path));
            }
        }

        if let Ok(dim) = env::var("SYNAPSE_EMBEDDING_DIM") {
            if let Ok(dim) = dim.parse() {
                config.embedding_dim = dim;
            }
        }

        config
    }
}
