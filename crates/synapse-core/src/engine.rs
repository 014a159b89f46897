//! The engine facade — the command surface consumed by the outer host
//! (§6). Composes the storage, embedding, activation, consolidation, and
//! write-pipeline modules into the operations the spec names; nothing
//! outside this file talks to those modules on the host's behalf.

use std::path::PathBuf;

use crate::activation::{self, ActivatedMemory, ActivationStats, SpreadResult};
use crate::config::{EngineConfig, SpreadingConfig};
use crate::consolidation::{self, DecayStats, DreamResult};
use crate::embeddings::{self, EmbeddingGateway};
use crate::error::{EngineError, Result};
use crate::graph::{Connection, ConnectionStats, ConnectionType};
use crate::memory::{MemoryRecord, MemoryStats, MemoryType, NodeKind, NodeRef};
use crate::storage::Storage;
use crate::write_pipeline::{self, AutoSaveOutcome, SalienceSignals, WriteOutcome};

/// Overrides for a single `recall` call; any field left at its default
/// falls back to the engine's configured `SpreadingConfig`.
#[derive(Debug, Clone)]
pub struct RecallOptions {
    pub threshold: Option<f32>,
    pub max_depth: Option<u32>,
    pub decay_per_hop: Option<f32>,
    pub limit: Option<usize>,
    pub memory_type: Option<MemoryType>,
    pub agent: Option<String>,
    /// Blend weight applied to recency in the final ranking, on top of
    /// raw activation. `0.0` leaves the spreading-activation order
    /// untouched (§6, §9 Open Question: feedback-blended ranking stays
    /// outside the core spreading algorithm).
    pub recency_weight: f32,
    pub salience_weight: f32,
    pub min_salience: f32,
    /// `false` collapses retrieval to a single similarity-plus-scoring
    /// pass without graph traversal (§6). Defaults to `true`: recall
    /// spreads through the association graph unless a caller opts out.
    pub use_spreading_activation: bool,
}

impl Default for RecallOptions {
    fn default() -> Self {
        Self {
            threshold: None,
            max_depth: None,
            decay_per_hop: None,
            limit: None,
            memory_type: None,
            agent: None,
            recency_weight: 0.0,
            salience_weight: 0.0,
            min_salience: 0.0,
            use_spreading_activation: true,
        }
    }
}

impl RecallOptions {
    fn spreading_config(&self, defaults: &SpreadingConfig) -> SpreadingConfig {
        SpreadingConfig {
            threshold: self.threshold.unwrap_or(defaults.threshold),
            max_depth: if self.use_spreading_activation {
                self.max_depth.unwrap_or(defaults.max_depth)
            } else {
                0
            },
            decay_per_hop: self.decay_per_hop.unwrap_or(defaults.decay_per_hop),
            limit: self.limit.unwrap_or(defaults.limit),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecallHit {
    pub memory: MemoryRecord,
    pub activation: f32,
    pub score: f32,
}

#[derive(Debug, Clone, Default)]
pub struct DreamOverrides {
    pub semantic_threshold: Option<f32>,
    pub temporal_window_hours: Option<i64>,
    pub prune_min_strength: Option<f32>,
    pub prune_days_unused: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct DecayOverrides {
    pub exponent: Option<f64>,
    pub min_hours: Option<f64>,
    pub zero_threshold: Option<f64>,
}

/// The associative memory engine: one `Storage` and one embedding
/// gateway, shared across every operation in the command surface.
pub struct Engine {
    storage: Storage,
    gateway: Box<dyn EmbeddingGateway>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let storage = Storage::new(config.database_url.clone())?;
        let gateway = embeddings::default_gateway(config.embedding_dim);
        Ok(Self {
            storage,
            gateway,
            config,
        })
    }

    pub fn with_gateway(config: EngineConfig, gateway: Box<dyn EmbeddingGateway>) -> Result<Self> {
        let storage = Storage::new(config.database_url.clone())?;
        Ok(Self {
            storage,
            gateway,
            config,
        })
    }

    pub fn open(db_path: Option<PathBuf>) -> Result<Self> {
        let mut config = EngineConfig::from_env();
        config.database_url = db_path.or(config.database_url);
        Self::new(config)
    }

    /// `recall` (§6): core retrieval. `options.use_spreading_activation =
    /// false` collapses to depth-0 similarity-plus-scoring.
    pub fn recall(&self, query: &str, options: RecallOptions) -> Result<Vec<RecallHit>> {
        if let Some(threshold) = options.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(EngineError::Validation(format!(
                    "recall threshold must be in [0.0, 1.0], got {threshold}"
                )));
            }
        }

        let spreading = options.spreading_config(&self.config.spreading);

        let SpreadResult { memories, .. } = activation::spread(
            &self.storage,
            self.gateway.as_ref(),
            query,
            &spreading,
            options.memory_type,
            options.agent.as_deref(),
        )?;

        let mut hits: Vec<RecallHit> = memories
            .into_iter()
            .filter(|m: &ActivatedMemory| m.record.salience_score >= options.min_salience)
            .map(|m| {
                let recency = recency_score(&m.record);
                let score = m.activation
                    + options.recency_weight * recency
                    + options.salience_weight * m.record.salience_score;
                RecallHit {
                    memory: m.record,
                    activation: m.activation,
                    score,
                }
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        for hit in &hits {
            self.storage.increment_retrieval(&hit.memory.id)?;
        }

        Ok(hits)
    }

    /// `store` (§6, §4.G).
    pub fn store(
        &self,
        content: String,
        trigger: String,
        resolution: Option<String>,
        memory_type: MemoryType,
        salience_signals: Option<SalienceSignals>,
        source_agent: String,
    ) -> Result<WriteOutcome> {
        if source_agent.trim().is_empty() {
            return Err(EngineError::Validation("source_agent must not be empty".to_string()));
        }

        let request = write_pipeline::WriteRequest {
            content,
            trigger_situation: trigger,
            resolution,
            memory_type,
            salience_signals: salience_signals.unwrap_or_default(),
            source_agent,
        };

        write_pipeline::write(&self.storage, self.gateway.as_ref(), request, &self.config.write)
    }

    /// `search_by_keywords` (§6) — keyword fallback, independent of
    /// spreading activation.
    pub fn search_by_keywords(&self, keywords: &[String], limit: usize) -> Result<Vec<MemoryRecord>> {
        self.storage.keyword_search(keywords, limit).map_err(Into::into)
    }

    /// `strengthen_pathway` (§6).
    pub fn strengthen_pathway(
        &self,
        source_id: &str,
        source_kind: NodeKind,
        target_id: &str,
        target_kind: NodeKind,
        amount: Option<f32>,
        connection_type: Option<ConnectionType>,
    ) -> Result<f32> {
        let source = NodeRef {
            id: source_id.to_string(),
            kind: source_kind,
        };
        let target = NodeRef {
            id: target_id.to_string(),
            kind: target_kind,
        };

        self.storage
            .strengthen(
                &source,
                &target,
                amount.unwrap_or(0.1),
                connection_type.unwrap_or(ConnectionType::Semantic),
            )
            .map_err(Into::into)
    }

    /// `trigger_dream` (§6, §4.F).
    pub fn trigger_dream(&self, overrides: DreamOverrides) -> Result<DreamResult> {
        if let Some(v) = overrides.temporal_window_hours {
            if v <= 0 {
                return Err(EngineError::Validation(format!(
                    "temporal_window_hours must be positive, got {v}"
                )));
            }
        }
        if let Some(v) = overrides.semantic_threshold {
            if !(0.0..=1.0).contains(&v) {
                return Err(EngineError::Validation(format!(
                    "semantic_threshold must be in [0.0, 1.0], got {v}"
                )));
            }
        }
        if let Some(v) = overrides.prune_min_strength {
            if !(0.0..=1.0).contains(&v) {
                return Err(EngineError::Validation(format!(
                    "prune_min_strength must be in [0.0, 1.0], got {v}"
                )));
            }
        }
        if let Some(v) = overrides.prune_days_unused {
            if v <= 0 {
                return Err(EngineError::Validation(format!(
                    "prune_days_unused must be positive, got {v}"
                )));
            }
        }

        let mut config = self.config.dream;
        if let Some(v) = overrides.semantic_threshold {
            config.semantic_threshold = v;
        }
        if let Some(v) = overrides.temporal_window_hours {
            config.temporal_window_hours = v;
        }
        if let Some(v) = overrides.prune_min_strength {
            config.prune_min_strength = v;
        }
        if let Some(v) = overrides.prune_days_unused {
            config.prune_days_unused = v;
        }

        consolidation::run_dream(&self.storage, &config).map_err(Into::into)
    }

    /// `run_decay` (§6, §4.F).
    pub fn run_decay(&self, overrides: DecayOverrides) -> Result<DecayStats> {
        if let Some(v) = overrides.exponent {
            if v < 0.0 {
                return Err(EngineError::Validation(format!("decay exponent must be non-negative, got {v}")));
            }
        }
        if let Some(v) = overrides.min_hours {
            if v <= 0.0 {
                return Err(EngineError::Validation(format!("min_hours must be positive, got {v}")));
            }
        }
        if let Some(v) = overrides.zero_threshold {
            if v < 0.0 {
                return Err(EngineError::Validation(format!(
                    "zero_threshold must be non-negative, got {v}"
                )));
            }
        }

        let mut config = self.config.decay;
        if let Some(v) = overrides.exponent {
            config.exponent = v;
        }
        if let Some(v) = overrides.min_hours {
            config.min_hours = v;
        }
        if let Some(v) = overrides.zero_threshold {
            config.zero_threshold = v;
        }

        consolidation::run_decay(&self.storage, &config).map_err(Into::into)
    }

    pub fn get_activation_stats(&self) -> Result<ActivationStats> {
        activation::activation_stats(&self.storage).map_err(Into::into)
    }

    pub fn get_connection_stats(&self) -> Result<ConnectionStats> {
        self.storage.connection_stats().map_err(Into::into)
    }

    pub fn get_memory_stats(&self) -> Result<MemoryStats> {
        self.storage.memory_stats().map_err(Into::into)
    }

    pub fn get_edge(&self, source: &NodeRef, target: &NodeRef) -> Result<Option<Connection>> {
        self.storage.get_edge(source, target).map_err(Into::into)
    }

    /// Surprise auto-save (§4.G, scenario S4): score a context/response
    /// exchange for surprise cues and, when `auto_save` is set and the
    /// score clears the write pipeline's `surprise_threshold`, store it
    /// stamped `storage_method = "auto"`. With `auto_save = false`, or a
    /// score below threshold, nothing is written and only the score is
    /// reported.
    pub fn detect_surprise(
        &self,
        context: &str,
        response: &str,
        source_agent: String,
        auto_save: bool,
    ) -> Result<AutoSaveOutcome> {
        write_pipeline::auto_save_on_surprise(
            &self.storage,
            self.gateway.as_ref(),
            context,
            response,
            source_agent,
            auto_save,
            &self.config.write,
        )
    }
}

fn recency_score(record: &MemoryRecord) -> f32 {
    let hours_old = (chrono::Utc::now() - record.created_at).num_milliseconds() as f32 / 3_600_000.0;
    1.0 / (1.0 + hours_old.max(0.0))
}
