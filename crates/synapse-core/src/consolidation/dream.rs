//! Dream (consolidation) pass — four ordered phases run nightly (§4.F
//! "Dream (consolidation)"). Each phase is logged with counters.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DreamConfig;
use crate::embeddings::cosine_similarity;
use crate::error::Result;
use crate::graph::{ConnectionType, STRENGTH_FLOOR};
use crate::memory::NodeRef;
use crate::storage::Storage;

/// How far back co-activation reinforcement scans the activation log.
/// Not named in the command surface's dream config, so picked as a
/// generous default rather than unbounded: a week of retrieval history
/// is enough signal without re-scanning the log's entire lifetime.
const CO_ACTIVATION_LOOKBACK_DAYS: i64 = 7;

const EPISODIC_BINDING_ALPHA: f32 = 0.1;
const CO_ACTIVATION_ALPHA: f32 = 0.05;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamResult {
    pub dream_log_id: String,
    pub semantic_links_created: i64,
    pub episodic_bindings_created: i64,
    pub co_activation_reinforced: i64,
    pub pruned_count: i64,
}

fn link_both_directions(storage: &Storage, a: &NodeRef, b: &NodeRef, alpha: f32, kind: ConnectionType) -> Result<()> {
    storage.strengthen(a, b, alpha, kind)?;
    storage.strengthen(b, a, alpha, kind)?;
    Ok(())
}

/// Phase 1: semantic linking. Every pair of memories with cosine
/// similarity >= `semantic_threshold` and no existing (or negligible)
/// edge gets a semantic edge strengthened proportionally to the
/// similarity above threshold.
fn semantic_linking(storage: &Storage, config: &DreamConfig) -> Result<i64> {
    let embedded = storage.embedded_memories()?;
    let mut created = 0i64;
    let mut pairs_considered = 0usize;

    'outer: for i in 0..embedded.len() {
        for j in (i + 1)..embedded.len() {
            if pairs_considered >= config.max_pairs_per_phase {
                break 'outer;
            }
            pairs_considered += 1;

            let (record_a, vec_a) = &embedded[i];
            let (record_b, vec_b) = &embedded[j];
            let similarity = cosine_similarity(vec_a, vec_b);
            if similarity < config.semantic_threshold {
                continue;
            }

            let a = NodeRef::memory(record_a.id.clone());
            let b = NodeRef::memory(record_b.id.clone());

            let existing_strength = storage.get_edge(&a, &b)?.map(|e| e.strength).unwrap_or(0.0);
            if existing_strength >= STRENGTH_FLOOR {
                continue;
            }

            let alpha = (similarity - config.semantic_threshold).clamp(0.0, 1.0);
            link_both_directions(storage, &a, &b, alpha, ConnectionType::Semantic)?;
            created += 1;
        }
    }

    Ok(created)
}

/// Phase 2: episodic binding. Memories created within
/// `temporal_window_hours` of each other get a strengthened temporal
/// edge — "what fires together within the sleep replay window binds".
fn episodic_binding(storage: &Storage, config: &DreamConfig) -> Result<i64> {
    let mut memories = storage.all_memories()?;
    memories.sort_by_key(|m| m.created_at);

    let window = Duration::hours(config.temporal_window_hours);
    let mut created = 0i64;
    let mut pairs_considered = 0usize;

    'outer: for i in 0..memories.len() {
        for j in (i + 1)..memories.len() {
            if pairs_considered >= config.max_pairs_per_phase {
                break 'outer;
            }
            pairs_considered += 1;

            let gap = memories[j].created_at - memories[i].created_at;
            if gap > window {
                // memories is sorted by created_at, so every later j is
                // even further away — stop scanning from this i.
                break;
            }

            let a = NodeRef::memory(memories[i].id.clone());
            let b = NodeRef::memory(memories[j].id.clone());
            link_both_directions(storage, &a, &b, EPISODIC_BINDING_ALPHA, ConnectionType::Temporal)?;
            created += 1;
        }
    }

    Ok(created)
}

/// Phase 3: co-activation reinforcement. Every pair of memories that
/// appeared together in a retrieval event gets a strengthened semantic
/// edge, with `last_used_at` refreshed by the strengthen call itself.
fn co_activation_reinforcement(storage: &Storage, config: &DreamConfig) -> Result<i64> {
    let since = Utc::now() - Duration::days(CO_ACTIVATION_LOOKBACK_DAYS);
    let logs = storage.activation_logs_since(since)?;

    let mut reinforced = 0i64;
    let mut pairs_considered = 0usize;

    'outer: for entry in &logs {
        let ids = &entry.activated_memory_ids;
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                if pairs_considered >= config.max_pairs_per_phase {
                    break 'outer;
                }
                pairs_considered += 1;

                let a = NodeRef::memory(ids[i].clone());
                let b = NodeRef::memory(ids[j].clone());
                link_both_directions(storage, &a, &b, CO_ACTIVATION_ALPHA, ConnectionType::Semantic)?;
                reinforced += 1;
            }
        }
    }

    Ok(reinforced)
}

/// Phase 4: pruning. Edges below `prune_min_strength` and unused for
/// `prune_days_unused` are removed; strong edges (>= 0.7) are never
/// pruned regardless of disuse.
fn pruning(storage: &Storage, config: &DreamConfig) -> Result<i64> {
    const STRONG_EDGE_FLOOR: f32 = 0.7;
    let now = Utc::now();
    let stale_before = now - Duration::days(config.prune_days_unused);

    let mut pruned = 0i64;
    for edge in storage.all_connections()? {
        if edge.strength >= STRONG_EDGE_FLOOR {
            continue;
        }
        if edge.strength >= config.prune_min_strength {
            continue;
        }
        if edge.last_used_at >= stale_before {
            continue;
        }

        storage.delete_connection(&edge.source, &edge.target)?;
        pruned += 1;
    }

    Ok(pruned)
}

/// Run the four dream phases in order and log the result (§4.F).
pub fn run_dream(storage: &Storage, config: &DreamConfig) -> Result<DreamResult> {
    let started_at = Utc::now();
    tracing::info!("dream cycle starting");

    let semantic_links_created = semantic_linking(storage, config)?;
    tracing::debug!(semantic_links_created, "semantic linking phase complete");

    let episodic_bindings_created = episodic_binding(storage, config)?;
    tracing::debug!(episodic_bindings_created, "episodic binding phase complete");

    let co_activation_reinforced = co_activation_reinforcement(storage, config)?;
    tracing::debug!(co_activation_reinforced, "co-activation reinforcement phase complete");

    let pruned_count = pruning(storage, config)?;
    tracing::debug!(pruned_count, "pruning phase complete");

    let finished_at = Utc::now();
    let dream_log_id = storage.log_dream(
        started_at,
        finished_at,
        semantic_links_created,
        episodic_bindings_created,
        co_activation_reinforced,
        pruned_count,
    )?;

    tracing::info!(dream_log_id, "dream cycle complete");

    Ok(DreamResult {
        dream_log_id,
        semantic_links_created,
        episodic_bindings_created,
        co_activation_reinforced,
        pruned_count,
    })
}
