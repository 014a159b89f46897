//! Spreading activator (§4.E) — the hard algorithmic core: a concept-
//! and memory-seeded, max-plus Bellman relaxation over the plasticity
//! graph, with Hebbian write-back and an append-only activation log.

pub mod relax;

use std::collections::HashMap;

use crate::config::SpreadingConfig;
use crate::embeddings::EmbeddingGateway;
use crate::error::Result;
use crate::graph::ConnectionType;
use crate::memory::{MemoryRecord, MemoryType, NodeKind, NodeRef};
use crate::storage::Storage;

/// Number of top concepts/memories seeded by similarity (§4.E step 2).
const SEED_COUNT: usize = 5;

/// Hebbian write-back amounts (§4.E step 6).
const CONCEPT_TO_MEMORY_BOOST: f32 = 0.05;
const MEMORY_PAIR_BOOST: f32 = 0.03;

#[derive(Debug, Clone)]
pub struct ActivatedMemory {
    pub record: MemoryRecord,
    pub activation: f32,
}

/// Aggregate view of the activation substrate (§6 `get_activation_stats`).
#[derive(Debug, Clone, Default)]
pub struct ActivationStats {
    pub total_logged_retrievals: i64,
    pub active_memory_count: i64,
    pub active_concept_count: i64,
    pub mean_memory_activation: f32,
    pub mean_concept_activation: f32,
}

/// Compute `get_activation_stats()` (§6) from current store state.
pub fn activation_stats(storage: &Storage) -> Result<ActivationStats> {
    let memories = storage.all_memories()?;
    let concepts = storage.all_concepts()?;

    let active_memories: Vec<f32> = memories
        .iter()
        .map(|m| m.current_activation)
        .filter(|a| *a > 0.0)
        .collect();
    let active_concepts: Vec<f32> = concepts
        .iter()
        .map(|c| c.current_activation)
        .filter(|a| *a > 0.0)
        .collect();

    let mean = |values: &[f32]| {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f32>() / values.len() as f32
        }
    };

    Ok(ActivationStats {
        total_logged_retrievals: storage.activation_log_count()?,
        active_memory_count: active_memories.len() as i64,
        active_concept_count: active_concepts.len() as i64,
        mean_memory_activation: mean(&active_memories),
        mean_concept_activation: mean(&active_concepts),
    })
}

#[derive(Debug, Clone, Default)]
pub struct SpreadResult {
    pub memories: Vec<ActivatedMemory>,
    pub activation_log_id: Option<String>,
}

/// Run the spreading-activation retrieval described in §4.E, steps 1-6.
#[allow(clippy::too_many_arguments)]
pub fn spread(
    storage: &Storage,
    gateway: &dyn EmbeddingGateway,
    query_text: &str,
    config: &SpreadingConfig,
    memory_type_filter: Option<MemoryType>,
    agent: Option<&str>,
) -> Result<SpreadResult> {
    // Step 1: embed the query.
    let query_vec = gateway.embed(query_text)?;

    // Step 2: seed set = top-5 concepts and top-5 memories above theta.
    let seed_memories = storage.similar_memories(&query_vec, config.threshold, SEED_COUNT, memory_type_filter)?;
    let seed_concepts = storage.similar_concepts(&query_vec, config.threshold, SEED_COUNT)?;

    if seed_memories.is_empty() && seed_concepts.is_empty() {
        // Edge case: empty seeding returns an empty result; this is not a
        // degrade path to keyword search, which is a separate entry point.
        return Ok(SpreadResult::default());
    }

    let mut active: HashMap<NodeRef, f32> = HashMap::new();
    for (id, sim) in &seed_memories {
        let node = NodeRef::memory(id.clone());
        storage.set_activation(id, NodeKind::Memory, *sim)?;
        active.insert(node, *sim);
    }
    for (id, sim) in &seed_concepts {
        let node = NodeRef::concept(id.clone());
        storage.set_activation(id, NodeKind::Concept, *sim)?;
        active.insert(node, *sim);
    }

    // Step 3-4: relax the frontier for max_depth hops, merging by max and
    // persisting changed activations.
    for _ in 0..config.max_depth {
        let mut frontier: HashMap<NodeRef, f32> = HashMap::new();

        for (node, activation) in active.iter() {
            if *activation < config.threshold {
                continue;
            }
            let edges = storage.get_outgoing(node)?;
            let edge_pairs: Vec<(NodeRef, f32)> =
                edges.into_iter().map(|e| (e.target, e.strength)).collect();
            let proposals =
                relax::propose_from_node(*activation, &edge_pairs, config.decay_per_hop, config.threshold);
            relax::merge_max(&mut frontier, proposals);
        }

        if frontier.is_empty() {
            break;
        }

        for (node, value) in frontier {
            let changed = active
                .get(&node)
                .map(|existing| value > *existing)
                .unwrap_or(true);
            if changed {
                storage.set_activation(&node.id, node.kind, value)?;
                active.insert(node, value);
            }
        }
    }

    // Step 5: filter to memories, rank, slice to k, fetch bodies.
    let mut memory_hits: Vec<(String, f32)> = active
        .iter()
        .filter(|(node, activation)| node.kind == NodeKind::Memory && **activation >= config.threshold)
        .map(|(node, activation)| (node.id.clone(), *activation))
        .collect();

    let fetched = storage.fetch_many(&memory_hits.iter().map(|(id, _)| id.clone()).collect::<Vec<_>>())?;
    let by_id: HashMap<String, MemoryRecord> = fetched.into_iter().map(|r| (r.id.clone(), r)).collect();

    memory_hits.sort_by(|(id_a, act_a), (id_b, act_b)| {
        act_b
            .partial_cmp(act_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                let sa = by_id.get(id_a).map(|r| r.salience_score).unwrap_or(0.0);
                let sb = by_id.get(id_b).map(|r| r.salience_score).unwrap_or(0.0);
                sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| {
                let ca = by_id.get(id_a).map(|r| r.created_at);
                let cb = by_id.get(id_b).map(|r| r.created_at);
                cb.cmp(&ca)
            })
    });
    memory_hits.truncate(config.limit);

    let memories: Vec<ActivatedMemory> = memory_hits
        .iter()
        .filter_map(|(id, activation)| {
            by_id.get(id).map(|record| ActivatedMemory {
                record: record.clone(),
                activation: *activation,
            })
        })
        .collect();

    // Step 6: Hebbian write-back and activation log.
    let selected_memory_nodes: Vec<NodeRef> = memories.iter().map(|m| NodeRef::memory(m.record.id.clone())).collect();
    let seed_concept_nodes: Vec<NodeRef> = seed_concepts.iter().map(|(id, _)| NodeRef::concept(id.clone())).collect();

    for concept in &seed_concept_nodes {
        for memory in &selected_memory_nodes {
            storage.strengthen(concept, memory, CONCEPT_TO_MEMORY_BOOST, ConnectionType::Semantic)?;
        }
    }
    storage.connect_co_activated(&selected_memory_nodes, MEMORY_PAIR_BOOST)?;

    let activated_memory_ids: Vec<String> = memories.iter().map(|m| m.record.id.clone()).collect();
    let activated_concept_ids: Vec<String> = seed_concepts.iter().map(|(id, _)| id.clone()).collect();
    let log_id = storage.log_activation(
        query_text,
        Some(&query_vec),
        &activated_memory_ids,
        &activated_concept_ids,
        agent,
    )?;

    Ok(SpreadResult {
        memories,
        activation_log_id: Some(log_id),
    })
}
