//! Spreading activation discovers an indirect link through the graph,
//! bounded by the per-hop decay and activation threshold — and lowering
//! the threshold below the final hop's proposed value surfaces a node
//! that was otherwise unreachable within the same depth budget.

use synapse_core::config::SpreadingConfig;
use synapse_core::embeddings::EmbeddingGateway;
use synapse_core::memory::{MemoryType, NodeRef};
use synapse_core::storage::{NewMemory, Storage};
use synapse_core::{activation, ConnectionType};

/// Always returns the same fixed vector regardless of input text, so the
/// test controls similarity exactly instead of depending on a hash.
struct FixedGateway(Vec<f32>);

impl EmbeddingGateway for FixedGateway {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, synapse_core::EmbeddingError> {
        Ok(self.0.clone())
    }

    fn dimension(&self) -> usize {
        self.0.len()
    }

    fn model_name(&self) -> &str {
        "fixed-test-gateway"
    }
}

fn temp_storage() -> (Storage, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let storage = Storage::new(Some(dir.path().join("test.db"))).expect("storage");
    (storage, dir)
}

fn insert_memory(storage: &Storage, content: &str, embedding: Vec<f32>) -> String {
    storage
        .insert_memory(NewMemory {
            content: content.to_string(),
            summary: None,
            trigger_situation: "t".to_string(),
            resolution: None,
            memory_type: MemoryType::Semantic,
            source_agent: "agent".to_string(),
            keywords: vec![],
            salience_score: 0.5,
            context: Default::default(),
            embedding: Some(embedding),
        })
        .unwrap()
}

fn build_graph(storage: &Storage) -> (String, String, String, String) {
    // Query and concept X share the exact same embedding (cosine 1.0).
    // Memories A, B, C sit on orthogonal axes, so none of them is ever
    // seeded directly by similarity — they can only be reached by
    // traversing the graph from X.
    let query_vec = vec![1.0, 0.0, 0.0, 0.0];
    let concept = storage.get_or_create_concept("X", Some(&query_vec)).unwrap();

    let a = insert_memory(storage, "A", vec![0.0, 1.0, 0.0, 0.0]);
    let b = insert_memory(storage, "B", vec![0.0, 0.0, 1.0, 0.0]);
    let c = insert_memory(storage, "C", vec![0.0, 0.0, 0.0, 1.0]);

    let concept_ref = NodeRef::concept(concept.id.clone());
    let a_ref = NodeRef::memory(a.clone());
    let b_ref = NodeRef::memory(b.clone());
    let c_ref = NodeRef::memory(c.clone());

    for (source, target, strength) in [
        (&concept_ref, &a_ref, 0.9_f32),
        (&a_ref, &b_ref, 0.8_f32),
        (&b_ref, &c_ref, 0.2_f32),
    ] {
        storage.strengthen(source, target, 0.01, ConnectionType::Semantic).unwrap();
        storage.set_connection_strength(source, target, strength).unwrap();
    }

    (concept.id, a, b, c)
}

#[test]
fn moderate_threshold_stops_at_first_hop() {
    let (storage, _dir) = temp_storage();
    let (_concept_id, a, _b, _c) = build_graph(&storage);
    let gateway = FixedGateway(vec![1.0, 0.0, 0.0, 0.0]);

    let config = SpreadingConfig {
        threshold: 0.3,
        max_depth: 3,
        decay_per_hop: 0.5,
        limit: 10,
    };
    let result = activation::spread(&storage, &gateway, "query", &config, None, None).unwrap();

    assert_eq!(result.memories.len(), 1);
    assert_eq!(result.memories[0].record.id, a);
    assert!((result.memories[0].activation - 0.45).abs() < 1e-4);
}

#[test]
fn low_threshold_still_excludes_the_farthest_node_within_the_depth_budget() {
    let (storage, _dir) = temp_storage();
    let (_concept_id, _a, _b, c) = build_graph(&storage);
    let gateway = FixedGateway(vec![1.0, 0.0, 0.0, 0.0]);

    let config = SpreadingConfig {
        threshold: 0.1,
        max_depth: 3,
        decay_per_hop: 0.5,
        limit: 10,
    };
    let result = activation::spread(&storage, &gateway, "query", &config, None, None).unwrap();

    assert!(
        !result.memories.iter().any(|m| m.record.id == c),
        "C's proposed activation (0.018) is below theta=0.1, so it must not surface"
    );
}

#[test]
fn threshold_below_the_third_hop_proposal_surfaces_the_farthest_node() {
    let (storage, _dir) = temp_storage();
    let (_concept_id, _a, _b, c) = build_graph(&storage);
    let gateway = FixedGateway(vec![1.0, 0.0, 0.0, 0.0]);

    let config = SpreadingConfig {
        threshold: 0.01,
        max_depth: 3,
        decay_per_hop: 0.5,
        limit: 10,
    };
    let result = activation::spread(&storage, &gateway, "query", &config, None, None).unwrap();

    let hit = result.memories.iter().find(|m| m.record.id == c);
    assert!(hit.is_some(), "lowering theta below 0.018 should surface C");
    assert!((hit.unwrap().activation - 0.018).abs() < 1e-3);
}

