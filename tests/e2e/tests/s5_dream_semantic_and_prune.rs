//! Dream creates a semantic edge between highly similar memories and
//! prunes a weak, long-unused edge in the same pass.

use chrono::{Duration, Utc};
use synapse_core::config::DreamConfig;
use synapse_core::memory::{MemoryType, NodeRef};
use synapse_core::storage::{NewMemory, Storage};
use synapse_core::{consolidation, ConnectionType};

fn temp_storage() -> (Storage, tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("test.db");
    let storage = Storage::new(Some(path.clone())).expect("storage");
    (storage, dir, path)
}

fn insert_memory(storage: &Storage, content: &str, embedding: Vec<f32>) -> String {
    storage
        .insert_memory(NewMemory {
            content: content.to_string(),
            summary: None,
            trigger_situation: "t".to_string(),
            resolution: None,
            memory_type: MemoryType::Episodic,
            source_agent: "agent".to_string(),
            keywords: vec![],
            salience_score: 0.5,
            context: Default::default(),
            embedding: Some(embedding),
        })
        .unwrap()
}

/// Backdate a connection's `last_used_at` directly in the database file,
/// simulating elapsed time the public `Storage` surface has no setter
/// for.
fn backdate_connection(db_path: &std::path::Path, source_id: &str, target_id: &str, days_ago: i64) {
    let conn = rusqlite::Connection::open(db_path).expect("open raw connection");
    let when = Utc::now() - Duration::days(days_ago);
    conn.execute(
        "UPDATE connections SET last_used_at = ?1 WHERE source_id = ?2 OR target_id = ?2 OR source_id = ?3 OR target_id = ?3",
        rusqlite::params![when, source_id, target_id],
    )
    .expect("backdate connection");
}

#[test]
fn dream_links_similar_memories_and_prunes_stale_weak_edges() {
    let (storage, _dir, db_path) = temp_storage();

    // cos(a, b) = 0.92 exactly: a on the x-axis, b at (0.92, sqrt(1-0.92^2)).
    let a = insert_memory(&storage, "deployed the staging canary", vec![1.0, 0.0]);
    let theta_adjacent = 0.92_f32;
    let theta_opposite = (1.0 - theta_adjacent * theta_adjacent).sqrt();
    let b = insert_memory(&storage, "rolled out the canary release", vec![theta_adjacent, theta_opposite]);

    let unrelated_source = NodeRef::memory("weak-src");
    let unrelated_target = NodeRef::memory("weak-tgt");
    storage.strengthen(&unrelated_source, &unrelated_target, 0.02, ConnectionType::Semantic).unwrap();
    backdate_connection(&db_path, "weak-src", "weak-tgt", 60);

    let config = DreamConfig {
        temporal_window_hours: 0, // isolate the assertion to semantic linking + pruning
        ..DreamConfig::default()
    };
    let result = consolidation::run_dream(&storage, &config).unwrap();

    assert_eq!(result.semantic_links_created, 1);
    assert_eq!(result.pruned_count, 1);

    let edge = storage
        .get_edge(&NodeRef::memory(a.clone()), &NodeRef::memory(b.clone()))
        .unwrap()
        .expect("semantic edge should exist");
    // strengthen(0, alpha=similarity-threshold) with threshold 0.85 -> alpha=0.07
    assert!(edge.strength > 0.0 && edge.strength < 0.1, "got {}", edge.strength);

    let pruned = storage.get_edge(&unrelated_source, &unrelated_target).unwrap();
    assert!(pruned.is_none(), "the stale weak edge should have been removed");
}

#[test]
fn dream_with_maximal_semantic_threshold_creates_no_links() {
    let (storage, _dir, _db_path) = temp_storage();
    let a = insert_memory(&storage, "a", vec![1.0, 0.0]);
    let b = insert_memory(&storage, "b", vec![0.92, (1.0 - 0.92_f32 * 0.92).sqrt()]);

    let config = DreamConfig {
        semantic_threshold: 1.0,
        temporal_window_hours: 0,
        ..DreamConfig::default()
    };
    let result = consolidation::run_dream(&storage, &config).unwrap();

    assert_eq!(result.semantic_links_created, 0);
    assert!(storage
        .get_edge(&NodeRef::memory(a), &NodeRef::memory(b))
        .unwrap()
        .is_none());
}
