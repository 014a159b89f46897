//! Property-style checks from the testable-properties list: bounded
//! strength, keyword recall correctness, similarity-threshold
//! monotonicity, and bi-temporal relation supersession.

use synapse_core::memory::{EntityType, MemoryType};
use synapse_core::storage::{NewMemory, Storage};
use synapse_core::{ConnectionType, NodeKind};
use synapse_e2e_tests::harness::TestEngineManager;
use synapse_e2e_tests::mocks::TestDataFactory;

fn temp_storage() -> (Storage, tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("test.db");
    let storage = Storage::new(Some(path.clone())).expect("storage");
    (storage, dir, path)
}

#[test]
fn strength_stays_bounded_through_mixed_strengthen_and_weaken() {
    let manager = TestEngineManager::new_temp();
    let engine = &manager.engine;

    let mut strength = engine
        .strengthen_pathway("x", NodeKind::Memory, "y", NodeKind::Memory, Some(0.3), None)
        .unwrap();
    assert!((0.0..=1.0).contains(&strength));

    for amount in [0.9, 0.9, 0.9, 0.9, 0.9] {
        strength = engine
            .strengthen_pathway("x", NodeKind::Memory, "y", NodeKind::Memory, Some(amount), None)
            .unwrap();
        assert!((0.0..=1.0).contains(&strength));
    }
    assert!(strength < 1.0);
}

#[test]
fn strengthening_never_decreases_strength() {
    let (storage, _dir, _path) = temp_storage();
    use synapse_core::memory::NodeRef;

    let source = NodeRef::memory("m1");
    let target = NodeRef::memory("m2");

    let mut previous = 0.0_f32;
    for alpha in [0.0, 0.2, 0.5, 0.0, 0.9] {
        let next = storage.strengthen(&source, &target, alpha, ConnectionType::Semantic).unwrap();
        assert!(next >= previous, "strengthen must never reduce strength");
        previous = next;
    }
}

#[test]
fn strengthen_by_zero_is_a_no_op() {
    let (storage, _dir, _path) = temp_storage();
    use synapse_core::memory::NodeRef;

    let source = NodeRef::memory("m1");
    let target = NodeRef::memory("m2");

    let first = storage.strengthen(&source, &target, 0.4, ConnectionType::Semantic).unwrap();
    let second = storage.strengthen(&source, &target, 0.0, ConnectionType::Semantic).unwrap();
    assert_eq!(first, second);
}

#[test]
fn keyword_search_returns_exactly_the_intersecting_records() {
    let manager = TestEngineManager::new_temp();
    let engine = &manager.engine;

    let outcome_a = TestDataFactory::create_memory(
        engine,
        "restarted the worker pool after the deploy",
        "worker pool stopped responding",
    );
    let outcome_b = TestDataFactory::create_memory(
        engine,
        "rotated the database credentials",
        "security audit flagged stale secrets",
    );

    let worker_hits = engine.search_by_keywords(&["worker".to_string()], 10).unwrap();
    assert!(worker_hits.iter().any(|m| m.id == outcome_a.memory_id));
    assert!(!worker_hits.iter().any(|m| m.id == outcome_b.memory_id));

    let credential_hits = engine.search_by_keywords(&["credentials".to_string()], 10).unwrap();
    assert!(credential_hits.iter().any(|m| m.id == outcome_b.memory_id));
    assert!(!credential_hits.iter().any(|m| m.id == outcome_a.memory_id));
}

#[test]
fn raising_the_similarity_threshold_only_shrinks_the_result_set() {
    let (storage, _dir, _path) = temp_storage();

    let query = vec![1.0_f32, 0.0];
    let candidates = [
        ("exact", vec![1.0_f32, 0.0]),
        ("close", vec![0.95_f32, (1.0 - 0.95_f32 * 0.95_f32).sqrt()]),
        ("far", vec![0.0_f32, 1.0]),
    ];

    for (content, embedding) in candidates {
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
            .unwrap();
    }

    let loose = storage.similar_memories(&query, 0.3, 100, None).unwrap();
    let strict = storage.similar_memories(&query, 0.94, 100, None).unwrap();
    let exact_only = storage.similar_memories(&query, 1.0, 100, None).unwrap();

    let loose_ids: std::collections::HashSet<_> = loose.iter().map(|(id, _)| id.clone()).collect();
    let strict_ids: std::collections::HashSet<_> = strict.iter().map(|(id, _)| id.clone()).collect();
    let exact_ids: std::collections::HashSet<_> = exact_only.iter().map(|(id, _)| id.clone()).collect();

    assert!(strict_ids.is_subset(&loose_ids));
    assert!(exact_ids.is_subset(&strict_ids));
    assert_eq!(exact_ids.len(), 1, "threshold 1.0 keeps only the exact cosine match");
}

#[test]
fn superseding_a_relation_closes_its_validity_window_at_the_successor_start() {
    let (storage, _dir, db_path) = temp_storage();

    let memory_id = storage
        .insert_memory(NewMemory {
            content: "fixed the parser by handling the trailing comma".to_string(),
            summary: None,
            trigger_situation: "t".to_string(),
            resolution: None,
            memory_type: MemoryType::Episodic,
            source_agent: "agent".to_string(),
            keywords: vec![],
            salience_score: 0.5,
            context: Default::default(),
            embedding: None,
        })
        .unwrap();

    let subject = storage.insert_entity(&memory_id, "trailing comma bug", EntityType::Error, 0.8).unwrap();
    let object = storage.insert_entity(&memory_id, "trailing comma fix", EntityType::Solution, 0.9).unwrap();

    let first_time = chrono::Utc::now() - chrono::Duration::hours(1);
    let first = storage
        .insert_relation(&memory_id, &subject.id, "solved", &object.id, 0.9, first_time)
        .unwrap();
    assert!(first.respects_monotone_time(first_time));

    let second_time = chrono::Utc::now();
    let second = storage
        .insert_relation(&memory_id, &subject.id, "solved", &object.id, 0.95, second_time)
        .unwrap();

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let (status, valid_to): (String, Option<chrono::DateTime<chrono::Utc>>) = conn
        .query_row(
            "SELECT relation_status, valid_to FROM relations WHERE id = ?1",
            rusqlite::params![first.id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();

    assert_eq!(status, "superseded");
    assert_eq!(valid_to, Some(second.valid_from));
}
