//! Surprise auto-save: a context/response exchange carrying a surprise
//! keyword and an outcome contradiction clears the surprise threshold,
//! and the `auto_save` flag alone decides whether that gets persisted.

use synapse_e2e_tests::harness::TestEngineManager;

const CONTEXT: &str = "Deployment succeeded as expected";
const RESPONSE: &str = "Actually turns out the deploy failed - corrupted migration.";

#[test]
fn auto_save_true_persists_with_the_expected_context_stamps() {
    let manager = TestEngineManager::new_temp();
    let engine = &manager.engine;

    let outcome = engine
        .detect_surprise(CONTEXT, RESPONSE, "agent-1".to_string(), true)
        .unwrap();

    assert!(outcome.surprise_score >= 0.7, "got {}", outcome.surprise_score);
    assert!(outcome.was_stored);

    let memory_id = outcome.memory_id.expect("memory should have been stored");
    let hits = engine.search_by_keywords(&["corrupted".to_string()], 10).unwrap();
    let stored = hits.iter().find(|m| m.id == memory_id).expect("stored memory should be findable");

    assert_eq!(stored.context.get("storage_method").and_then(|v| v.as_str()), Some("auto"));
    assert_eq!(stored.context.get("surprise_detected").and_then(|v| v.as_bool()), Some(true));
}

#[test]
fn auto_save_false_reports_the_score_without_writing() {
    let manager = TestEngineManager::new_temp();
    let engine = &manager.engine;

    let outcome = engine
        .detect_surprise(CONTEXT, RESPONSE, "agent-1".to_string(), false)
        .unwrap();

    assert!(outcome.surprise_score >= 0.7);
    assert!(!outcome.was_stored);
    assert!(outcome.memory_id.is_none());
    assert_eq!(engine.get_memory_stats().unwrap().total_memories, 0);
}
