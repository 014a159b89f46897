//! Fresh store, single write, direct recall.
//!
//! Write a procedural memory with a high-effort signal and no prior
//! history, then recall it by its own encoded text with a zero
//! threshold: it must come back at rank 1 with an activation equal to
//! its self-similarity, and its salience must match the documented
//! additive formula (base 0.3 + high-effort 0.25, boosted by the
//! default-history surprise score of 0.5).

use synapse_core::{EffortLevel, MemoryType, RecallOptions, SalienceSignals};
use synapse_e2e_tests::harness::TestEngineManager;

#[test]
fn fresh_store_then_direct_recall_ranks_first() {
    let manager = TestEngineManager::new_temp();

    let content = "Disk cleanup freed 40 GB on server";
    let trigger = "Disk space warning";

    let mut signals = SalienceSignals::default();
    signals.effort_level = Some(EffortLevel::High);

    let outcome = manager
        .engine
        .store(
            content.to_string(),
            trigger.to_string(),
            None,
            MemoryType::Procedural,
            Some(signals),
            "agent-1".to_string(),
        )
        .expect("store should succeed");

    assert_eq!(outcome.surprise_score, 0.5, "empty history defaults surprise to 0.5");
    assert!(!outcome.was_compressed);

    // Recall using exactly the text the write pipeline embedded
    // (trigger + stored content) to get a deterministic self-match.
    let query = format!("{trigger}\n{content}");
    let hits = manager
        .engine
        .recall(&query, RecallOptions {
            threshold: Some(0.0),
            use_spreading_activation: true,
            max_depth: Some(1),
            ..Default::default()
        })
        .expect("recall should succeed");

    assert_eq!(hits.len(), 1, "the only stored memory should come back");
    let hit = &hits[0];
    assert_eq!(hit.memory.id, outcome.memory_id);
    assert!(
        (hit.activation - 1.0).abs() < 1e-4,
        "self-similarity on the exact embedded text should be ~1.0, got {}",
        hit.activation
    );

    // base = 0.3 + 0.25 (high effort) = 0.55
    // surprise = 0.5 >= threshold(0.7)? no -> no surprise boost applied
    let expected_salience = 0.3_f32 + 0.25;
    assert!(
        (hit.memory.salience_score - expected_salience).abs() < 1e-4,
        "salience {} should match base + high-effort weight {}",
        hit.memory.salience_score,
        expected_salience
    );
}
