//! Hebbian strengthening saturates toward 1 but never reaches it.

use synapse_core::{ConnectionType, NodeKind};
use synapse_e2e_tests::harness::TestEngineManager;

#[test]
fn repeated_strengthening_saturates_below_one() {
    let manager = TestEngineManager::new_temp();
    let engine = &manager.engine;

    let mut strength = 0.0_f32;
    let mut observed = Vec::with_capacity(20);
    for _ in 0..20 {
        strength = engine
            .strengthen_pathway(
                "a",
                NodeKind::Memory,
                "b",
                NodeKind::Memory,
                Some(0.1),
                Some(ConnectionType::Semantic),
            )
            .unwrap();
        observed.push(strength);
        assert!(strength < 1.0);
    }

    assert!((observed[0] - 0.1).abs() < 1e-4, "step 1: {}", observed[0]);
    assert!((observed[4] - 0.41).abs() < 0.01, "step 5: {}", observed[4]);
    assert!((observed[9] - 0.65).abs() < 0.01, "step 10: {}", observed[9]);
    assert!((observed[19] - 0.88).abs() < 0.01, "step 20: {}", observed[19]);

    for window in observed.windows(2) {
        assert!(window[1] > window[0], "strength must increase monotonically");
    }
}
