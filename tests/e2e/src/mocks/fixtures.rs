//! Test data factory
//!
//! Generates realistic write requests for scenario and batch tests,
//! going through the same `Engine::store` entry point a real host uses.

use synapse_core::{Engine, MemoryType, SalienceSignals, WriteOutcome};

pub struct TestDataFactory;

impl TestDataFactory {
    /// Store a single episodic memory with default signals.
    pub fn create_memory(engine: &Engine, content: &str, trigger: &str) -> WriteOutcome {
        engine
            .store(
                content.to_string(),
                trigger.to_string(),
                None,
                MemoryType::Episodic,
                None,
                "test-agent".to_string(),
            )
            .expect("store should succeed")
    }

    /// Store a memory of a specific type with explicit salience signals.
    pub fn create_memory_with_signals(
        engine: &Engine,
        content: &str,
        trigger: &str,
        memory_type: MemoryType,
        signals: SalienceSignals,
    ) -> WriteOutcome {
        engine
            .store(
                content.to_string(),
                trigger.to_string(),
                None,
                memory_type,
                Some(signals),
                "test-agent".to_string(),
            )
            .expect("store should succeed")
    }

    /// Store `count` distinct episodic memories, returning their ids.
    pub fn create_batch(engine: &Engine, count: usize, content_prefix: &str) -> Vec<String> {
        (0..count)
            .map(|i| {
                let outcome = Self::create_memory(
                    engine,
                    &format!("{content_prefix} {i}"),
                    &format!("trigger for {content_prefix} {i}"),
                );
                outcome.memory_id
            })
            .collect()
    }
}
