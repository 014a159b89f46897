//! Test engine manager
//!
//! Provides an isolated, temp-directory-backed `Engine` per test so
//! scenario tests never share state. Uses the deterministic embedding
//! gateway rather than the local ONNX model — no network, no model
//! download, same retrieval/plasticity contracts.

use std::path::PathBuf;

use synapse_core::embeddings::DeterministicGateway;
use synapse_core::{Engine, EngineConfig};
use tempfile::TempDir;

pub const TEST_EMBEDDING_DIM: usize = 64;

/// Owns the `Engine` plus the temp directory backing its database file;
/// dropping this drops both.
pub struct TestEngineManager {
    pub engine: Engine,
    _temp_dir: TempDir,
    db_path: PathBuf,
}

impl TestEngineManager {
    /// Build a fresh engine in a new temp directory, using the
    /// deterministic gateway at `TEST_EMBEDDING_DIM`.
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let db_path = temp_dir.path().join("test_synapse.db");

        let mut config = EngineConfig::default();
        config.database_url = Some(db_path.clone());
        config.embedding_dim = TEST_EMBEDDING_DIM;

        let engine = Engine::with_gateway(config, Box::new(DeterministicGateway::new(TEST_EMBEDDING_DIM)))
            .expect("failed to build test engine");

        Self {
            engine,
            _temp_dir: temp_dir,
            db_path,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_engine_starts_empty() {
        let manager = TestEngineManager::new_temp();
        let stats = manager.engine.get_memory_stats().unwrap();
        assert_eq!(stats.total_memories, 0);
        assert!(manager.path().parent().unwrap().exists());
    }
}
