//! Schema migrations for the storage layer.

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Initial schema: memories, concepts, entities, relations, connections, logs",
    up: MIGRATION_V1_UP,
}];

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
}

const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS memories (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    summary TEXT,
    trigger_situation TEXT NOT NULL,
    resolution TEXT,
    memory_type TEXT NOT NULL,
    source_agent TEXT NOT NULL,
    keywords TEXT NOT NULL DEFAULT '[]',
    salience_score REAL NOT NULL DEFAULT 0.3,
    retrieval_count INTEGER NOT NULL DEFAULT 0,
    last_retrieved_at TEXT,
    current_activation REAL NOT NULL DEFAULT 0.0,
    last_activated TEXT,
    context TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    embedding BLOB,
    embedding_dim INTEGER
);

CREATE INDEX IF NOT EXISTS idx_memories_type ON memories(memory_type);
CREATE INDEX IF NOT EXISTS idx_memories_source_agent ON memories(source_agent);
CREATE INDEX IF NOT EXISTS idx_memories_created ON memories(created_at);
CREATE INDEX IF NOT EXISTS idx_memories_activation ON memories(current_activation);

CREATE TABLE IF NOT EXISTS concepts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    current_activation REAL NOT NULL DEFAULT 0.0,
    last_activated TEXT,
    created_at TEXT NOT NULL,
    embedding BLOB,
    embedding_dim INTEGER
);

CREATE INDEX IF NOT EXISTS idx_concepts_activation ON concepts(current_activation);

CREATE TABLE IF NOT EXISTS entities (
    id TEXT PRIMARY KEY,
    memory_id TEXT NOT NULL REFERENCES memories(id) ON DELETE CASCADE,
    entity_text TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    salience_score REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entities_memory ON entities(memory_id);
CREATE INDEX IF NOT EXISTS idx_entities_text ON entities(entity_text);
CREATE UNIQUE INDEX IF NOT EXISTS idx_entities_unique ON entities(memory_id, LOWER(entity_text));

CREATE TABLE IF NOT EXISTS relations (
    id TEXT PRIMARY KEY,
    memory_id TEXT NOT NULL REFERENCES memories(id) ON DELETE CASCADE,
    subject_entity_id TEXT NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
    predicate TEXT NOT NULL,
    object_entity_id TEXT NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
    confidence REAL NOT NULL,
    valid_from TEXT NOT NULL,
    valid_to TEXT,
    relation_status TEXT NOT NULL DEFAULT 'active'
);

CREATE INDEX IF NOT EXISTS idx_relations_subject ON relations(subject_entity_id, predicate, object_entity_id);

CREATE TABLE IF NOT EXISTS connections (
    source_id TEXT NOT NULL,
    source_kind TEXT NOT NULL,
    target_id TEXT NOT NULL,
    target_kind TEXT NOT NULL,
    connection_type TEXT NOT NULL,
    strength REAL NOT NULL,
    usage_count INTEGER NOT NULL DEFAULT 1,
    last_used_at TEXT NOT NULL,
    PRIMARY KEY (source_id, source_kind, target_id, target_kind)
);

CREATE INDEX IF NOT EXISTS idx_connections_strength ON connections(source_id, source_kind, strength);
CREATE INDEX IF NOT EXISTS idx_connections_type ON connections(connection_type);

CREATE TABLE IF NOT EXISTS activation_log (
    id TEXT PRIMARY KEY,
    query_text TEXT NOT NULL,
    query_embedding BLOB,
    activated_memory_ids TEXT NOT NULL DEFAULT '[]',
    activated_concept_ids TEXT NOT NULL DEFAULT '[]',
    agent TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activation_log_created ON activation_log(created_at);

CREATE TABLE IF NOT EXISTS dream_log (
    id TEXT PRIMARY KEY,
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    semantic_links_created INTEGER NOT NULL DEFAULT 0,
    episodic_bindings_created INTEGER NOT NULL DEFAULT 0,
    co_activation_reinforced INTEGER NOT NULL DEFAULT 0,
    pruned_count INTEGER NOT NULL DEFAULT 0
);
"#;

fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Apply every migration newer than the database's recorded version.
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "applying migration v{}: {}",
                migration.version,
                migration.description
            );
            conn.execute_batch(migration.up)?;
            conn.pragma_update(None, "user_version", migration.version)?;
            applied += 1;
        }
    }

    Ok(applied)
}
