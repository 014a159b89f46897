//! SQLite-backed storage: the single persistence boundary for both the
//! Memory Store contract (§4.B) and the Connection Graph contract (§4.D).
//!
//! Uses separate reader/writer connections for interior mutability. All
//! methods take `&self`, making `Storage` `Send + Sync` so callers can
//! share it behind an `Arc` instead of an `Arc<Mutex<Storage>>`.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::embeddings::cosine_similarity;
use crate::error::FailureKind;
use crate::graph::{Connection as Edge, ConnectionStats, ConnectionType, MAX_OUTGOING, STRENGTH_FLOOR};
use crate::graph::hebbian::{strengthen_weight, weaken_weight};
use crate::memory::{
    Concept, Entity, EntityType, MemoryContext, MemoryRecord, MemoryStats, MemoryType, NodeKind,
    NodeRef, Relation, RelationStatus,
};

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("initialization error: {0}")]
    Init(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl StorageError {
    pub fn kind(&self) -> FailureKind {
        match self {
            StorageError::NotFound(_) => FailureKind::NotFound,
            StorageError::InvalidData(_) => FailureKind::Validation,
            StorageError::Database(_) | StorageError::Io(_) | StorageError::Init(_) => {
                FailureKind::Transient
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// One entry read back from the append-only activation log.
#[derive(Debug, Clone)]
pub struct ActivationLogEntry {
    pub activated_memory_ids: Vec<String>,
    pub activated_concept_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a memory, short of the identity and
/// bookkeeping fields `Storage` itself generates (§4.B `insert_memory`).
pub struct NewMemory {
    pub content: String,
    pub summary: Option<String>,
    pub trigger_situation: String,
    pub resolution: Option<String>,
    pub memory_type: MemoryType,
    pub source_agent: String,
    pub keywords: Vec<String>,
    pub salience_score: f32,
    pub context: MemoryContext,
    pub embedding: Option<Vec<f32>>,
}

fn embed_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_embed(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

fn row_to_memory(row: &Row) -> rusqlite::Result<MemoryRecord> {
    let keywords_json: String = row.get("keywords")?;
    let context_json: String = row.get("context")?;
    let memory_type_str: String = row.get("memory_type")?;

    Ok(MemoryRecord {
        id: row.get("id")?,
        content: row.get("content")?,
        summary: row.get("summary")?,
        trigger_situation: row.get("trigger_situation")?,
        resolution: row.get("resolution")?,
        memory_type: memory_type_str.parse().unwrap_or(MemoryType::Episodic),
        source_agent: row.get("source_agent")?,
        keywords: serde_json::from_str(&keywords_json).unwrap_or_default(),
        salience_score: row.get("salience_score")?,
        retrieval_count: row.get::<_, i64>("retrieval_count")? as u64,
        last_retrieved_at: row.get("last_retrieved_at")?,
        current_activation: row.get("current_activation")?,
        last_activated: row.get("last_activated")?,
        context: serde_json::from_str(&context_json).unwrap_or_default(),
        created_at: row.get("created_at")?,
    })
}

fn row_to_concept(row: &Row) -> rusqlite::Result<Concept> {
    Ok(Concept {
        id: row.get("id")?,
        name: row.get("name")?,
        current_activation: row.get("current_activation")?,
        last_activated: row.get("last_activated")?,
        created_at: row.get("created_at")?,
    })
}

fn row_to_entity(row: &Row) -> rusqlite::Result<Entity> {
    let entity_type_str: String = row.get("entity_type")?;
    let entity_type = match entity_type_str.as_str() {
        "PERSON" => EntityType::Person,
        "TOOL" => EntityType::Tool,
        "FILE" => EntityType::File,
        "ERROR" => EntityType::Error,
        "SOLUTION" => EntityType::Solution,
        _ => EntityType::Concept,
    };
    Ok(Entity {
        id: row.get("id")?,
        memory_id: row.get("memory_id")?,
        entity_text: row.get("entity_text")?,
        entity_type,
        salience_score: row.get("salience_score")?,
    })
}

fn row_to_relation(row: &Row) -> rusqlite::Result<Relation> {
    let status_str: String = row.get("relation_status")?;
    let relation_status = match status_str.as_str() {
        "superseded" => RelationStatus::Superseded,
        "invalid" => RelationStatus::Invalid,
        _ => RelationStatus::Active,
    };
    Ok(Relation {
        id: row.get("id")?,
        memory_id: row.get("memory_id")?,
        subject_entity_id: row.get("subject_entity_id")?,
        predicate: row.get("predicate")?,
        object_entity_id: row.get("object_entity_id")?,
        confidence: row.get("confidence")?,
        valid_from: row.get("valid_from")?,
        valid_to: row.get("valid_to")?,
        relation_status,
    })
}

fn row_to_edge(row: &Row) -> rusqlite::Result<Edge> {
    let source_kind_str: String = row.get("source_kind")?;
    let target_kind_str: String = row.get("target_kind")?;
    let connection_type_str: String = row.get("connection_type")?;

    Ok(Edge {
        source: NodeRef {
            id: row.get("source_id")?,
            kind: if source_kind_str == "concept" {
                NodeKind::Concept
            } else {
                NodeKind::Memory
            },
        },
        target: NodeRef {
            id: row.get("target_id")?,
            kind: if target_kind_str == "concept" {
                NodeKind::Concept
            } else {
                NodeKind::Memory
            },
        },
        connection_type: connection_type_str.parse().unwrap_or(ConnectionType::Semantic),
        strength: row.get("strength")?,
        usage_count: row.get::<_, i64>("usage_count")? as u64,
        last_used_at: row.get("last_used_at")?,
    })
}

pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl Storage {
    fn configure_connection(conn: &Connection) -> Result<()> {
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("SYNAPSE_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("dev", "synapse", "core").ok_or_else(|| {
                    StorageError::Init("could not determine project directories".to_string())
                })?;
                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let _ = std::fs::set_permissions(data_dir, std::fs::Permissions::from_mode(0o700));
                }
                data_dir.join("synapse.db")
            }
        };

        let writer_conn = Connection::open(&path)?;
        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600));
        }

        Self::configure_connection(&writer_conn)?;
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("writer lock poisoned".into()))
    }

    fn reader(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("reader lock poisoned".into()))
    }

    // ---------------------------------------------------------------
    // Memory store (§4.B)
    // ---------------------------------------------------------------

    pub fn insert_memory(&self, draft: NewMemory) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let keywords_json = serde_json::to_string(&draft.keywords).unwrap_or_else(|_| "[]".into());
        let context_json = serde_json::to_string(&draft.context).unwrap_or_else(|_| "{}".into());
        let (embedding_bytes, embedding_dim) = match &draft.embedding {
            Some(v) => (Some(embed_to_bytes(v)), Some(v.len() as i64)),
            None => (None, None),
        };

        self.writer()?.execute(
            "INSERT INTO memories (
                id, content, summary, trigger_situation, resolution, memory_type,
                source_agent, keywords, salience_score, retrieval_count,
                last_retrieved_at, current_activation, last_activated, context,
                created_at, embedding, embedding_dim
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, NULL, 0.0, NULL, ?10, ?11, ?12, ?13)",
            params![
                id,
                draft.content,
                draft.summary,
                draft.trigger_situation,
                draft.resolution,
                draft.memory_type.as_str(),
                draft.source_agent,
                keywords_json,
                draft.salience_score,
                context_json,
                now,
                embedding_bytes,
                embedding_dim,
            ],
        )?;

        Ok(id)
    }

    pub fn fetch_by_id(&self, id: &str) -> Result<MemoryRecord> {
        self.reader()?
            .query_row("SELECT * FROM memories WHERE id = ?1", params![id], row_to_memory)
            .optional()?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    pub fn fetch_many(&self, ids: &[String]) -> Result<Vec<MemoryRecord>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let reader = self.reader()?;
        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!("SELECT * FROM memories WHERE id IN ({placeholders})");
        let mut stmt = reader.prepare(&sql)?;
        let params: Vec<&dyn rusqlite::ToSql> = ids.iter().map(|s| s as &dyn rusqlite::ToSql).collect();
        let rows = stmt.query_map(params.as_slice(), row_to_memory)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Memories carrying a stored embedding, paired with that vector.
    /// Used by `similar_memories` and by the dream pass's semantic
    /// linking phase (§4.F phase 1).
    pub fn embedded_memories(&self) -> Result<Vec<(MemoryRecord, Vec<f32>)>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM memories WHERE embedding IS NOT NULL")?;
        let rows = stmt.query_map([], |row| {
            let record = row_to_memory(row)?;
            let bytes: Vec<u8> = row.get("embedding")?;
            Ok((record, bytes))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (record, bytes) = row?;
            if let Some(vec) = bytes_to_embed(&bytes) {
                out.push((record, vec));
            }
        }
        Ok(out)
    }

    /// `similar_memories` (§4.B): cosine similarity over stored
    /// embeddings, filtered by `1 - cos_distance >= threshold` i.e.
    /// `similarity >= threshold`. Implemented as a linear scan — any
    /// engine offering threshold-and-limit cosine queries is acceptable
    /// (§6 "Store contract"); bundled SQLite has no native vector index.
    pub fn similar_memories(
        &self,
        query_vec: &[f32],
        threshold: f32,
        limit: usize,
        type_filter: Option<MemoryType>,
    ) -> Result<Vec<(String, f32)>> {
        let mut scored: Vec<(MemoryRecord, f32)> = self
            .embedded_memories()?
            .into_iter()
            .filter(|(record, _)| type_filter.map(|t| t == record.memory_type).unwrap_or(true))
            .map(|(record, vec)| {
                let sim = cosine_similarity(query_vec, &vec);
                (record, sim)
            })
            .filter(|(_, sim)| *sim >= threshold)
            .collect();

        scored.sort_by(|(a, sa), (b, sb)| {
            sb.partial_cmp(sa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.salience_score.partial_cmp(&a.salience_score).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        scored.truncate(limit);
        Ok(scored.into_iter().map(|(r, sim)| (r.id, sim)).collect())
    }

    pub fn similar_concepts(
        &self,
        query_vec: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<(String, f32)>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM concepts WHERE embedding IS NOT NULL")?;
        let rows = stmt.query_map([], |row| {
            let concept = row_to_concept(row)?;
            let bytes: Vec<u8> = row.get("embedding")?;
            Ok((concept, bytes))
        })?;

        let mut scored: Vec<(Concept, f32)> = Vec::new();
        for row in rows {
            let (concept, bytes) = row?;
            if let Some(vec) = bytes_to_embed(&bytes) {
                let sim = cosine_similarity(query_vec, &vec);
                if sim >= threshold {
                    scored.push((concept, sim));
                }
            }
        }

        scored.sort_by(|(a, sa), (b, sb)| {
            sb.partial_cmp(sa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        scored.truncate(limit);
        Ok(scored.into_iter().map(|(c, sim)| (c.id, sim)).collect())
    }

    /// `keyword_search` (§4.B): records whose stored keyword set
    /// intersects the query set, ranked by intersection size then
    /// recency.
    pub fn keyword_search(&self, keywords: &[String], limit: usize) -> Result<Vec<MemoryRecord>> {
        if keywords.is_empty() {
            return Ok(vec![]);
        }
        let query_set: std::collections::HashSet<String> =
            keywords.iter().map(|k| k.to_lowercase()).collect();

        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM memories")?;
        let rows = stmt.query_map([], row_to_memory)?;

        let mut scored: Vec<(MemoryRecord, usize)> = Vec::new();
        for row in rows {
            let record = row?;
            let overlap = record
                .keywords
                .iter()
                .filter(|k| query_set.contains(&k.to_lowercase()))
                .count();
            if overlap > 0 {
                scored.push((record, overlap));
            }
        }

        scored.sort_by(|(a, oa), (b, ob)| {
            ob.cmp(oa).then_with(|| b.created_at.cmp(&a.created_at))
        });
        scored.truncate(limit);
        Ok(scored.into_iter().map(|(r, _)| r).collect())
    }

    pub fn increment_retrieval(&self, id: &str) -> Result<()> {
        let now = Utc::now();
        let changed = self.writer()?.execute(
            "UPDATE memories SET retrieval_count = retrieval_count + 1, last_retrieved_at = ?2 WHERE id = ?1",
            params![id, now],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn set_activation(&self, id: &str, kind: NodeKind, value: f32) -> Result<()> {
        let clamped = value.clamp(0.0, 1.0);
        let now = Utc::now();
        let table = match kind {
            NodeKind::Memory => "memories",
            NodeKind::Concept => "concepts",
        };
        let sql = format!(
            "UPDATE {table} SET current_activation = ?2, last_activated = ?3 WHERE id = ?1"
        );
        let changed = self.writer()?.execute(&sql, params![id, clamped, now])?;
        if changed == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn list_recent(&self, n: usize) -> Result<Vec<MemoryRecord>> {
        let reader = self.reader()?;
        let mut stmt =
            reader.prepare("SELECT * FROM memories ORDER BY created_at DESC LIMIT ?1")?;
        let rows = stmt.query_map(params![n as i64], row_to_memory)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn memory_stats(&self) -> Result<MemoryStats> {
        let reader = self.reader()?;
        let total: i64 = reader.query_row("SELECT COUNT(*) FROM memories", [], |r| r.get(0))?;

        let mut by_type = std::collections::HashMap::new();
        let mut stmt = reader.prepare("SELECT memory_type, COUNT(*) FROM memories GROUP BY memory_type")?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
        for row in rows {
            let (t, c) = row?;
            by_type.insert(t, c);
        }

        let mut by_source_agent = std::collections::HashMap::new();
        let mut stmt = reader.prepare("SELECT source_agent, COUNT(*) FROM memories GROUP BY source_agent")?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
        for row in rows {
            let (a, c) = row?;
            by_source_agent.insert(a, c);
        }

        Ok(MemoryStats {
            total_memories: total,
            by_type,
            by_source_agent,
        })
    }

    // ---------------------------------------------------------------
    // Concepts and entities/relations (§3)
    // ---------------------------------------------------------------

    /// Get a concept by name, or create one with zero activation if it
    /// doesn't exist yet — the extractor's only write path into the
    /// concept table.
    pub fn get_or_create_concept(&self, name: &str, embedding: Option<&[f32]>) -> Result<Concept> {
        if let Some(concept) = self
            .reader()?
            .query_row("SELECT * FROM concepts WHERE name = ?1", params![name], row_to_concept)
            .optional()?
        {
            return Ok(concept);
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let (bytes, dim) = match embedding {
            Some(v) => (Some(embed_to_bytes(v)), Some(v.len() as i64)),
            None => (None, None),
        };

        self.writer()?.execute(
            "INSERT INTO concepts (id, name, current_activation, last_activated, created_at, embedding, embedding_dim)
             VALUES (?1, ?2, 0.0, NULL, ?3, ?4, ?5)
             ON CONFLICT(name) DO NOTHING",
            params![id, name, now, bytes, dim],
        )?;

        self.reader()?
            .query_row("SELECT * FROM concepts WHERE name = ?1", params![name], row_to_concept)
            .map_err(Into::into)
    }

    /// Insert an entity, or if `(memory_id, lowercased entity_text)` already
    /// exists within this memory, keep the row and raise its salience to the
    /// max of the two observations (§3 entity invariant).
    pub fn insert_entity(&self, memory_id: &str, entity_text: &str, entity_type: EntityType, salience_score: f32) -> Result<Entity> {
        let id = Uuid::new_v4().to_string();
        self.writer()?.execute(
            "INSERT INTO entities (id, memory_id, entity_text, entity_type, salience_score)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(memory_id, LOWER(entity_text))
             DO UPDATE SET salience_score = MAX(salience_score, excluded.salience_score)",
            params![id, memory_id, entity_text, entity_type.as_str(), salience_score],
        )?;
        self.reader()?
            .query_row(
                "SELECT * FROM entities WHERE memory_id = ?1 AND entity_text = ?2 COLLATE NOCASE",
                params![memory_id, entity_text],
                row_to_entity,
            )
            .map_err(Into::into)
    }

    pub fn entities_for_memory(&self, memory_id: &str) -> Result<Vec<Entity>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM entities WHERE memory_id = ?1")?;
        let rows = stmt.query_map(params![memory_id], row_to_entity)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Insert a relation, superseding any prior active relation for the
    /// same (subject, predicate, object) triple (§3 bi-temporal
    /// invariant (ii)/(iii)).
    pub fn insert_relation(
        &self,
        memory_id: &str,
        subject_entity_id: &str,
        predicate: &str,
        object_entity_id: &str,
        confidence: f32,
        valid_from: DateTime<Utc>,
    ) -> Result<Relation> {
        let writer = self.writer()?;

        writer.execute(
            "UPDATE relations SET valid_to = ?1, relation_status = 'superseded'
             WHERE subject_entity_id = ?2 AND predicate = ?3 AND object_entity_id = ?4
               AND relation_status = 'active'",
            params![valid_from, subject_entity_id, predicate, object_entity_id],
        )?;

        let id = Uuid::new_v4().to_string();
        writer.execute(
            "INSERT INTO relations (id, memory_id, subject_entity_id, predicate, object_entity_id, confidence, valid_from, valid_to, relation_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, 'active')",
            params![id, memory_id, subject_entity_id, predicate, object_entity_id, confidence, valid_from],
        )?;

        Ok(Relation {
            id,
            memory_id: memory_id.to_string(),
            subject_entity_id: subject_entity_id.to_string(),
            predicate: predicate.to_string(),
            object_entity_id: object_entity_id.to_string(),
            confidence,
            valid_from,
            valid_to: None,
            relation_status: RelationStatus::Active,
        })
    }

    // ---------------------------------------------------------------
    // Connection graph (§4.D)
    // ---------------------------------------------------------------

    fn node_columns(node: &NodeRef) -> (&str, &str) {
        (node.id.as_str(), node.kind.as_str())
    }

    /// `strengthen` (§4.D): `w' = w + alpha*(1-w)`. Creates the edge with
    /// initial strength `alpha` if absent; otherwise updates strength and
    /// increments the usage counter.
    pub fn strengthen(
        &self,
        source: &NodeRef,
        target: &NodeRef,
        alpha: f32,
        connection_type: ConnectionType,
    ) -> Result<f32> {
        let (source_id, source_kind) = Self::node_columns(source);
        let (target_id, target_kind) = Self::node_columns(target);
        let now = Utc::now();

        let writer = self.writer()?;
        let existing: Option<f32> = writer
            .query_row(
                "SELECT strength FROM connections WHERE source_id = ?1 AND source_kind = ?2 AND target_id = ?3 AND target_kind = ?4",
                params![source_id, source_kind, target_id, target_kind],
                |r| r.get(0),
            )
            .optional()?;

        let new_strength = match existing {
            Some(current) => {
                let next = strengthen_weight(current, alpha);
                writer.execute(
                    "UPDATE connections SET strength = ?5, usage_count = usage_count + 1, last_used_at = ?6
                     WHERE source_id = ?1 AND source_kind = ?2 AND target_id = ?3 AND target_kind = ?4",
                    params![source_id, source_kind, target_id, target_kind, next, now],
                )?;
                next
            }
            None => {
                let next = strengthen_weight(0.0, alpha);
                writer.execute(
                    "INSERT INTO connections (source_id, source_kind, target_id, target_kind, connection_type, strength, usage_count, last_used_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
                    params![source_id, source_kind, target_id, target_kind, connection_type.as_str(), next, now],
                )?;
                next
            }
        };

        Ok(new_strength)
    }

    /// `weaken` (§4.D): `w' = max(0, w - beta)`. No-op (returns 0.0) if
    /// the edge doesn't exist.
    pub fn weaken(&self, source: &NodeRef, target: &NodeRef, beta: f32) -> Result<f32> {
        let (source_id, source_kind) = Self::node_columns(source);
        let (target_id, target_kind) = Self::node_columns(target);

        let writer = self.writer()?;
        let existing: Option<f32> = writer
            .query_row(
                "SELECT strength FROM connections WHERE source_id = ?1 AND source_kind = ?2 AND target_id = ?3 AND target_kind = ?4",
                params![source_id, source_kind, target_id, target_kind],
                |r| r.get(0),
            )
            .optional()?;

        let Some(current) = existing else {
            return Ok(0.0);
        };

        let next = weaken_weight(current, beta);
        writer.execute(
            "UPDATE connections SET strength = ?5 WHERE source_id = ?1 AND source_kind = ?2 AND target_id = ?3 AND target_kind = ?4",
            params![source_id, source_kind, target_id, target_kind, next],
        )?;

        Ok(next)
    }

    /// `get_outgoing` (§4.D): strongest `MAX_OUTGOING` edges above
    /// `STRENGTH_FLOOR`, by strength descending. This cap is a
    /// correctness contract for spreading activation, not a tuning knob.
    pub fn get_outgoing(&self, node: &NodeRef) -> Result<Vec<Edge>> {
        let (id, kind) = Self::node_columns(node);
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT * FROM connections WHERE source_id = ?1 AND source_kind = ?2 AND strength > ?3
             ORDER BY strength DESC LIMIT ?4",
        )?;
        let rows = stmt.query_map(
            params![id, kind, STRENGTH_FLOOR, MAX_OUTGOING as i64],
            row_to_edge,
        )?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn get_edge(&self, source: &NodeRef, target: &NodeRef) -> Result<Option<Edge>> {
        let (source_id, source_kind) = Self::node_columns(source);
        let (target_id, target_kind) = Self::node_columns(target);
        self.reader()?
            .query_row(
                "SELECT * FROM connections WHERE source_id = ?1 AND source_kind = ?2 AND target_id = ?3 AND target_kind = ?4",
                params![source_id, source_kind, target_id, target_kind],
                row_to_edge,
            )
            .optional()
            .map_err(Into::into)
    }

    /// `connect_co_activated` (§4.D): upper-triangle product of edges
    /// between all pairs, type=semantic, via `strengthen`.
    pub fn connect_co_activated(&self, ids: &[NodeRef], base_alpha: f32) -> Result<usize> {
        let mut count = 0;
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                self.strengthen(&ids[i], &ids[j], base_alpha, ConnectionType::Semantic)?;
                self.strengthen(&ids[j], &ids[i], base_alpha, ConnectionType::Semantic)?;
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn connection_stats(&self) -> Result<ConnectionStats> {
        let reader = self.reader()?;
        let total: i64 = reader.query_row("SELECT COUNT(*) FROM connections", [], |r| r.get(0))?;

        let mut by_type = std::collections::HashMap::new();
        let mut stmt = reader.prepare("SELECT connection_type, COUNT(*) FROM connections GROUP BY connection_type")?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
        for row in rows {
            let (t, c) = row?;
            by_type.insert(t, c);
        }

        let strong_count: i64 =
            reader.query_row("SELECT COUNT(*) FROM connections WHERE strength >= 0.7", [], |r| r.get(0))?;
        let weak_count: i64 =
            reader.query_row("SELECT COUNT(*) FROM connections WHERE strength < 0.1", [], |r| r.get(0))?;
        let mean_strength: f32 = reader
            .query_row("SELECT AVG(strength) FROM connections", [], |r| r.get(0))
            .unwrap_or(0.0);

        Ok(ConnectionStats {
            total_connections: total,
            by_type,
            strong_count,
            weak_count,
            mean_strength,
        })
    }

    // ---------------------------------------------------------------
    // Logs (§4.E step 6, §4.F)
    // ---------------------------------------------------------------

    pub fn log_activation(
        &self,
        query_text: &str,
        query_embedding: Option<&[f32]>,
        activated_memory_ids: &[String],
        activated_concept_ids: &[String],
        agent: Option<&str>,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let bytes = query_embedding.map(embed_to_bytes);
        let memory_ids_json = serde_json::to_string(activated_memory_ids).unwrap_or_else(|_| "[]".into());
        let concept_ids_json = serde_json::to_string(activated_concept_ids).unwrap_or_else(|_| "[]".into());

        self.writer()?.execute(
            "INSERT INTO activation_log (id, query_text, query_embedding, activated_memory_ids, activated_concept_ids, agent, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![id, query_text, bytes, memory_ids_json, concept_ids_json, agent, now],
        )?;

        Ok(id)
    }

    /// Read back activation log entries since a cutoff — the substrate
    /// the dream pass's co-activation reinforcement phase reads (§4.F
    /// phase 3).
    pub fn activation_logs_since(&self, since: DateTime<Utc>) -> Result<Vec<ActivationLogEntry>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT activated_memory_ids, activated_concept_ids, created_at FROM activation_log WHERE created_at >= ?1",
        )?;
        let rows = stmt.query_map(params![since], |row| {
            let memory_ids_json: String = row.get(0)?;
            let concept_ids_json: String = row.get(1)?;
            Ok(ActivationLogEntry {
                activated_memory_ids: serde_json::from_str(&memory_ids_json).unwrap_or_default(),
                activated_concept_ids: serde_json::from_str(&concept_ids_json).unwrap_or_default(),
                created_at: row.get(2)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn activation_log_count(&self) -> Result<i64> {
        self.reader()?
            .query_row("SELECT COUNT(*) FROM activation_log", [], |r| r.get(0))
            .map_err(Into::into)
    }

    pub fn log_dream(
        &self,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        semantic_links_created: i64,
        episodic_bindings_created: i64,
        co_activation_reinforced: i64,
        pruned_count: i64,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.writer()?.execute(
            "INSERT INTO dream_log (id, started_at, finished_at, semantic_links_created, episodic_bindings_created, co_activation_reinforced, pruned_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![id, started_at, finished_at, semantic_links_created, episodic_bindings_created, co_activation_reinforced, pruned_count],
        )?;
        Ok(id)
    }

    // ---------------------------------------------------------------
    // Consolidation support (§4.F)
    // ---------------------------------------------------------------

    pub fn all_memories(&self) -> Result<Vec<MemoryRecord>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM memories")?;
        let rows = stmt.query_map([], row_to_memory)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn all_concepts(&self) -> Result<Vec<Concept>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM concepts")?;
        let rows = stmt.query_map([], row_to_concept)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn all_connections(&self) -> Result<Vec<Edge>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM connections")?;
        let rows = stmt.query_map([], row_to_edge)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Prune an edge entirely (dream pass pruning phase, §4.F).
    pub fn delete_connection(&self, source: &NodeRef, target: &NodeRef) -> Result<()> {
        let (source_id, source_kind) = Self::node_columns(source);
        let (target_id, target_kind) = Self::node_columns(target);
        self.writer()?.execute(
            "DELETE FROM connections WHERE source_id = ?1 AND source_kind = ?2 AND target_id = ?3 AND target_kind = ?4",
            params![source_id, source_kind, target_id, target_kind],
        )?;
        Ok(())
    }

    pub fn set_connection_strength(&self, source: &NodeRef, target: &NodeRef, strength: f32) -> Result<()> {
        let (source_id, source_kind) = Self::node_columns(source);
        let (target_id, target_kind) = Self::node_columns(target);
        self.writer()?.execute(
            "UPDATE connections SET strength = ?5 WHERE source_id = ?1 AND source_kind = ?2 AND target_id = ?3 AND target_kind = ?4",
            params![source_id, source_kind, target_id, target_kind, strength.clamp(0.0, 1.0)],
        )?;
        Ok(())
    }
}
