//! Deterministic entity and relation extraction (§4.C).
//!
//! Five extraction passes run independently and concatenate: files,
//! errors, tools, solutions, concepts. No ML involved — everything here
//! is a regex or a vocabulary lookup, which keeps extraction a pure,
//! reproducible function of the input text.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::memory::EntityType;

/// One pass's raw hit before dedup: text, type, salience, and the byte
/// offset it was found at (needed for the `solved(solution, error)`
/// positional scan).
struct Hit {
    text: String,
    entity_type: EntityType,
    salience: f32,
    position: usize,
}

fn file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b[\w./-]+\.(rs|ts|tsx|js|jsx|py|sql|go|rb|java|c|cpp|h|hpp|toml|yaml|yml|json|md)\b").unwrap()
    })
}

fn error_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Z][A-Za-z0-9]*(?:Error|Exception|Fault|Panic)|E\d{3,5}|HTTP \d{3})\b").unwrap()
    })
}

fn solution_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:solution|fix|resolved by)\s*:\s*([^.\n]+)").unwrap()
    })
}

fn concept_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["“]([A-Z][a-zA-Z]*(?:\s[A-Z][a-zA-Z]*)*)["”]"#).unwrap())
}

/// Curated tool vocabulary, looked up case-insensitively.
fn tool_vocabulary() -> &'static [&'static str] {
    &[
        "rust", "python", "typescript", "javascript", "react", "postgresql", "sqlite", "docker",
        "kubernetes", "cargo", "npm", "webpack", "vite", "tokio", "rusqlite", "fastembed",
        "git", "github", "terraform", "redis", "graphql", "nginx",
    ]
}

/// Extension -> canonical tool name, used by the `uses(file, tool)`
/// relation inference (§4.C).
fn extension_tool_map() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| {
        HashMap::from([
            ("ts", "typescript"),
            ("tsx", "react"),
            ("sql", "postgresql"),
            ("py", "python"),
            ("rs", "rust"),
        ])
    })
}

fn extract_files(text: &str, hits: &mut Vec<Hit>) {
    for m in file_regex().find_iter(text) {
        hits.push(Hit {
            text: m.as_str().to_string(),
            entity_type: EntityType::File,
            salience: EntityType::File.default_salience(),
            position: m.start(),
        });
    }
}

fn extract_errors(text: &str, hits: &mut Vec<Hit>) {
    for m in error_regex().find_iter(text) {
        let matched = m.as_str();
        let salience = if matched.chars().next().is_some_and(|c| c.is_ascii_digit() || matched.starts_with("HTTP")) {
            0.75
        } else {
            0.8
        };
        hits.push(Hit {
            text: matched.to_string(),
            entity_type: EntityType::Error,
            salience,
            position: m.start(),
        });
    }
}

fn extract_tools(text: &str, hits: &mut Vec<Hit>) {
    let lower = text.to_lowercase();
    for tool in tool_vocabulary() {
        if let Some(pos) = lower.find(tool) {
            hits.push(Hit {
                text: (*tool).to_string(),
                entity_type: EntityType::Tool,
                salience: EntityType::Tool.default_salience(),
                position: pos,
            });
        }
    }
}

fn extract_solutions(text: &str, hits: &mut Vec<Hit>) {
    for cap in solution_regex().captures_iter(text) {
        let m = cap.get(1).unwrap();
        hits.push(Hit {
            text: m.as_str().trim().to_string(),
            entity_type: EntityType::Solution,
            salience: EntityType::Solution.default_salience(),
            position: m.start(),
        });
    }
}

/// First "solution:"/"fix:"/"resolved by:" fragment in `text`, if any —
/// used by the write pipeline's content compression step (§4.G step 2),
/// which keeps the earliest solution sentence regardless of salience
/// ranking.
pub fn first_solution_fragment(text: &str) -> Option<String> {
    solution_regex()
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn extract_concepts(text: &str, hits: &mut Vec<Hit>) {
    for cap in concept_regex().captures_iter(text) {
        let m = cap.get(1).unwrap();
        hits.push(Hit {
            text: m.as_str().to_string(),
            entity_type: EntityType::Concept,
            salience: EntityType::Concept.default_salience(),
            position: m.start(),
        });
    }
}

/// One entity surfaced by extraction, before it has a memory/storage
/// identity assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedEntity {
    pub text: String,
    pub entity_type: EntityType,
    pub salience: f32,
    pub position: usize,
}

/// One relation inferred between two already-extracted entities, keyed
/// by their text (storage assigns real entity ids after persisting).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRelation {
    pub subject_text: String,
    pub predicate: &'static str,
    pub object_text: String,
    pub confidence: f32,
}

/// Top-N cap on entities returned per text (§4.C).
pub const MAX_ENTITIES: usize = 20;

/// `extract(text) -> (entities, relations)` (§4.C). Pure and
/// deterministic: same text always yields the same output.
pub fn extract(text: &str) -> (Vec<ExtractedEntity>, Vec<ExtractedRelation>) {
    let mut hits = Vec::new();
    extract_files(text, &mut hits);
    extract_errors(text, &mut hits);
    extract_tools(text, &mut hits);
    extract_solutions(text, &mut hits);
    extract_concepts(text, &mut hits);

    // Dedup: lowercase text as key, keep the highest-salience occurrence.
    let mut by_key: HashMap<String, Hit> = HashMap::new();
    for hit in hits {
        let key = hit.text.to_lowercase();
        by_key
            .entry(key)
            .and_modify(|existing| {
                if hit.salience > existing.salience {
                    *existing = Hit {
                        text: hit.text.clone(),
                        entity_type: hit.entity_type,
                        salience: hit.salience,
                        position: hit.position,
                    };
                }
            })
            .or_insert(hit);
    }

    let mut entities: Vec<ExtractedEntity> = by_key
        .into_values()
        .map(|h| ExtractedEntity {
            text: h.text,
            entity_type: h.entity_type,
            salience: h.salience,
            position: h.position,
        })
        .collect();

    entities.sort_by(|a, b| b.salience.partial_cmp(&a.salience).unwrap_or(std::cmp::Ordering::Equal));
    entities.truncate(MAX_ENTITIES);

    let relations = infer_relations(&entities);

    (entities, relations)
}

fn infer_relations(entities: &[ExtractedEntity]) -> Vec<ExtractedRelation> {
    let mut relations = Vec::new();

    // solved(solution, error): bind each error to the earliest solution
    // occurring after it in the text.
    let mut solutions: Vec<&ExtractedEntity> = entities
        .iter()
        .filter(|e| e.entity_type == EntityType::Solution)
        .collect();
    solutions.sort_by_key(|e| e.position);

    for error in entities.iter().filter(|e| e.entity_type == EntityType::Error) {
        if let Some(solution) = solutions.iter().find(|s| s.position > error.position) {
            relations.push(ExtractedRelation {
                subject_text: solution.text.clone(),
                predicate: "solved",
                object_text: error.text.clone(),
                confidence: 0.7,
            });
        }
    }

    // uses(file, tool): map file extension to a canonical tool; emit only
    // if that tool was also extracted.
    let extracted_tools: std::collections::HashSet<String> = entities
        .iter()
        .filter(|e| e.entity_type == EntityType::Tool)
        .map(|e| e.text.to_lowercase())
        .collect();

    for file in entities.iter().filter(|e| e.entity_type == EntityType::File) {
        if let Some(ext) = file.text.rsplit('.').next() {
            if let Some(tool) = extension_tool_map().get(ext.to_lowercase().as_str()) {
                if extracted_tools.contains(*tool) {
                    relations.push(ExtractedRelation {
                        subject_text: file.text.clone(),
                        predicate: "uses",
                        object_text: (*tool).to_string(),
                        confidence: 0.9,
                    });
                }
            }
        }
    }

    relations
}
