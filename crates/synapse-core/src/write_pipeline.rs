//! Write pipeline (§4.G) — sits in front of the memory store and
//! connection graph. Computes salience, compresses long content, embeds,
//! scores surprise against recent memories, extracts keywords, inserts
//! the record, then fans out to entity/relation extraction.

use std::collections::HashSet;

use chrono::Utc;

use crate::config::WriteConfig;
use crate::embeddings::{cosine_similarity, EmbeddingGateway};
use crate::error::Result;
use crate::extraction::{self, ExtractedRelation};
use crate::memory::{MemoryContext, MemoryType};
use crate::storage::{NewMemory, Storage};

/// Effort the producer reports expending to reach this memory — feeds
/// `base_salience` (§4.G step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffortLevel {
    High,
    Medium,
    Low,
}

/// Signals the caller supplies alongside content; all optional, each
/// contributing an additive bump to `base_salience` (§4.G step 1).
#[derive(Debug, Clone, Default)]
pub struct SalienceSignals {
    pub was_user_corrected: bool,
    pub was_surprising: bool,
    pub error_recovered: bool,
    pub effort_level: Option<EffortLevel>,
}

pub struct WriteRequest {
    pub content: String,
    pub trigger_situation: String,
    pub resolution: Option<String>,
    pub memory_type: MemoryType,
    pub salience_signals: SalienceSignals,
    pub source_agent: String,
}

#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub memory_id: String,
    pub was_compressed: bool,
    pub surprise_score: f32,
    pub entity_count: usize,
}

fn base_salience(signals: &SalienceSignals, config: &WriteConfig) -> f32 {
    let mut salience = config.base_salience;
    if signals.was_user_corrected {
        salience += config.corrected_weight;
    }
    if signals.was_surprising {
        salience += config.surprising_weight;
    }
    if signals.error_recovered {
        salience += config.error_recovered_weight;
    }
    match signals.effort_level {
        Some(EffortLevel::High) => salience += config.effort_high_weight,
        Some(EffortLevel::Medium) => salience += config.effort_medium_weight,
        Some(EffortLevel::Low) | None => {}
    }
    salience.clamp(0.0, 1.0)
}

/// First sentence (up to the first `.`/`!`/`?`) plus the first
/// solution-pattern fragment, joined — the compression step's summary
/// (§4.G step 2).
fn compress(content: &str) -> String {
    let first_sentence = content
        .split_inclusive(['.', '!', '?'])
        .next()
        .unwrap_or(content)
        .trim()
        .to_string();

    match extraction::first_solution_fragment(content) {
        Some(fragment) if !first_sentence.contains(fragment.as_str()) => {
            format!("{first_sentence} Solution: {fragment}.")
        }
        _ => first_sentence,
    }
}

fn extract_keywords(text: &str, config: &WriteConfig) -> Vec<String> {
    const STOPWORDS: &[&str] = &[
        "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
        "can", "need", "dare", "ought", "used", "to", "of", "in", "for", "on", "with", "at", "by",
        "from", "as", "into", "through", "during", "before", "after", "above", "below", "between",
        "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
        "how", "all", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
        "only", "own", "same", "so", "than", "too", "very", "just", "and", "but", "if", "or",
        "because", "until", "while", "this", "that", "these", "those", "it",
    ];
    let stopwords: HashSet<&str> = STOPWORDS.iter().copied().collect();

    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for word in text.split_whitespace() {
        let cleaned = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
        if cleaned.len() < config.min_keyword_len || stopwords.contains(cleaned.as_str()) {
            continue;
        }
        if seen.insert(cleaned.clone()) {
            keywords.push(cleaned);
        }
        if keywords.len() >= config.max_keywords {
            break;
        }
    }

    keywords
}

/// Run the write pipeline end to end (§4.G steps 1-8).
pub fn write(
    storage: &Storage,
    gateway: &dyn EmbeddingGateway,
    request: WriteRequest,
    config: &WriteConfig,
) -> Result<WriteOutcome> {
    // Step 1: base salience from signals.
    let mut salience = base_salience(&request.salience_signals, config);

    // Step 2: compress content over the configured ceiling.
    let was_compressed = request.content.len() > config.max_content_length;
    let (stored_content, summary, mut context) = if was_compressed {
        let summary = compress(&request.content);
        let mut ctx: MemoryContext = MemoryContext::new();
        ctx.insert(
            "original_length".to_string(),
            serde_json::Value::from(request.content.len()),
        );
        ctx.insert("was_compressed".to_string(), serde_json::Value::from(true));
        (request.content.clone(), Some(summary), ctx)
    } else {
        (request.content.clone(), None, MemoryContext::new())
    };

    // Step 3: embed trigger + (possibly compressed) content.
    let embed_input = format!(
        "{}\n{}",
        request.trigger_situation,
        summary.as_deref().unwrap_or(&stored_content)
    );
    let embedding = gateway.embed(&embed_input)?;

    // Step 4: surprise score against up to 5 most recent memories.
    let recent = storage.list_recent(5)?;
    let surprise_score = if recent.is_empty() {
        0.5
    } else {
        let embedded_recent = storage.embedded_memories()?;
        let similarities: Vec<f32> = recent
            .iter()
            .filter_map(|r| {
                embedded_recent
                    .iter()
                    .find(|(record, _)| record.id == r.id)
                    .map(|(_, vec)| cosine_similarity(&embedding, vec))
            })
            .collect();

        if similarities.is_empty() {
            0.5
        } else {
            let mean_cosine = similarities.iter().sum::<f32>() / similarities.len() as f32;
            (1.0 - mean_cosine).max(0.0)
        }
    };

    // Step 5: adjust salience for high surprise.
    if surprise_score >= config.surprise_threshold {
        salience = (salience * (1.0 + surprise_score * config.surprise_boost_factor)).min(1.0);
    }
    context.insert(
        "surprise_score".to_string(),
        serde_json::Value::from(surprise_score),
    );
    context.insert(
        "storage_method".to_string(),
        serde_json::Value::from("write_pipeline"),
    );

    // Step 6: keyword extraction.
    let keywords = extract_keywords(&embed_input, config);

    // Step 7: insert the memory record.
    let memory_id = storage.insert_memory(NewMemory {
        content: stored_content,
        summary,
        trigger_situation: request.trigger_situation,
        resolution: request.resolution,
        memory_type: request.memory_type,
        source_agent: request.source_agent,
        keywords,
        salience_score: salience,
        context,
        embedding: Some(embedding),
    })?;

    // Step 8: extract entities and relations, persist with valid_from =
    // now, relation_status = active. Duplicate-insert rule: on conflict
    // do nothing — handled by `get_or_create_concept`/relation
    // supersession rather than a raw unique-constraint skip, since
    // entities aren't globally unique the way concepts are.
    let (entities, relations) = extraction::extract(&request.content);
    let entity_count = entities.len();

    let mut stored_entities = Vec::with_capacity(entities.len());
    for entity in &entities {
        let stored = storage.insert_entity(&memory_id, &entity.text, entity.entity_type, entity.salience)?;
        stored_entities.push(stored);
    }

    let now = Utc::now();
    for relation in &relations {
        persist_relation(storage, &memory_id, relation, &stored_entities, now)?;
    }

    Ok(WriteOutcome {
        memory_id,
        was_compressed,
        surprise_score,
        entity_count,
    })
}

/// Lexical cues that a response diverges from the expectation set by its
/// context — distinct from the cosine-based surprise scoring `write` uses
/// against recent memories, since here there is no memory history yet to
/// compare against, only the two turns of the exchange.
const SURPRISE_KEYWORDS: &[&str] = &[
    "actually",
    "turns out",
    "however",
    "unexpectedly",
    "surprisingly",
    "contrary to",
    "in fact",
    "mistaken",
    "corrected",
    "wait,",
];

/// Outcome-word pairs whose presence on opposite sides of a context/response
/// exchange signals a contradiction (§4.G surprise auto-save, scenario S4).
const CONTRADICTION_PAIRS: &[(&str, &str)] = &[
    ("succeeded", "failed"),
    ("passed", "failed"),
    ("worked", "broken"),
    ("fixed", "broke"),
    ("enabled", "disabled"),
    ("true", "false"),
    ("safe", "vulnerable"),
];

/// Result of scanning a context/response exchange for surprise cues.
#[derive(Debug, Clone, Default)]
pub struct SurpriseDetection {
    pub surprise_score: f32,
    pub keywords_found: Vec<String>,
    pub contradictions: Vec<(String, String)>,
}

/// Scan `context`/`response` for surprise keywords and outcome
/// contradictions, scoring each independently: base 0.5, +0.25 for any
/// keyword hit, +0.25 for any contradiction, clamped to 1.
pub fn detect_surprise(context: &str, response: &str) -> SurpriseDetection {
    let context_lower = context.to_lowercase();
    let response_lower = response.to_lowercase();

    let keywords_found: Vec<String> = SURPRISE_KEYWORDS
        .iter()
        .filter(|k| response_lower.contains(*k))
        .map(|k| k.to_string())
        .collect();

    let contradictions: Vec<(String, String)> = CONTRADICTION_PAIRS
        .iter()
        .filter_map(|(a, b)| {
            if context_lower.contains(a) && response_lower.contains(b) {
                Some((a.to_string(), b.to_string()))
            } else if context_lower.contains(b) && response_lower.contains(a) {
                Some((b.to_string(), a.to_string()))
            } else {
                None
            }
        })
        .collect();

    let mut score: f32 = 0.5;
    if !keywords_found.is_empty() {
        score += 0.25;
    }
    if !contradictions.is_empty() {
        score += 0.25;
    }

    SurpriseDetection {
        surprise_score: score.min(1.0),
        keywords_found,
        contradictions,
    }
}

/// Outcome of a surprise auto-save attempt (§4.G scenario S4).
#[derive(Debug, Clone)]
pub struct AutoSaveOutcome {
    pub surprise_score: f32,
    pub was_stored: bool,
    pub memory_id: Option<String>,
}

/// Detect surprise in a context/response exchange and, when `auto_save`
/// is set and the score clears `config.surprise_threshold`, store it as
/// an episodic memory stamped `storage_method = "auto"`,
/// `surprise_detected = true`. With `auto_save = false`, or a score below
/// threshold, no write occurs and only the score is reported.
pub fn auto_save_on_surprise(
    storage: &Storage,
    gateway: &dyn EmbeddingGateway,
    context: &str,
    response: &str,
    source_agent: String,
    auto_save: bool,
    config: &WriteConfig,
) -> Result<AutoSaveOutcome> {
    let detection = detect_surprise(context, response);

    if !auto_save || detection.surprise_score < config.surprise_threshold {
        return Ok(AutoSaveOutcome {
            surprise_score: detection.surprise_score,
            was_stored: false,
            memory_id: None,
        });
    }

    let mut signals = SalienceSignals::default();
    signals.was_surprising = true;
    let salience = (base_salience(&signals, config)
        * (1.0 + detection.surprise_score * config.surprise_boost_factor))
        .min(1.0);

    let embed_input = format!("{context}\n{response}");
    let embedding = gateway.embed(&embed_input)?;
    let keywords = extract_keywords(&embed_input, config);

    let mut ctx = MemoryContext::new();
    ctx.insert("storage_method".to_string(), serde_json::Value::from("auto"));
    ctx.insert("surprise_detected".to_string(), serde_json::Value::from(true));
    ctx.insert(
        "surprise_score".to_string(),
        serde_json::Value::from(detection.surprise_score),
    );

    let memory_id = storage.insert_memory(NewMemory {
        content: response.to_string(),
        summary: None,
        trigger_situation: context.to_string(),
        resolution: None,
        memory_type: MemoryType::Episodic,
        source_agent,
        keywords,
        salience_score: salience,
        context: ctx,
        embedding: Some(embedding),
    })?;

    let (entities, relations) = extraction::extract(response);
    let mut stored_entities = Vec::with_capacity(entities.len());
    for entity in &entities {
        let stored = storage.insert_entity(&memory_id, &entity.text, entity.entity_type, entity.salience)?;
        stored_entities.push(stored);
    }

    let now = Utc::now();
    for relation in &relations {
        persist_relation(storage, &memory_id, relation, &stored_entities, now)?;
    }

    Ok(AutoSaveOutcome {
        surprise_score: detection.surprise_score,
        was_stored: true,
        memory_id: Some(memory_id),
    })
}

fn persist_relation(
    storage: &Storage,
    memory_id: &str,
    relation: &ExtractedRelation,
    stored_entities: &[crate::memory::Entity],
    now: chrono::DateTime<Utc>,
) -> Result<()> {
    let subject = stored_entities.iter().find(|e| e.entity_text == relation.subject_text);
    let object = stored_entities.iter().find(|e| e.entity_text == relation.object_text);

    if let (Some(subject), Some(object)) = (subject, object) {
        storage.insert_relation(
            memory_id,
            &subject.id,
            relation.predicate,
            &object.id,
            relation.confidence,
            now,
        )?;
    }

    Ok(())
}
