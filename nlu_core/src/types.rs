//! Core data types for pipeline results

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{NluError, Result};

/// A single user utterance as received from the chat layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            received_at: Utc::now(),
        }
    }

    /// Build an utterance from an untyped value, rejecting anything that is not a string.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(text) => Ok(Self::new(text.as_str())),
            serde_json::Value::Null => Err(NluError::MalformedInput(
                "text is null".to_string(),
            )),
            other => Err(NluError::MalformedInput(format!(
                "text must be a string, got {}",
                json_kind(other)
            ))),
        }
    }
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Who authored a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// A prior turn supplied by the caller, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

/// Score of one intent that matched at least one pattern group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentScore {
    pub intent: String,
    pub matched_patterns: usize,
    pub total_patterns: usize,
    pub confidence: f64,
}

/// Output of the intent classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticAnalysis {
    pub best_intent: Option<String>,
    pub best_confidence: f64,
    /// Every intent with a match, in rule-table order.
    pub all_scores: IndexMap<String, IntentScore>,
    pub source_text: String,
}

impl SemanticAnalysis {
    /// Scores sorted by confidence, highest first. Ties keep table order.
    pub fn ranked(&self) -> Vec<&IntentScore> {
        let mut scores: Vec<&IntentScore> = self.all_scores.values().collect();
        scores.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scores
    }
}

/// Entity classes recognised by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    Dates,
    Numbers,
    ProperNames,
    Locations,
    StatusWords,
    CategoryWords,
}

/// Extracted fragments, verbatim and in encounter order. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBag {
    pub dates: Vec<String>,
    pub numbers: Vec<String>,
    pub proper_names: Vec<String>,
    pub locations: Vec<String>,
    pub status_words: Vec<String>,
    pub category_words: Vec<String>,
}

impl EntityBag {
    pub fn get(&self, class: EntityClass) -> &[String] {
        match class {
            EntityClass::Dates => &self.dates,
            EntityClass::Numbers => &self.numbers,
            EntityClass::ProperNames => &self.proper_names,
            EntityClass::Locations => &self.locations,
            EntityClass::StatusWords => &self.status_words,
            EntityClass::CategoryWords => &self.category_words,
        }
    }

    pub(crate) fn get_mut(&mut self, class: EntityClass) -> &mut Vec<String> {
        match class {
            EntityClass::Dates => &mut self.dates,
            EntityClass::Numbers => &mut self.numbers,
            EntityClass::ProperNames => &mut self.proper_names,
            EntityClass::Locations => &mut self.locations,
            EntityClass::StatusWords => &mut self.status_words,
            EntityClass::CategoryWords => &mut self.category_words,
        }
    }

    /// Total number of extracted fragments across all classes
    pub fn len(&self) -> usize {
        self.dates.len()
            + self.numbers.len()
            + self.proper_names.len()
            + self.locations.len()
            + self.status_words.len()
            + self.category_words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A word from a recent assistant turn that reappears in the utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackReference {
    pub token: String,
    /// Index into the caller's history sequence.
    pub source_index: usize,
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemporalScope {
    #[default]
    None,
    SpecificDate,
    CurrentPeriod,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationalScope {
    #[default]
    None,
    CompanyScope,
    UserScope,
}

/// How the utterance relates to the preceding conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    pub is_follow_up: bool,
    pub back_references: Vec<BackReference>,
    pub temporal_scope: TemporalScope,
    pub relational_scope: RelationalScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Structured,
    Unclear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Aggregation {
    Count,
    GroupBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// Status filter: either the extracted words or a fixed status code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusFilter {
    Code(String),
    Words(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_filters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub company_scope: bool,
}

/// Declarative description of the data an utterance asks for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub kind: QueryKind,
    pub intent: Option<String>,
    pub confidence: f64,
    pub target_collection: Option<String>,
    pub join_collections: Vec<String>,
    pub filters: QueryFilters,
    pub aggregations: Vec<Aggregation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification_message: Option<String>,
}

impl QueryDescriptor {
    pub fn unclear(intent: Option<String>, confidence: f64, message: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::Unclear,
            intent,
            confidence,
            target_collection: None,
            join_collections: Vec::new(),
            filters: QueryFilters::default(),
            aggregations: Vec::new(),
            order_by: None,
            limit: None,
            clarification_message: Some(message.into()),
        }
    }

    pub fn structured(intent: String, confidence: f64) -> Self {
        Self {
            kind: QueryKind::Structured,
            intent: Some(intent),
            confidence,
            target_collection: None,
            join_collections: Vec::new(),
            filters: QueryFilters::default(),
            aggregations: Vec::new(),
            order_by: None,
            limit: None,
            clarification_message: None,
        }
    }

    pub fn is_unclear(&self) -> bool {
        self.kind == QueryKind::Unclear
    }
}

/// Everything produced for one call, owned by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBundle {
    pub utterance: Utterance,
    pub semantic_analysis: SemanticAnalysis,
    pub entity_bag: EntityBag,
    pub conversation_context: ConversationContext,
    pub query_descriptor: QueryDescriptor,
    pub produced_at: DateTime<Utc>,
}
