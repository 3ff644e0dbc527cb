//! Pipeline - sequences classification, extraction, context and composition
//!
//! A pipeline holds nothing but an immutable rule table and configuration, so
//! one instance can be shared across threads and called concurrently.

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::classifier::classify;
use crate::composer::compose;
use crate::config::PipelineConfig;
use crate::context::resolve_context;
use crate::entities::EntityExtractor;
use crate::error::{NluError, Result};
use crate::rules::RuleTable;
use crate::types::{json_kind, HistoryEntry, ResultBundle, SemanticAnalysis, Utterance};

#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    rules: &'a RuleTable,
    config: PipelineConfig,
}

impl Default for Pipeline<'static> {
    fn default() -> Self {
        Self::new(RuleTable::builtin(), PipelineConfig::default())
    }
}

impl<'a> Pipeline<'a> {
    pub fn new(rules: &'a RuleTable, config: PipelineConfig) -> Self {
        Self { rules, config }
    }

    pub fn rules(&self) -> &RuleTable {
        self.rules
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Classify only, without extraction or composition
    pub fn classify(&self, text: &str) -> SemanticAnalysis {
        classify(text, self.rules)
    }

    /// Run the full pipeline over one utterance and its history
    pub fn process(&self, text: &str, history: &[HistoryEntry]) -> ResultBundle {
        self.run(Utterance::new(text), history)
    }

    /// Run the pipeline over an untyped request of the form
    /// `{"text": "...", "history": [{"speaker": "assistant", "text": "..."}]}`.
    ///
    /// Fails with [`NluError::MalformedInput`] when `text` is missing or not a
    /// string, or when the history is not a list of turns.
    pub fn process_request(&self, request: &Value) -> Result<ResultBundle> {
        let Value::Object(fields) = request else {
            return Err(NluError::MalformedInput(format!(
                "request must be an object, got {}",
                json_kind(request)
            )));
        };

        let utterance = Utterance::from_value(fields.get("text").unwrap_or(&Value::Null))?;
        let history: Vec<HistoryEntry> = match fields.get("history") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| NluError::MalformedInput(format!("invalid history: {e}")))?,
        };

        Ok(self.run(utterance, &history))
    }

    fn run(&self, utterance: Utterance, history: &[HistoryEntry]) -> ResultBundle {
        let text = utterance.text.as_str();
        let semantic_analysis = classify(text, self.rules);
        let entity_bag = EntityExtractor::new(self.rules).extract(text);
        let conversation_context = resolve_context(text, history, self.rules, &self.config);
        let query_descriptor = compose(
            &semantic_analysis,
            &entity_bag,
            &conversation_context,
            &self.config,
        );

        debug!(
            intent = semantic_analysis.best_intent.as_deref().unwrap_or("none"),
            confidence = semantic_analysis.best_confidence,
            kind = ?query_descriptor.kind,
            entities = entity_bag.len(),
            follow_up = conversation_context.is_follow_up,
            "processed utterance"
        );

        ResultBundle {
            utterance,
            semantic_analysis,
            entity_bag,
            conversation_context,
            query_descriptor,
            produced_at: Utc::now(),
        }
    }
}

/// Process with the built-in rules and default configuration
pub fn process(text: &str, history: &[HistoryEntry]) -> ResultBundle {
    Pipeline::default().process(text, history)
}
