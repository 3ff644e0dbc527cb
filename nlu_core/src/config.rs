//! Pipeline configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_CONFIDENCE_GATE: f64 = 0.6;
pub const DEFAULT_CLARIFICATION: &str =
    "No estoy seguro de haber entendido tu consulta. ¿Podrías reformularla?";

/// Tunables for a pipeline. Immutable once the pipeline is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum confidence for a structured query; anything lower is unclear.
    pub confidence_gate: f64,

    /// Number of trailing assistant turns scanned for back-references.
    pub history_window: usize,

    /// Tokens must be strictly longer than this many characters to count.
    pub min_token_chars: usize,

    /// Length of the snippet attached to each back-reference.
    pub snippet_chars: usize,

    pub clarification_message: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_gate: DEFAULT_CONFIDENCE_GATE,
            history_window: 3,
            min_token_chars: 3,
            snippet_chars: 50,
            clarification_message: DEFAULT_CLARIFICATION.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_confidence_gate(mut self, gate: f64) -> Self {
        self.confidence_gate = gate;
        self
    }

    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns;
        self
    }

    pub fn with_clarification_message(mut self, message: impl Into<String>) -> Self {
        self.clarification_message = message.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(r#"{"history_window": 5}"#).unwrap();

        assert_eq!(config.history_window, 5);
        assert_eq!(config.confidence_gate, DEFAULT_CONFIDENCE_GATE);
        assert_eq!(config.snippet_chars, 50);
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::default()
            .with_confidence_gate(0.75)
            .with_clarification_message("¿Perdón?");

        assert_eq!(config.confidence_gate, 0.75);
        assert_eq!(config.clarification_message, "¿Perdón?");
    }
}
