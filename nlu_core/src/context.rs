//! Conversation context - follow-up detection, back-references and scopes

use tracing::trace;

use crate::config::PipelineConfig;
use crate::rules::RuleTable;
use crate::types::{
    BackReference, ConversationContext, HistoryEntry, RelationalScope, Speaker, TemporalScope,
};

/// Resolve how `text` relates to the trailing conversation history
pub fn resolve_context(
    text: &str,
    history: &[HistoryEntry],
    rules: &RuleTable,
    config: &PipelineConfig,
) -> ConversationContext {
    let normalized = text.to_lowercase();
    let markers = rules.context();

    let temporal_scope = if markers.single_day.is_match(&normalized) {
        TemporalScope::SpecificDate
    } else if markers.period.is_match(&normalized) {
        TemporalScope::CurrentPeriod
    } else {
        TemporalScope::None
    };

    let relational_scope = if markers.company_scope.is_match(&normalized) {
        RelationalScope::CompanyScope
    } else if markers.user_scope.is_match(&normalized) {
        RelationalScope::UserScope
    } else {
        RelationalScope::None
    };

    ConversationContext {
        is_follow_up: markers.follow_up.is_match(&normalized),
        back_references: find_back_references(&normalized, history, config),
        temporal_scope,
        relational_scope,
    }
}

/// Words from the last few assistant turns that reappear in the utterance.
/// Oldest turn first, then token position within the turn.
fn find_back_references(
    normalized: &str,
    history: &[HistoryEntry],
    config: &PipelineConfig,
) -> Vec<BackReference> {
    let mut recent: Vec<(usize, &HistoryEntry)> = history
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, entry)| entry.speaker == Speaker::Assistant)
        .take(config.history_window)
        .collect();
    recent.reverse();

    let mut references = Vec::new();
    for (source_index, entry) in recent {
        for raw in entry.text.split_whitespace() {
            let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
            if token.chars().count() <= config.min_token_chars {
                continue;
            }
            if normalized.contains(&token.to_lowercase()) {
                trace!(token, source_index, "back-reference");
                references.push(BackReference {
                    token: token.to_string(),
                    source_index,
                    snippet: entry.text.chars().take(config.snippet_chars).collect(),
                });
            }
        }
    }

    references
}
