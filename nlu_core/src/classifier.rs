//! Intent classifier - scores the utterance against every intent's pattern groups

use indexmap::IndexMap;
use tracing::trace;

use crate::rules::RuleTable;
use crate::types::{IntentScore, SemanticAnalysis};

/// Classify text against the intent rules of a table
///
/// Each intent scores `matched_groups / total_groups * base_weight` on the
/// lowercased text. The best intent is the first one, in table order, with the
/// strictly greatest confidence.
pub fn classify(text: &str, rules: &RuleTable) -> SemanticAnalysis {
    let normalized = text.to_lowercase();

    let mut all_scores = IndexMap::new();
    let mut best_intent: Option<&str> = None;
    let mut best_confidence = 0.0;

    for rule in rules.intents() {
        let matched = rule
            .groups
            .iter()
            .filter(|group| group.is_match(&normalized))
            .count();
        if matched == 0 {
            continue;
        }

        let total = rule.groups.len();
        let confidence = (matched as f64 / total as f64) * rule.base_weight;
        trace!(intent = %rule.name, matched, total, confidence, "intent scored");

        if confidence > best_confidence {
            best_confidence = confidence;
            best_intent = Some(rule.name.as_str());
        }

        all_scores.insert(
            rule.name.clone(),
            IntentScore {
                intent: rule.name.clone(),
                matched_patterns: matched,
                total_patterns: total,
                confidence,
            },
        );
    }

    SemanticAnalysis {
        best_intent: best_intent.map(str::to_string),
        best_confidence,
        all_scores,
        source_text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ContextRuleSource, IntentRuleSource, RuleTableSource};

    fn table(intents: Vec<(&str, f64, Vec<Vec<&str>>)>) -> RuleTable {
        let source = RuleTableSource {
            intents: intents
                .into_iter()
                .map(|(name, weight, groups)| IntentRuleSource {
                    name: name.to_string(),
                    base_weight: weight,
                    groups: groups
                        .into_iter()
                        .map(|g| g.into_iter().map(String::from).collect())
                        .collect(),
                })
                .collect(),
            entities: Vec::new(),
            context: ContextRuleSource::default(),
        };
        RuleTable::compile(source).unwrap()
    }

    #[test]
    fn test_partial_match_scales_confidence() {
        let rules = table(vec![(
            "routes",
            0.8,
            vec![vec!["ruta"], vec!["origen"], vec!["destino"], vec!["\\?"]],
        )]);
        let analysis = classify("Ruta con origen en el norte", &rules);

        let score = &analysis.all_scores["routes"];
        assert_eq!(score.matched_patterns, 2);
        assert_eq!(score.total_patterns, 4);
        assert!((score.confidence - 0.4).abs() < 1e-9);
        assert_eq!(analysis.best_intent.as_deref(), Some("routes"));
    }

    #[test]
    fn test_tie_goes_to_earlier_intent() {
        let rules = table(vec![
            ("help", 0.9, vec![vec!["hola"]]),
            ("greeting", 0.9, vec![vec!["hola"]]),
        ]);
        let analysis = classify("hola", &rules);

        assert_eq!(analysis.best_intent.as_deref(), Some("help"));
        assert_eq!(analysis.all_scores.len(), 2);
    }

    #[test]
    fn test_no_match() {
        let analysis = classify("xyz123 qwerty", RuleTable::builtin());

        assert_eq!(analysis.best_intent, None);
        assert_eq!(analysis.best_confidence, 0.0);
        assert!(analysis.all_scores.is_empty());
        assert_eq!(analysis.source_text, "xyz123 qwerty");
    }

    #[test]
    fn test_empty_text() {
        let analysis = classify("", RuleTable::builtin());
        assert_eq!(analysis.best_intent, None);
        assert!(analysis.all_scores.is_empty());
    }

    #[test]
    fn test_greeting() {
        let analysis = classify("hola", RuleTable::builtin());

        assert_eq!(analysis.best_intent.as_deref(), Some("greeting"));
        assert!((analysis.best_confidence - 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_drivers_question() {
        let analysis = classify("¿Cuántos conductores activos hay?", RuleTable::builtin());

        assert_eq!(analysis.best_intent.as_deref(), Some("drivers"));
        assert!(analysis.best_confidence >= 0.6);
        // The question cue alone lifts other domain intents, but only partially.
        assert!(analysis.all_scores["vehicles"].confidence < analysis.best_confidence);
    }

    #[test]
    fn test_builtin_tie_prefers_drivers_over_expirations() {
        let analysis = classify("¿Qué conductores tienen la licencia vencida?", RuleTable::builtin());

        let drivers = analysis.all_scores["drivers"].confidence;
        let expirations = analysis.all_scores["expirations"].confidence;
        assert!((drivers - expirations).abs() < 1e-9);
        assert_eq!(analysis.best_intent.as_deref(), Some("drivers"));
    }

    #[test]
    fn test_best_confidence_is_max_of_scores() {
        for text in [
            "hola, ¿qué puedes hacer?",
            "vencimientos del soat",
            "¿y las rutas?",
            "viajes de hoy",
        ] {
            let analysis = classify(text, RuleTable::builtin());
            let max = analysis
                .all_scores
                .values()
                .map(|s| s.confidence)
                .fold(0.0, f64::max);
            assert_eq!(analysis.best_confidence, max, "{text}");
            assert!((0.0..=1.0).contains(&analysis.best_confidence));
        }
    }
}
