//! Query composer - compiles classification, entities and context into a query descriptor

use tracing::debug;

use crate::config::PipelineConfig;
use crate::types::{
    Aggregation, ConversationContext, EntityBag, OrderBy, QueryDescriptor, RelationalScope,
    SemanticAnalysis, SortDirection, StatusFilter,
};

/// Collection used when an intent has no preset
pub const FALLBACK_COLLECTION: &str = "General";

/// Status code forced on driver queries that ask for active drivers
pub const ACTIVE_STATUS: &str = "ACTIVO";

/// Fixed retrieval shape for one intent
struct Preset {
    intent: &'static str,
    collection: &'static str,
    joins: &'static [&'static str],
    aggregations: &'static [Aggregation],
    default_date_range: Option<&'static str>,
    order_by: Option<(&'static str, SortDirection)>,
}

const PRESETS: &[Preset] = &[
    Preset {
        intent: "drivers",
        collection: "Conductores",
        joins: &["Usuarios", "Vehiculos"],
        aggregations: &[],
        default_date_range: None,
        order_by: None,
    },
    Preset {
        intent: "vehicles",
        collection: "Vehiculos",
        joins: &["Conductores", "Empresas"],
        aggregations: &[],
        default_date_range: None,
        order_by: None,
    },
    Preset {
        intent: "routes",
        collection: "Rutas",
        joins: &["Viajes", "Empresas"],
        aggregations: &[],
        default_date_range: None,
        order_by: None,
    },
    Preset {
        intent: "schedules",
        collection: "Viajes",
        joins: &["Vehiculos", "Conductores", "Rutas"],
        aggregations: &[],
        default_date_range: Some("today"),
        order_by: Some(("horaSalida", SortDirection::Asc)),
    },
    Preset {
        intent: "expirations",
        collection: "Vencimientos",
        joins: &[],
        aggregations: &[Aggregation::Count, Aggregation::GroupBy],
        default_date_range: Some("next_30_days"),
        order_by: Some(("fechaVencimiento", SortDirection::Asc)),
    },
    Preset {
        intent: "companies",
        collection: "Empresas",
        joins: &["Vehiculos", "Conductores"],
        aggregations: &[],
        default_date_range: None,
        order_by: None,
    },
];

fn preset(intent: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.intent == intent)
}

fn is_active_marker(word: &str) -> bool {
    word.to_lowercase().starts_with("activ")
}

/// Compose a query descriptor
///
/// Pure over its inputs: the same analysis, entities and context always give
/// the same descriptor.
pub fn compose(
    analysis: &SemanticAnalysis,
    entities: &EntityBag,
    context: &ConversationContext,
    config: &PipelineConfig,
) -> QueryDescriptor {
    let intent = match &analysis.best_intent {
        Some(intent) if analysis.best_confidence >= config.confidence_gate => intent,
        _ => {
            debug!(
                confidence = analysis.best_confidence,
                "below confidence gate, asking for clarification"
            );
            return QueryDescriptor::unclear(
                analysis.best_intent.clone(),
                analysis.best_confidence,
                config.clarification_message.as_str(),
            );
        }
    };

    let mut query = QueryDescriptor::structured(intent.clone(), analysis.best_confidence);

    if !entities.dates.is_empty() {
        query.filters.date_range = Some(entities.dates.clone());
    }
    if !entities.status_words.is_empty() {
        query.filters.status = Some(StatusFilter::Words(entities.status_words.clone()));
    }
    if !entities.numbers.is_empty() {
        query.filters.numeric_filters = Some(entities.numbers.clone());
    }

    match preset(intent) {
        Some(preset) => {
            query.target_collection = Some(preset.collection.to_string());
            query.join_collections = preset.joins.iter().map(|j| j.to_string()).collect();
            query.aggregations = preset.aggregations.to_vec();
            query.order_by = preset.order_by.map(|(field, direction)| OrderBy {
                field: field.to_string(),
                direction,
            });

            if let Some(default_range) = preset.default_date_range {
                if query.filters.date_range.is_none() {
                    query.filters.date_range = Some(vec![default_range.to_string()]);
                }
            }

            if preset.intent == "drivers"
                && entities.status_words.iter().any(|w| is_active_marker(w))
            {
                query.filters.status = Some(StatusFilter::Code(ACTIVE_STATUS.to_string()));
            }
        }
        None => {
            query.target_collection = Some(FALLBACK_COLLECTION.to_string());
        }
    }

    if context.relational_scope == RelationalScope::CompanyScope {
        query.filters.company_scope = true;
    }

    debug!(
        intent = %intent,
        collection = query.target_collection.as_deref().unwrap_or_default(),
        "composed structured query"
    );
    query
}
