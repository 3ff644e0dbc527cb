//! Rule table - ordered, authored vocabulary for classification and extraction
//!
//! The table is loaded from JSON and compiled once. Intent declaration order
//! is significant: on equal confidence the earlier intent wins, so intents are
//! kept in a `Vec` and only indexed by name on the side.

use std::sync::LazyLock;

use ahash::AHashMap;
use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NluError, Result};
use crate::types::EntityClass;

const BUILTIN_RULES: &str = include_str!("../rules/fleet_es.json");

static BUILTIN: LazyLock<RuleTable> = LazyLock::new(|| {
    RuleTable::from_json(BUILTIN_RULES).expect("built-in rule table must compile")
});

/// Serialized form of the rule table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTableSource {
    pub intents: Vec<IntentRuleSource>,
    #[serde(default)]
    pub entities: Vec<EntityRuleSource>,
    #[serde(default)]
    pub context: ContextRuleSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRuleSource {
    pub name: String,
    pub base_weight: f64,
    /// Each group is a list of alternatives; a group matches if any alternative does.
    pub groups: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRuleSource {
    pub class: EntityClass,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextRuleSource {
    #[serde(default)]
    pub follow_up: Vec<String>,
    #[serde(default)]
    pub single_day: Vec<String>,
    #[serde(default)]
    pub period: Vec<String>,
    #[serde(default)]
    pub company_scope: Vec<String>,
    #[serde(default)]
    pub user_scope: Vec<String>,
}

/// A compiled intent rule
#[derive(Debug, Clone)]
pub struct IntentRule {
    pub name: String,
    pub base_weight: f64,
    pub groups: Vec<RegexSet>,
}

/// A compiled entity rule
#[derive(Debug, Clone)]
pub struct EntityRule {
    pub class: EntityClass,
    pub patterns: Vec<Regex>,
}

/// Compiled marker sets used by the context resolver. Matched against lowercased text.
#[derive(Debug, Clone)]
pub struct ContextRules {
    pub follow_up: RegexSet,
    pub single_day: RegexSet,
    pub period: RegexSet,
    pub company_scope: RegexSet,
    pub user_scope: RegexSet,
}

/// Immutable, compiled rule table
#[derive(Debug, Clone)]
pub struct RuleTable {
    intents: Vec<IntentRule>,
    index: AHashMap<String, usize>,
    entities: Vec<EntityRule>,
    context: ContextRules,
}

impl RuleTable {
    /// Process-wide table compiled from the bundled fleet vocabulary
    pub fn builtin() -> &'static RuleTable {
        &BUILTIN
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let source: RuleTableSource = serde_json::from_str(json)?;
        Self::compile(source)
    }

    pub fn compile(source: RuleTableSource) -> Result<Self> {
        let mut intents = Vec::with_capacity(source.intents.len());
        let mut index = AHashMap::with_capacity(source.intents.len());

        for rule in source.intents {
            if !(rule.base_weight > 0.0 && rule.base_weight <= 1.0) {
                return Err(NluError::InvalidRuleTable(format!(
                    "intent '{}' has base weight {} outside (0, 1]",
                    rule.name, rule.base_weight
                )));
            }
            if rule.groups.is_empty() {
                return Err(NluError::InvalidRuleTable(format!(
                    "intent '{}' has no pattern groups",
                    rule.name
                )));
            }
            if index.contains_key(&rule.name) {
                return Err(NluError::InvalidRuleTable(format!(
                    "intent '{}' declared twice",
                    rule.name
                )));
            }

            let mut groups = Vec::with_capacity(rule.groups.len());
            for (i, group) in rule.groups.iter().enumerate() {
                if group.is_empty() {
                    return Err(NluError::InvalidRuleTable(format!(
                        "intent '{}' group {} is empty",
                        rule.name, i
                    )));
                }
                groups.push(RegexSet::new(group)?);
            }

            index.insert(rule.name.clone(), intents.len());
            intents.push(IntentRule {
                name: rule.name,
                base_weight: rule.base_weight,
                groups,
            });
        }

        let entities = source
            .entities
            .into_iter()
            .map(|rule| {
                let patterns = rule
                    .patterns
                    .iter()
                    .map(|p| Regex::new(p))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(EntityRule {
                    class: rule.class,
                    patterns,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let ctx = source.context;
        let context = ContextRules {
            follow_up: RegexSet::new(&ctx.follow_up)?,
            single_day: RegexSet::new(&ctx.single_day)?,
            period: RegexSet::new(&ctx.period)?,
            company_scope: RegexSet::new(&ctx.company_scope)?,
            user_scope: RegexSet::new(&ctx.user_scope)?,
        };

        debug!(
            intents = intents.len(),
            entity_rules = entities.len(),
            "compiled rule table"
        );

        Ok(Self {
            intents,
            index,
            entities,
            context,
        })
    }

    /// Intent rules in declaration order
    pub fn intents(&self) -> &[IntentRule] {
        &self.intents
    }

    pub fn intent(&self, name: &str) -> Option<&IntentRule> {
        self.index.get(name).map(|&i| &self.intents[i])
    }

    /// Entity rules in declaration order
    pub fn entities(&self) -> &[EntityRule] {
        &self.entities
    }

    pub fn context(&self) -> &ContextRules {
        &self.context
    }
}
