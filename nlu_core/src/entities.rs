//! Entity extraction from user input

use crate::rules::{EntityRule, RuleTable};
use crate::types::EntityBag;

/// Extract typed fragments from user input
///
/// Patterns run against the original text, so casing is preserved. Every match
/// is appended verbatim; overlapping patterns produce duplicates, and relative
/// markers such as "hoy" are kept as literal text.
pub struct EntityExtractor<'a> {
    rules: &'a [EntityRule],
}

impl<'a> EntityExtractor<'a> {
    pub fn new(table: &'a RuleTable) -> Self {
        Self {
            rules: table.entities(),
        }
    }

    pub fn extract(&self, text: &str) -> EntityBag {
        let mut bag = EntityBag::default();

        for rule in self.rules {
            let values = bag.get_mut(rule.class);
            for pattern in &rule.patterns {
                values.extend(pattern.find_iter(text).map(|m| m.as_str().to_string()));
            }
        }

        bag
    }
}

impl Default for EntityExtractor<'static> {
    fn default() -> Self {
        Self::new(RuleTable::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityClass;

    #[test]
    fn test_extract_status() {
        let extractor = EntityExtractor::default();
        let bag = extractor.extract("¿Cuántos conductores activos hay?");

        assert_eq!(bag.status_words, vec!["activos"]);
        assert!(bag.dates.is_empty());
        assert!(bag.numbers.is_empty());
    }

    #[test]
    fn test_relative_dates_stay_literal() {
        let extractor = EntityExtractor::default();
        let bag = extractor.extract("Vencimientos de mi empresa este mes y los de Hoy");

        assert_eq!(bag.dates, vec!["Hoy", "este mes"]);
    }

    #[test]
    fn test_absolute_date_also_yields_numbers() {
        let extractor = EntityExtractor::default();
        let bag = extractor.extract("viajes del 15/03/2025 con 12 pasajeros");

        assert_eq!(bag.dates, vec!["15/03/2025"]);
        assert_eq!(bag.numbers, vec!["15", "03", "2025", "12"]);
    }

    #[test]
    fn test_overlapping_patterns_keep_duplicates() {
        let extractor = EntityExtractor::default();
        let bag = extractor.extract("buses escolares desde Cali");

        assert_eq!(
            bag.category_words,
            vec!["buses", "escolares", "buses escolares"]
        );
        assert_eq!(bag.locations, vec!["Cali", "desde Cali"]);
    }

    #[test]
    fn test_proper_names() {
        let extractor = EntityExtractor::default();
        let bag = extractor.extract("¿Qué vehículo maneja Juan Pérez? Pregunta el conductor Gómez");

        assert_eq!(bag.get(EntityClass::ProperNames), ["Juan Pérez", "conductor Gómez"]);
    }

    #[test]
    fn test_empty_text_has_every_class() {
        let bag = EntityExtractor::default().extract("");
        assert!(bag.is_empty());
        assert_eq!(bag.len(), 0);
    }
}
