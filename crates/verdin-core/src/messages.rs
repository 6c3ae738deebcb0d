//! Finding message templates.
//!
//! Evaluators receive a catalog at construction instead of consulting a
//! global localized bundle. Placeholders: `{value}`, `{term}`, `{key}`,
//! `{detail}`.

use serde::{Deserialize, Serialize};

/// Message templates used when rendering findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageCatalog {
    pub not_unique: String,
    pub unresolved_reference: String,
    pub incomplete_results: String,
    pub evaluation_failed: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            not_unique: "{value} is not unique for {term}".to_string(),
            unresolved_reference: "{value} was not found in target".to_string(),
            incomplete_results: "results of {key} may be incomplete: {detail}".to_string(),
            evaluation_failed: "evaluation of {key} failed: {detail}".to_string(),
        }
    }
}

impl MessageCatalog {
    pub fn not_unique(&self, value: &str, term: &str) -> String {
        self.not_unique
            .replace("{value}", value)
            .replace("{term}", term)
    }

    pub fn unresolved_reference(&self, value: &str) -> String {
        self.unresolved_reference.replace("{value}", value)
    }

    pub fn incomplete_results(&self, key: &str, detail: &str) -> String {
        self.incomplete_results
            .replace("{key}", key)
            .replace("{detail}", detail)
    }

    pub fn evaluation_failed(&self, key: &str, detail: &str) -> String {
        self.evaluation_failed
            .replace("{key}", key)
            .replace("{detail}", detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_templates_render() {
        let catalog = MessageCatalog::default();
        assert_eq!(
            catalog.not_unique("t1", "taxonID"),
            "t1 is not unique for taxonID"
        );
        assert_eq!(
            catalog.unresolved_reference("t9"),
            "t9 was not found in target"
        );
    }

    #[test]
    fn custom_templates_override() {
        let catalog = MessageCatalog {
            not_unique: "dup: {value} ({term})".to_string(),
            ..Default::default()
        };
        assert_eq!(catalog.not_unique("x", "id"), "dup: x (id)");
    }
}
