//! Facet key derivation from item records

use crate::value_set::ValueSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A (field, value) facet dimension key.
///
/// Values are lower-cased on construction so that "Canon" and "canon"
/// aggregate into one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacetKey {
    pub field_name: String,
    pub value: String,
}

impl FacetKey {
    pub fn new(field_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            value: value.into().to_lowercase(),
        }
    }
}

impl fmt::Display for FacetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field_name, self.value)
    }
}

/// Derives facet keys from a ValueSet at index time.
///
/// Extractors are stateless and deterministic: the same ValueSet always
/// yields the same key sequence, so re-extraction on rebuild is safe.
pub trait FacetExtractor: Send + Sync {
    fn extract(&self, item: &ValueSet) -> Vec<FacetKey>;
}

/// Emits one facet key per distinct value of a named field, lower-cased,
/// skipping absent or empty values.
pub struct TermFacetExtractor {
    field_name: String,
}

impl TermFacetExtractor {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }
}

impl FacetExtractor for TermFacetExtractor {
    fn extract(&self, item: &ValueSet) -> Vec<FacetKey> {
        let mut keys: Vec<FacetKey> = Vec::new();
        for value in item.get(&self.field_name) {
            if value.trim().is_empty() {
                continue;
            }
            let key = FacetKey::new(self.field_name.clone(), value.clone());
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

/// Ordered set of facet extractors, fixed for the lifetime of an index.
///
/// Facet extraction is an indexing-time decision: a field not covered by an
/// extractor here cannot be counted later without a rebuild.
#[derive(Default)]
pub struct FacetConfiguration {
    extractors: Vec<Box<dyn FacetExtractor>>,
}

impl FacetConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extractor(mut self, extractor: impl FacetExtractor + 'static) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    /// Shorthand for adding a `TermFacetExtractor` on a field
    pub fn with_term_facet(self, field_name: impl Into<String>) -> Self {
        self.with_extractor(TermFacetExtractor::new(field_name))
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Run all extractors over an item, in configuration order
    pub fn extract(&self, item: &ValueSet) -> Vec<FacetKey> {
        self.extractors
            .iter()
            .flat_map(|e| e.extract(item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_extractor_lowercases() {
        let item = ValueSet::new(1, "content").with_value("manufacturer", "Canon");
        let keys = TermFacetExtractor::new("manufacturer").extract(&item);

        assert_eq!(keys, vec![FacetKey::new("manufacturer", "canon")]);
    }

    #[test]
    fn test_term_extractor_skips_empty_and_dedupes() {
        let item = ValueSet::new(1, "content")
            .with_values("tags", vec!["alpha", "", "  ", "Alpha", "beta"]);
        let keys = TermFacetExtractor::new("tags").extract(&item);

        assert_eq!(
            keys,
            vec![FacetKey::new("tags", "alpha"), FacetKey::new("tags", "beta")]
        );
    }

    #[test]
    fn test_term_extractor_absent_field() {
        let item = ValueSet::new(1, "content");
        assert!(TermFacetExtractor::new("missing").extract(&item).is_empty());
    }

    #[test]
    fn test_configuration_order() {
        let item = ValueSet::new(1, "content")
            .with_value("manufacturer", "Sony")
            .with_value("resolution", "4MP");

        let config = FacetConfiguration::new()
            .with_term_facet("manufacturer")
            .with_term_facet("resolution");

        let keys = config.extract(&item);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].field_name, "manufacturer");
        assert_eq!(keys[1], FacetKey::new("resolution", "4mp"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let item = ValueSet::new(1, "content").with_values("tags", vec!["x", "y"]);
        let config = FacetConfiguration::new().with_term_facet("tags");

        assert_eq!(config.extract(&item), config.extract(&item));
    }
}
