//! Normalized item records supplied by the host for indexing

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A normalized, host-agnostic representation of one indexable item.
///
/// The id is unique within a category and stable across reindexing. Field
/// values are ordered sequences; a single-valued field is a one-element
/// sequence. ValueSets are transient: constructed per ingestion call and
/// consumed by the writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSet {
    /// Item id, unique within `category`
    pub id: i64,

    /// Item category (e.g. "content", "media")
    pub category: String,

    /// Field name to ordered values
    pub values: BTreeMap<String, Vec<String>>,
}

impl ValueSet {
    /// Create an empty ValueSet
    pub fn new(id: i64, category: impl Into<String>) -> Self {
        Self {
            id,
            category: category.into(),
            values: BTreeMap::new(),
        }
    }

    /// Set a single-valued field, replacing any existing values
    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(field.into(), vec![value.into()]);
        self
    }

    /// Set a multi-valued field, replacing any existing values
    pub fn with_values(
        mut self,
        field: impl Into<String>,
        values: Vec<impl Into<String>>,
    ) -> Self {
        self.values
            .insert(field.into(), values.into_iter().map(|v| v.into()).collect());
        self
    }

    /// Append one value to a field
    pub fn add_value(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.entry(field.into()).or_default().push(value.into());
    }

    /// First value of a field, if any
    pub fn first(&self, field: &str) -> Option<&str> {
        self.values
            .get(field)
            .and_then(|vs| vs.first())
            .map(|s| s.as_str())
    }

    /// All values of a field
    pub fn get(&self, field: &str) -> &[String] {
        self.values.get(field).map(|vs| vs.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_multi_values() {
        let item = ValueSet::new(1, "content")
            .with_value("title", "hello")
            .with_values("tags", vec!["a", "b"]);

        assert_eq!(item.first("title"), Some("hello"));
        assert_eq!(item.get("tags"), &["a".to_string(), "b".to_string()]);
        assert_eq!(item.first("missing"), None);
        assert!(item.get("missing").is_empty());
    }

    #[test]
    fn test_add_value_appends() {
        let mut item = ValueSet::new(2, "content").with_value("tags", "a");
        item.add_value("tags", "b");
        assert_eq!(item.get("tags").len(), 2);
    }
}
