//! Index configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a faceted index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Path to the index directory
    pub index_path: PathBuf,

    /// Names of the item fields to index and store. Values supplied for
    /// fields outside this list are not indexed.
    pub fields: Vec<String>,

    /// Categories accepted for indexing; empty means all categories
    pub include_categories: Vec<String>,

    /// Categories rejected from indexing
    pub exclude_categories: Vec<String>,

    /// Index writer heap size in bytes (default: 50MB)
    pub writer_heap_size: usize,

    /// Maximum search results to return per query
    pub max_results: usize,

    /// Bounded wait for the exclusive writer lock before a mutation fails
    /// with `IndexError::IndexLocked`
    pub lock_timeout: Duration,

    /// Number of documents swept between cancellation checks
    pub cancel_check_interval: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("./data/facet_index"),
            fields: Vec::new(),
            include_categories: Vec::new(),
            exclude_categories: Vec::new(),
            writer_heap_size: 50_000_000, // 50MB
            max_results: 1000,
            lock_timeout: Duration::from_secs(5),
            cancel_check_interval: 256,
        }
    }
}

impl IndexConfig {
    /// Whether a category passes the include/exclude rules
    pub fn accepts_category(&self, category: &str) -> bool {
        if self
            .exclude_categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
        {
            return false;
        }
        if self.include_categories.is_empty() {
            return true;
        }
        self.include_categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }
}

/// Builder for IndexConfig
pub struct IndexConfigBuilder {
    config: IndexConfig,
}

impl IndexConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: IndexConfig::default(),
        }
    }

    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = path.into();
        self
    }

    /// Add a field to the indexed field list
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.config.fields.push(name.into());
        self
    }

    pub fn fields(mut self, names: Vec<impl Into<String>>) -> Self {
        self.config.fields = names.into_iter().map(|n| n.into()).collect();
        self
    }

    pub fn include_category(mut self, category: impl Into<String>) -> Self {
        self.config.include_categories.push(category.into());
        self
    }

    pub fn exclude_category(mut self, category: impl Into<String>) -> Self {
        self.config.exclude_categories.push(category.into());
        self
    }

    pub fn writer_heap_size(mut self, size: usize) -> Self {
        self.config.writer_heap_size = size;
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.config.max_results = max;
        self
    }

    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.config.lock_timeout = timeout;
        self
    }

    pub fn cancel_check_interval(mut self, interval: usize) -> Self {
        self.config.cancel_check_interval = interval.max(1);
        self
    }

    pub fn build(self) -> IndexConfig {
        self.config
    }
}

impl Default for IndexConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = IndexConfigBuilder::new()
            .index_path("/tmp/idx")
            .field("title")
            .field("body")
            .max_results(50)
            .build();

        assert_eq!(config.index_path, PathBuf::from("/tmp/idx"));
        assert_eq!(config.fields, vec!["title", "body"]);
        assert_eq!(config.max_results, 50);
    }

    #[test]
    fn test_category_rules() {
        let config = IndexConfigBuilder::new()
            .include_category("content")
            .exclude_category("media")
            .build();

        assert!(config.accepts_category("content"));
        assert!(config.accepts_category("Content"));
        assert!(!config.accepts_category("media"));
        assert!(!config.accepts_category("other"));
    }

    #[test]
    fn test_empty_include_accepts_all() {
        let config = IndexConfig::default();
        assert!(config.accepts_category("anything"));
    }
}
