//! Search result types

use crate::facet::FacetCounts;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single matched document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Item id
    pub id: i64,

    /// Item category
    pub category: String,

    /// Relevance score
    pub score: f32,

    /// Stored field values
    pub fields: HashMap<String, String>,

    /// This result's own facet membership, present only when the criteria
    /// requested facet references
    pub facet_counts: Option<FacetCounts>,
}

/// Ordered search results with optional aggregate facet counts.
///
/// Results are ordered by descending score, ties broken by ascending id.
/// `facet_counts` is present iff the criteria enabled facet counting; with
/// zero matches it is an empty collection, not absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// The returned page of results
    pub results: Vec<SearchResult>,

    /// Total number of matched documents (before pagination)
    pub total_hits: usize,

    /// Aggregate facet counts over the full match set
    pub facet_counts: Option<FacetCounts>,

    /// Query execution time in milliseconds
    pub search_time_ms: u64,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchResult> {
        self.results.iter()
    }
}

impl<'a> IntoIterator for &'a SearchResults {
    type Item = &'a SearchResult;
    type IntoIter = std::slice::Iter<'a, SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
