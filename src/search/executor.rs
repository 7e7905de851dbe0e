//! Query execution against the engine

use crate::config::IndexConfig;
use crate::document::{
    stored_category, stored_facet_keys, stored_fields, stored_item_id, CATEGORY_FIELD,
    ITEM_ID_FIELD,
};
use crate::error::{IndexError, IndexResult};
use crate::facet::{FacetCounts, FacetMap, FacetTally};
use crate::search::collector::MatchSetCollector;
use crate::search::criteria::SearchCriteria;
use crate::search::results::{SearchResult, SearchResults};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tantivy::query::{AllQuery, BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{IndexRecordOption, Schema};
use tantivy::{Index, IndexReader, TantivyDocument, Term};
use tracing::debug;

/// Cooperative cancellation handle for long-running queries.
///
/// The match-set sweep checks the token periodically; a tripped token makes
/// the query return `IndexError::Cancelled` instead of a partial result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Runs compiled criteria: translates predicates, retrieves the full match
/// set, drives the facet tally over it, and materializes the ordered page.
pub(crate) struct QueryExecutor<'a> {
    pub(crate) index: &'a Index,
    pub(crate) schema: &'a Schema,
    pub(crate) reader: &'a IndexReader,
    pub(crate) facet_map: &'a FacetMap,
    pub(crate) config: &'a IndexConfig,
}

impl QueryExecutor<'_> {
    pub(crate) fn execute(
        &self,
        criteria: &SearchCriteria,
        cancel: Option<&CancelToken>,
    ) -> IndexResult<SearchResults> {
        let start_time = std::time::Instant::now();

        let query = self.build_query(criteria)?;
        let searcher = self.reader.searcher();

        let matches = searcher
            .search(&*query, &MatchSetCollector)
            .map_err(|e| IndexError::SearchFailed(e.to_string()))?;
        let total_hits = matches.len();

        // One sweep over the full match set: ids for deterministic ordering,
        // facet ordinals for the aggregate tally.
        let stride = self.config.cancel_check_interval.max(1);
        let mut tally = FacetTally::new();
        let mut entries = Vec::with_capacity(matches.len());
        for (i, (score, address)) in matches.into_iter().enumerate() {
            if i % stride == 0 {
                if let Some(token) = cancel {
                    if token.is_cancelled() {
                        debug!(scanned = i, total_hits, "query cancelled during sweep");
                        return Err(IndexError::Cancelled);
                    }
                }
            }

            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| IndexError::SearchFailed(e.to_string()))?;
            let id = stored_item_id(&doc, self.schema).unwrap_or(i64::MAX);

            if criteria.count_facets {
                // Missing or unreadable facet data contributes zero facets;
                // the query itself never fails on it.
                if let Some(keys) = stored_facet_keys(&doc, self.schema) {
                    for key in &keys {
                        if let Some(ordinal) = self.facet_map.ordinal(key) {
                            tally.observe(ordinal);
                        }
                    }
                }
            }

            entries.push((score, id, address));
        }

        entries.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        let limit = criteria.limit.min(self.config.max_results);
        let mut results = Vec::new();
        for (score, id, address) in entries.iter().skip(criteria.offset).take(limit) {
            let doc: TantivyDocument = searcher
                .doc(*address)
                .map_err(|e| IndexError::SearchFailed(e.to_string()))?;

            let facet_counts = if criteria.count_facet_references {
                Some(
                    stored_facet_keys(&doc, self.schema)
                        .map(|keys| FacetCounts::from_keys(&keys))
                        .unwrap_or_default(),
                )
            } else {
                None
            };

            results.push(SearchResult {
                id: *id,
                category: stored_category(&doc, self.schema).unwrap_or_default(),
                score: *score,
                fields: stored_fields(&doc, self.schema, &self.config.fields),
                facet_counts,
            });
        }

        let facet_counts = if criteria.count_facets {
            Some(tally.into_counts(self.facet_map))
        } else {
            None
        };

        let search_time_ms = start_time.elapsed().as_millis() as u64;
        debug!(
            total_hits,
            returned = results.len(),
            count_facets = criteria.count_facets,
            search_time_ms,
            "query executed"
        );

        Ok(SearchResults {
            results,
            total_hits,
            facet_counts,
            search_time_ms,
        })
    }

    /// Translate the compiled criteria into an engine query. Predicates
    /// compose with implicit conjunction in the order added.
    fn build_query(&self, criteria: &SearchCriteria) -> IndexResult<Box<dyn Query>> {
        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        if let Some(ref category) = criteria.category {
            let field = self
                .schema
                .get_field(CATEGORY_FIELD)
                .map_err(|e| IndexError::QueryParsingFailed(e.to_string()))?;
            subqueries.push((
                Occur::Must,
                Box::new(TermQuery::new(
                    Term::from_field_text(field, category),
                    IndexRecordOption::Basic,
                )),
            ));
        }

        if let Some(item_id) = criteria.item_id {
            let field = self
                .schema
                .get_field(ITEM_ID_FIELD)
                .map_err(|e| IndexError::QueryParsingFailed(e.to_string()))?;
            subqueries.push((
                Occur::Must,
                Box::new(TermQuery::new(
                    Term::from_field_i64(field, item_id),
                    IndexRecordOption::Basic,
                )),
            ));
        }

        for predicate in &criteria.predicates {
            let field = self.schema.get_field(&predicate.field_name).map_err(|_| {
                IndexError::QueryParsingFailed(format!(
                    "unknown field: {}",
                    predicate.field_name
                ))
            })?;
            let mut parser = QueryParser::for_index(self.index, vec![field]);
            parser.set_conjunction_by_default();
            let parsed = parser.parse_query(&predicate.value)?;
            subqueries.push((Occur::Must, parsed));
        }

        if subqueries.is_empty() {
            Ok(Box::new(AllQuery))
        } else if subqueries.len() == 1 {
            Ok(subqueries.into_iter().next().map(|(_, q)| q).unwrap_or_else(
                || Box::new(AllQuery),
            ))
        } else {
            Ok(Box::new(BooleanQuery::from(subqueries)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
    }
}
