//! Search criteria building and compilation

use serde::{Deserialize, Serialize};

/// One conjunctive field predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPredicate {
    pub field_name: String,
    pub value: String,
}

/// An immutable, compiled query.
///
/// Produced by [`CriteriaBuilder::compile`]; holds the filter predicates and
/// the aggregation options. Facet counting applies to the full match set,
/// facet references annotate each returned result with its own facet
/// membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub(crate) category: Option<String>,
    pub(crate) item_id: Option<i64>,
    pub(crate) predicates: Vec<FieldPredicate>,
    pub(crate) count_facets: bool,
    pub(crate) count_facet_references: bool,
    pub(crate) limit: usize,
    pub(crate) offset: usize,
}

impl SearchCriteria {
    pub fn count_facets(&self) -> bool {
        self.count_facets
    }

    pub fn count_facet_references(&self) -> bool {
        self.count_facet_references
    }

    pub fn predicates(&self) -> &[FieldPredicate] {
        &self.predicates
    }
}

/// Accumulates filter predicates and aggregation options.
///
/// Predicates compose with implicit conjunction in the order added.
/// `compile` snapshots the builder into an immutable criteria; reusing the
/// builder afterwards never affects an already-compiled criteria.
#[derive(Debug, Clone)]
pub struct CriteriaBuilder {
    category: Option<String>,
    item_id: Option<i64>,
    predicates: Vec<FieldPredicate>,
    count_facets: bool,
    count_facet_references: bool,
    limit: usize,
    offset: usize,
}

impl CriteriaBuilder {
    pub fn new() -> Self {
        Self {
            category: None,
            item_id: None,
            predicates: Vec::new(),
            count_facets: true,
            count_facet_references: false,
            limit: 20,
            offset: 0,
        }
    }

    pub fn for_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::new()
        }
    }

    /// Add a conjunctive term predicate on a field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.predicates.push(FieldPredicate {
            field_name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Restrict to one item id
    pub fn item_id(mut self, id: i64) -> Self {
        self.item_id = Some(id);
        self
    }

    /// Compute aggregate facet counts over the full match set (default: true)
    pub fn count_facets(mut self, enabled: bool) -> Self {
        self.count_facets = enabled;
        self
    }

    /// Attach each result's own facet membership (default: false)
    pub fn count_facet_references(mut self, enabled: bool) -> Self {
        self.count_facet_references = enabled;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Produce the immutable compiled criteria
    pub fn compile(&self) -> SearchCriteria {
        SearchCriteria {
            category: self.category.clone(),
            item_id: self.item_id,
            predicates: self.predicates.clone(),
            count_facets: self.count_facets,
            count_facet_references: self.count_facet_references,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl Default for CriteriaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
