//! Facet counting over the full match set

use crate::facet::extractor::FacetKey;
use crate::facet::map::FacetMap;
use serde::{Deserialize, Serialize};

/// One aggregated facet key with its count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub key: FacetKey,
    pub count: u64,
}

/// A collection of facet counts, either aggregate over a match set or the
/// per-document subset attached to one search result.
///
/// Zero matches with counting enabled yields an empty (not absent)
/// collection. `field_names` reflects only fields with at least one
/// non-zero count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCounts {
    counts: Vec<FacetCount>,
}

impl FacetCounts {
    pub(crate) fn from_counts(mut counts: Vec<FacetCount>) -> Self {
        counts.sort_by(|a, b| {
            a.key
                .field_name
                .cmp(&b.key.field_name)
                .then(b.count.cmp(&a.count))
                .then(a.key.value.cmp(&b.key.value))
        });
        Self { counts }
    }

    /// Per-document counts for the given attached keys. A key appearing
    /// more than once reflects multiple occurrences of that value within
    /// the document.
    pub(crate) fn from_keys(keys: &[FacetKey]) -> Self {
        let mut counts: Vec<FacetCount> = Vec::new();
        for key in keys {
            match counts.iter_mut().find(|c| c.key == *key) {
                Some(existing) => existing.count += 1,
                None => counts.push(FacetCount {
                    key: key.clone(),
                    count: 1,
                }),
            }
        }
        Self::from_counts(counts)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FacetCount> {
        self.counts.iter()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct field names with a non-zero count, in sorted order
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for count in &self.counts {
            let name = count.key.field_name.as_str();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Counts restricted to one field
    pub fn for_field<'a>(&'a self, field_name: &'a str) -> impl Iterator<Item = &'a FacetCount> {
        self.counts
            .iter()
            .filter(move |c| c.key.field_name == field_name)
    }

    /// Count for a specific (field, value) key, zero if absent
    pub fn count(&self, field_name: &str, value: &str) -> u64 {
        self.counts
            .iter()
            .find(|c| c.key.field_name == field_name && c.key.value == value)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a FacetCounts {
    type Item = &'a FacetCount;
    type IntoIter = std::slice::Iter<'a, FacetCount>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

/// Counter array indexed by facet-map ordinal, swept once over the full
/// match set. `O(matches x facets-per-doc)` time, `O(distinct-keys)` space.
pub(crate) struct FacetTally {
    counts: Vec<u64>,
}

impl FacetTally {
    pub(crate) fn new() -> Self {
        Self { counts: Vec::new() }
    }

    /// Record one occurrence of an attached facet key for a matched document
    pub(crate) fn observe(&mut self, ordinal: u32) {
        let index = ordinal as usize;
        if index >= self.counts.len() {
            self.counts.resize(index + 1, 0);
        }
        self.counts[index] += 1;
    }

    /// Materialize the non-zero ordinals back into facet counts
    pub(crate) fn into_counts(self, map: &FacetMap) -> FacetCounts {
        let mut counts = Vec::new();
        for (ordinal, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            // Ordinals come from the map, so the reverse lookup only misses
            // if the map was reset mid-query; drop the entry rather than fail.
            if let Some(key) = map.key(ordinal as u32) {
                counts.push(FacetCount { key, count });
            }
        }
        FacetCounts::from_counts(counts)
    }
}
