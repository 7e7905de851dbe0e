//! Registry mapping facet keys to counting-array ordinals

use crate::facet::extractor::FacetKey;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Maps facet keys to dense ordinal ids used to index the counting arrays.
///
/// The map is append-only for the life of one index generation and is
/// mutated only on the writer path; readers resolve keys under a short read
/// lock. Ordinals are stable within a generation but a full rebuild starts a
/// new generation and may renumber.
#[derive(Default)]
pub struct FacetMap {
    inner: RwLock<FacetMapInner>,
}

#[derive(Default)]
struct FacetMapInner {
    ordinals: HashMap<FacetKey, u32>,
    keys: Vec<FacetKey>,
}

impl FacetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordinal for a key, assigning the next ordinal if the key is unseen.
    /// Writer path only.
    pub fn register(&self, key: &FacetKey) -> u32 {
        let mut inner = self.inner.write();
        if let Some(&ordinal) = inner.ordinals.get(key) {
            return ordinal;
        }
        let ordinal = inner.keys.len() as u32;
        inner.keys.push(key.clone());
        inner.ordinals.insert(key.clone(), ordinal);
        ordinal
    }

    /// Ordinal for a key, if it has been registered
    pub fn ordinal(&self, key: &FacetKey) -> Option<u32> {
        self.inner.read().ordinals.get(key).copied()
    }

    /// Key for an ordinal, if assigned
    pub fn key(&self, ordinal: u32) -> Option<FacetKey> {
        self.inner.read().keys.get(ordinal as usize).cloned()
    }

    /// Number of registered keys
    pub fn len(&self) -> usize {
        self.inner.read().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct field names across all registered keys, in registration order
    pub fn field_names(&self) -> Vec<String> {
        let inner = self.inner.read();
        let mut names: Vec<String> = Vec::new();
        for key in &inner.keys {
            if !names.contains(&key.field_name) {
                names.push(key.field_name.clone());
            }
        }
        names
    }

    /// Discard all assignments, starting a new generation. Full rebuild only.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.ordinals.clear();
        inner.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_assigns_dense_ordinals() {
        let map = FacetMap::new();
        let a = map.register(&FacetKey::new("manufacturer", "canon"));
        let b = map.register(&FacetKey::new("manufacturer", "sony"));
        let a_again = map.register(&FacetKey::new("manufacturer", "canon"));

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(a_again, a);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_ordinal_and_key_round_trip() {
        let map = FacetMap::new();
        let key = FacetKey::new("resolution", "4mp");
        let ordinal = map.register(&key);

        assert_eq!(map.ordinal(&key), Some(ordinal));
        assert_eq!(map.key(ordinal), Some(key));
        assert_eq!(map.ordinal(&FacetKey::new("resolution", "2mp")), None);
    }

    #[test]
    fn test_field_names_distinct_in_order() {
        let map = FacetMap::new();
        map.register(&FacetKey::new("manufacturer", "canon"));
        map.register(&FacetKey::new("resolution", "4mp"));
        map.register(&FacetKey::new("manufacturer", "sony"));

        assert_eq!(map.field_names(), vec!["manufacturer", "resolution"]);
    }

    #[test]
    fn test_reset_starts_new_generation() {
        let map = FacetMap::new();
        map.register(&FacetKey::new("a", "x"));
        map.reset();

        assert!(map.is_empty());
        assert_eq!(map.register(&FacetKey::new("b", "y")), 0);
    }
}
