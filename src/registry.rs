//! Category value -> stable index.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Index reserved for "not defined". Never assigned to a value.
pub const NOT_DEFINED: usize = 0;

/// Assigns monotonically increasing indices to distinct category values.
#[derive(Clone, Debug)]
pub struct CategoryIndexRegistry<C> {
    indices: HashMap<C, usize>,
    max_index: usize,
}

impl<C: Eq + Hash + Clone> CategoryIndexRegistry<C> {
    /// Create an empty registry. Only [`NOT_DEFINED`] is in use.
    pub fn new() -> Self {
        Self {
            indices: HashMap::new(),
            max_index: NOT_DEFINED,
        }
    }

    /// Rebuild from persisted `(value, index)` pairs.
    ///
    /// Returns `None` if an index is reserved or repeated, or a value is
    /// repeated.
    pub fn from_entries<I>(entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = (C, usize)>,
    {
        let mut registry = Self::new();
        let mut seen = HashSet::new();
        for (value, index) in entries {
            if index == NOT_DEFINED || !seen.insert(index) {
                return None;
            }
            if registry.indices.insert(value, index).is_some() {
                return None;
            }
            registry.max_index = registry.max_index.max(index);
        }
        Some(registry)
    }

    /// Index of `value` if it has been seen, without registering it.
    pub fn get(&self, value: &C) -> Option<usize> {
        self.indices.get(value).copied()
    }

    /// Index for `value`, registering it as `max + 1` on first sight.
    ///
    /// `None` is the missing value and yields `None` ("no bits") without
    /// touching the registry.
    pub fn index_for(&mut self, value: Option<&C>) -> Option<usize> {
        let value = value?;
        if let Some(index) = self.get(value) {
            return Some(index);
        }
        self.max_index += 1;
        self.indices.insert(value.clone(), self.max_index);
        Some(self.max_index)
    }

    /// Number of registered values.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no value has been registered.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Highest index handed out so far, or [`NOT_DEFINED`].
    pub fn max_index(&self) -> usize {
        self.max_index
    }

    /// `(value, index)` pairs ordered by index.
    pub fn entries(&self) -> Vec<(&C, usize)> {
        let mut entries: Vec<_> = self.indices.iter().map(|(v, &i)| (v, i)).collect();
        entries.sort_unstable_by_key(|&(_, i)| i);
        entries
    }
}

impl<C: Eq + Hash + Clone> Default for CategoryIndexRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_assigns_in_insertion_order() {
        let mut registry = CategoryIndexRegistry::new();
        assert_eq!(registry.index_for(Some(&"a")), Some(1));
        assert_eq!(registry.index_for(Some(&"b")), Some(2));
        assert_eq!(registry.index_for(Some(&"a")), Some(1));
        assert_eq!(registry.max_index(), 2);
        assert_eq!(registry.entries(), vec![(&"a", 1), (&"b", 2)]);
    }

    #[test]
    fn test_missing_value_is_not_registered() {
        let mut registry: CategoryIndexRegistry<String> = CategoryIndexRegistry::new();
        assert_eq!(registry.index_for(None), None);
        assert!(registry.is_empty());
        assert_eq!(registry.max_index(), NOT_DEFINED);
    }

    #[test]
    fn test_from_entries_continues_after_max() {
        let mut registry =
            CategoryIndexRegistry::from_entries([("x".to_string(), 3), ("y".to_string(), 7)])
                .unwrap();
        assert_eq!(registry.index_for(Some(&"z".to_string())), Some(8));
        assert_eq!(registry.get(&"x".to_string()), Some(3));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_from_entries_rejects_bad_maps() {
        assert!(CategoryIndexRegistry::from_entries([("x", 0)]).is_none());
        assert!(CategoryIndexRegistry::from_entries([("x", 1), ("y", 1)]).is_none());
        assert!(CategoryIndexRegistry::from_entries([("x", 1), ("x", 2)]).is_none());
    }

    proptest! {
        #[test]
        fn prop_indices_are_a_bijection(values in prop::collection::vec(0u16..50, 0..200)) {
            let mut registry = CategoryIndexRegistry::new();
            for v in &values {
                registry.index_for(Some(v));
            }
            let entries = registry.entries();
            let indices: Vec<usize> = entries.iter().map(|&(_, i)| i).collect();
            let expected: Vec<usize> = (1..=registry.len()).collect();
            prop_assert_eq!(indices, expected);
        }
    }
}
