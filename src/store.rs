//! Memoized category index -> representation.

use std::collections::btree_map::{BTreeMap, Entry};

/// Allocated representations, keyed by category index.
///
/// An index is allocated at most once; afterwards its bits never change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepresentationStore {
    bits: BTreeMap<usize, Vec<usize>>,
}

impl RepresentationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits for `index` if they have been allocated.
    pub fn get(&self, index: usize) -> Option<&[usize]> {
        self.bits.get(&index).map(Vec::as_slice)
    }

    /// Bits for `index`, calling `allocate` only on the first request.
    pub fn get_or_allocate<F>(&mut self, index: usize, allocate: F) -> &[usize]
    where
        F: FnOnce(usize) -> Vec<usize>,
    {
        self.bits.entry(index).or_insert_with(|| allocate(index))
    }

    /// Insert previously allocated bits. Returns `false` if `index` was
    /// already present, in which case the store is unchanged.
    pub fn insert(&mut self, index: usize, bits: Vec<usize>) -> bool {
        match self.bits.entry(index) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(bits);
                true
            }
        }
    }

    /// Whether `index` has been allocated.
    pub fn contains(&self, index: usize) -> bool {
        self.bits.contains_key(&index)
    }

    /// Number of allocated representations.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// `(index, bits)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.bits.iter().map(|(&index, bits)| (index, bits.as_slice()))
    }

    /// Lowest and highest allocated index.
    pub fn index_range(&self) -> Option<(usize, usize)> {
        let min = *self.bits.keys().next()?;
        let max = *self.bits.keys().next_back()?;
        Some((min, max))
    }
}
