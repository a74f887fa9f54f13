//! Per-bit usage tracking.
//!
//! For every bit position the ledger keeps the category indices whose
//! representation contains that bit. Usage only ever grows.

/// Bit position -> category indices using it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitUsageLedger {
    users: Vec<Vec<usize>>,
}

impl BitUsageLedger {
    /// Create an empty ledger over `n` bit positions.
    pub fn new(n: usize) -> Self {
        Self {
            users: vec![Vec::new(); n],
        }
    }

    /// Rebuild a ledger from `(category, bits)` pairs in one pass.
    ///
    /// Bits outside `0..n` are ignored; callers validate representations
    /// before handing them over.
    pub fn from_representations<'a, I>(n: usize, representations: I) -> Self
    where
        I: IntoIterator<Item = (usize, &'a [usize])>,
    {
        let mut ledger = Self::new(n);
        for (category, bits) in representations {
            for &bit in bits {
                if bit < n {
                    ledger.record_usage(bit, category);
                }
            }
        }
        ledger
    }

    /// Number of bit positions tracked.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the ledger tracks no bit positions at all.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// How many categories use `bit`.
    ///
    /// # Panics
    /// Panics if `bit >= self.len()`.
    #[inline]
    pub fn usage_count(&self, bit: usize) -> usize {
        self.users[bit].len()
    }

    /// Categories using `bit`, in the order they were recorded.
    ///
    /// # Panics
    /// Panics if `bit >= self.len()`.
    #[inline]
    pub fn users_of(&self, bit: usize) -> &[usize] {
        &self.users[bit]
    }

    /// Record that `category` uses `bit`. Recording twice is a no-op.
    ///
    /// # Panics
    /// Panics if `bit >= self.len()`.
    pub fn record_usage(&mut self, bit: usize, category: usize) {
        let users = &mut self.users[bit];
        if !users.contains(&category) {
            users.push(category);
        }
    }

    /// Usage count for every bit, indexed by bit position.
    pub fn usage_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.users.iter().map(Vec::len)
    }

    /// Lowest and highest usage count across all bits.
    pub fn usage_range(&self) -> Option<(usize, usize)> {
        let min = self.usage_counts().min()?;
        let max = self.usage_counts().max()?;
        Some((min, max))
    }

    /// Bit positions ordered by `(usage count, bit index)`.
    ///
    /// This is the order the allocator walks candidates in: lowest usage
    /// level first, lowest bit first within a level.
    pub fn bits_by_usage(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.users.len()).collect();
        order.sort_unstable_by_key(|&bit| (self.users[bit].len(), bit));
        order
    }
}
