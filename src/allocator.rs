//! Greedy, usage-balancing representation allocation.
//!
//! Each new category receives `w` bits chosen one at a time. A candidate bit
//! is acceptable when, for every category already using it, the number of
//! bits the new representation would then share with that category stays
//! within the global overlap threshold. Candidates are tried lowest usage
//! level first and lowest bit index within a level. When no bit in the whole
//! universe is acceptable the threshold is raised by one and the search for
//! that bit starts over.
//!
//! Termination: once the threshold reaches `w`, every bit not yet chosen for
//! the new category is acceptable, and since `n > 6 * w` there is always at
//! least one.

use std::collections::HashMap;

use crate::ledger::BitUsageLedger;

/// Allocates representations and owns the adaptive overlap threshold.
#[derive(Clone, Debug)]
pub struct RepresentationAllocator {
    w: usize,
    n: usize,
    overlap_threshold: usize,
}

impl RepresentationAllocator {
    /// Allocator for `w` active bits out of `n`, starting at threshold 0.
    pub fn new(w: usize, n: usize) -> Self {
        Self::with_threshold(w, n, 0)
    }

    /// Allocator resuming from a previously reached threshold.
    pub fn with_threshold(w: usize, n: usize, overlap_threshold: usize) -> Self {
        Self {
            w,
            n,
            overlap_threshold,
        }
    }

    /// Number of active bits per representation.
    pub fn w(&self) -> usize {
        self.w
    }

    /// Total number of bits.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Current ceiling on pairwise overlap. Never decreases.
    pub fn overlap_threshold(&self) -> usize {
        self.overlap_threshold
    }

    /// Whether the threshold has reached `w`, at which point new values
    /// are no longer given their own index.
    pub fn is_saturated(&self) -> bool {
        self.overlap_threshold >= self.w
    }

    /// Choose `w` distinct bits for `category` and record them in `ledger`.
    ///
    /// Must be called at most once per category. Bits are returned in the
    /// order they were chosen.
    ///
    /// # Panics
    /// Panics if `ledger` does not track exactly `n` bits.
    pub fn allocate(&mut self, category: usize, ledger: &mut BitUsageLedger) -> Vec<usize> {
        assert_eq!(ledger.len(), self.n, "ledger width does not match allocator");

        // Only bits already chosen for this category change usage while it
        // is being allocated, and those are never candidates again, so one
        // ordering serves all `w` picks.
        let order = ledger.bits_by_usage();
        let mut chosen = Vec::with_capacity(self.w);
        // Bits shared so far between the new representation and each neighbor.
        let mut shared: HashMap<usize, usize> = HashMap::new();

        while chosen.len() < self.w {
            let bit = loop {
                if let Some(bit) = self.find_bit(ledger, &order, &chosen, &shared) {
                    break bit;
                }
                self.overlap_threshold += 1;
            };

            for &user in ledger.users_of(bit) {
                *shared.entry(user).or_insert(0) += 1;
            }
            ledger.record_usage(bit, category);
            chosen.push(bit);
        }

        chosen
    }

    /// Lowest-usage bit that keeps every neighbor within the threshold.
    fn find_bit(
        &self,
        ledger: &BitUsageLedger,
        order: &[usize],
        chosen: &[usize],
        shared: &HashMap<usize, usize>,
    ) -> Option<usize> {
        order
            .iter()
            .copied()
            .filter(|bit| !chosen.contains(bit))
            .find(|&bit| self.is_acceptable(ledger.users_of(bit), shared))
    }

    fn is_acceptable(&self, users: &[usize], shared: &HashMap<usize, usize>) -> bool {
        users
            .iter()
            .all(|user| shared.get(user).copied().unwrap_or(0) < self.overlap_threshold)
    }
}

/// Number of bit positions two representations have in common.
pub fn overlap(a: &[usize], b: &[usize]) -> usize {
    a.iter().filter(|bit| b.contains(bit)).count()
}

/// Largest pairwise overlap among representations whose bits are tracked
/// in `ledger`.
///
/// Used to recover the threshold for state persisted without one.
pub fn max_pairwise_overlap<'a, I>(ledger: &BitUsageLedger, representations: I) -> usize
where
    I: IntoIterator<Item = (usize, &'a [usize])>,
{
    let mut max = 0;
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for (category, bits) in representations {
        counts.clear();
        for &bit in bits {
            if bit >= ledger.len() {
                continue;
            }
            for &user in ledger.users_of(bit) {
                if user != category {
                    *counts.entry(user).or_insert(0) += 1;
                }
            }
        }
        if let Some(&local) = counts.values().max() {
            max = max.max(local);
        }
    }
    max
}
