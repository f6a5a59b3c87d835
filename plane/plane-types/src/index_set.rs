//! Bookkeeping of which cloud points are still available for segmentation.

use hashbrown::HashSet;
use rayon::prelude::*;

/// Tracks unprocessed and excluded point ids of one cloud.
///
/// Both sets only shrink or move ids from `unprocessed` to `excluded`, so
/// they are disjoint at all times. Claimed ids (members of a committed
/// plane) are in neither set.
///
/// # Example
///
/// ```
/// use plane_types::IndexSet;
///
/// let mut set = IndexSet::new(5);
/// assert_eq!(set.unprocessed_len(), 5);
///
/// set.claim(&[0, 1]);
/// assert!(set.exclude(4));
/// assert!(!set.exclude(0)); // already claimed
///
/// assert_eq!(set.unprocessed_len(), 2);
/// assert!(set.is_excluded(4));
/// ```
#[derive(Debug, Clone, Default)]
pub struct IndexSet {
    unprocessed: HashSet<usize>,
    excluded: HashSet<usize>,
    total: usize,
}

impl IndexSet {
    /// Marks every id in `0..total` as unprocessed.
    #[must_use]
    pub fn new(total: usize) -> Self {
        let unprocessed: HashSet<usize> = (0..total).into_par_iter().collect();
        Self {
            unprocessed,
            excluded: HashSet::new(),
            total,
        }
    }

    /// Number of ids the set was created with.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Number of unprocessed ids.
    #[must_use]
    pub fn unprocessed_len(&self) -> usize {
        self.unprocessed.len()
    }

    /// Number of excluded ids.
    #[must_use]
    pub fn excluded_len(&self) -> usize {
        self.excluded.len()
    }

    /// Number of ids claimed by committed planes.
    #[must_use]
    pub fn claimed_len(&self) -> usize {
        self.total - self.unprocessed.len() - self.excluded.len()
    }

    /// Returns true if no id is unprocessed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.unprocessed.is_empty()
    }

    /// Returns true if `id` is still available.
    #[must_use]
    pub fn is_unprocessed(&self, id: usize) -> bool {
        self.unprocessed.contains(&id)
    }

    /// Returns true if `id` was excluded.
    #[must_use]
    pub fn is_excluded(&self, id: usize) -> bool {
        self.excluded.contains(&id)
    }

    /// Iterates over unprocessed ids in no particular order.
    pub fn unprocessed(&self) -> impl Iterator<Item = usize> + '_ {
        self.unprocessed.iter().copied()
    }

    /// Parallel iterator over unprocessed ids.
    pub fn par_unprocessed(&self) -> impl ParallelIterator<Item = usize> + '_ {
        self.unprocessed.par_iter().copied()
    }

    /// Removes the given ids from the unprocessed set, returning how many
    /// were actually available.
    pub fn claim(&mut self, ids: &[usize]) -> usize {
        ids.iter().filter(|id| self.unprocessed.remove(*id)).count()
    }

    /// Moves `id` from unprocessed to excluded. Returns false (and does
    /// nothing) if the id was not unprocessed.
    pub fn exclude(&mut self, id: usize) -> bool {
        if self.unprocessed.remove(&id) {
            self.excluded.insert(id);
            true
        } else {
            false
        }
    }
}
