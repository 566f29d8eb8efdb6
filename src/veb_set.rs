use core::fmt;
use core::iter::FusedIterator;

use alloc::boxed::Box;
use tracing::{debug, trace};

use crate::VebError;
use crate::universe::{Branches, Universe};

/// A set of integers from a fixed universe, based on a [van Emde Boas tree].
///
/// A set created with `bits` bits holds keys in `[0, 2^bits)`. Membership, insertion, removal
/// and [`successor`](VebSet::successor) all cost O(log log U), where `U = 2^bits`, independently
/// of how many keys are stored.
///
/// Each level keeps its smallest and largest key inline. Everything in between is spread over
/// clusters indexed by the high half of the key, plus a summary set recording which clusters are
/// non-empty. Clusters and summaries are only allocated once a level holds three keys and are
/// dropped the moment they empty, so memory follows the stored keys rather than the universe.
///
/// # Examples
///
/// ```
/// use ordtree::{VebError, VebSet};
///
/// let mut set = VebSet::with_bits(4).unwrap();
/// for key in [2, 3, 4, 5, 7, 14, 15] {
///     assert_eq!(set.insert(key), Ok(true));
/// }
///
/// assert!(set.contains(7));
/// assert!(!set.contains(6));
/// assert_eq!(set.successor(5), Some(7));
/// assert_eq!(set.successor(15), None);
/// assert_eq!(set.insert(16), Err(VebError::OutOfDomain { key: 16, bits: 4 }));
///
/// assert!(set.remove(7));
/// assert_eq!(set.successor(5), Some(14));
/// assert_eq!(set.iter().collect::<Vec<_>>(), [2, 3, 4, 5, 14, 15]);
/// ```
///
/// [van Emde Boas tree]: https://en.wikipedia.org/wiki/Van_Emde_Boas_tree
#[derive(Clone)]
pub struct VebSet {
    universe: Universe,
    len: usize,
    min: Option<u64>,
    // Only `Some` while `len >= 2`; never duplicates `min`.
    max: Option<u64>,
    branches: Option<Box<Branches<VebSet>>>,
}

/// An iterator over the keys of a `VebSet`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`VebSet`].
///
/// [`iter`]: VebSet::iter
pub struct Iter<'a> {
    set: &'a VebSet,
    next: Option<u64>,
    remaining: usize,
}

impl VebSet {
    /// Makes a new, empty `VebSet` over the full 32-bit universe.
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> Self {
        Self::empty(Universe::FULL)
    }

    /// Makes a new, empty `VebSet` over the universe `[0, 2^bits)`.
    ///
    /// # Errors
    ///
    /// [`VebError::InvalidWidth`] unless `1 <= bits <= MAX_BITS`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::{MAX_BITS, VebError, VebSet};
    ///
    /// let set = VebSet::with_bits(8).unwrap();
    /// assert_eq!(set.bits(), 8);
    /// assert_eq!(VebSet::with_bits(0).unwrap_err(), VebError::InvalidWidth { bits: 0, max: MAX_BITS });
    /// ```
    pub fn with_bits(bits: u32) -> Result<Self, VebError> {
        Universe::new(bits).map(Self::empty)
    }

    pub(crate) const fn empty(universe: Universe) -> Self {
        Self {
            universe,
            len: 0,
            min: None,
            max: None,
            branches: None,
        }
    }

    /// Returns the bit-width of the universe.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.universe.bits()
    }

    /// Returns the number of keys in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set contains no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears the set, removing all keys and releasing every cluster.
    pub fn clear(&mut self) {
        debug!(bits = self.bits(), len = self.len, "clearing van Emde Boas set");
        *self = Self::empty(self.universe);
    }

    /// Returns the smallest key in the set.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn min(&self) -> Option<u64> {
        self.min
    }

    /// Returns the largest key in the set.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn max(&self) -> Option<u64> {
        match self.max {
            Some(max) => Some(max),
            None => self.min,
        }
    }

    /// Returns `true` if the set contains `key`. Keys outside the universe are never contained.
    ///
    /// # Complexity
    ///
    /// O(log log U)
    #[must_use]
    pub fn contains(&self, key: u64) -> bool {
        self.universe.contains(key) && self.contains_unchecked(key)
    }

    fn contains_unchecked(&self, key: u64) -> bool {
        if self.min == Some(key) || self.max == Some(key) {
            return true;
        }
        let Some(branches) = self.branches.as_deref() else {
            return false;
        };
        let (high, low) = self.universe.split(key);
        branches.clusters[high].as_deref().is_some_and(|cluster| cluster.contains_unchecked(low))
    }

    /// Adds `key` to the set.
    ///
    /// Returns whether the key was newly inserted: `Ok(false)` means it was already present and
    /// nothing changed.
    ///
    /// # Errors
    ///
    /// [`VebError::OutOfDomain`] if `key` does not fit in the universe. The set is unchanged.
    ///
    /// # Complexity
    ///
    /// O(log log U)
    pub fn insert(&mut self, key: u64) -> Result<bool, VebError> {
        self.universe.check(key)?;
        Ok(self.insert_unchecked(key))
    }

    pub(crate) fn insert_unchecked(&mut self, key: u64) -> bool {
        let Some(min) = self.min else {
            self.min = Some(key);
            self.len = 1;
            return true;
        };
        if key == min {
            return false;
        }
        let Some(max) = self.max else {
            if key < min {
                self.min = Some(key);
                self.max = Some(min);
            } else {
                self.max = Some(key);
            }
            self.len = 2;
            return true;
        };
        if key == max {
            return false;
        }

        // A new extreme takes the inline slot and the old extreme moves down into a cluster.
        let mut key = key;
        if key < min {
            self.min = Some(key);
            key = min;
        } else if key > max {
            self.max = Some(key);
            key = max;
        }

        let universe = self.universe;
        let branches = self.branches.get_or_insert_with(|| Box::new(Branches::new(universe)));
        let (high, low) = universe.split(key);
        let inserted = match branches.clusters[high].as_deref_mut() {
            Some(cluster) => cluster.insert_unchecked(low),
            None => {
                trace!(high, "allocating cluster");
                let mut cluster = Self::empty(universe.cluster());
                cluster.insert_unchecked(low);
                branches.clusters[high] = Some(Box::new(cluster));
                branches.summary.insert_unchecked(high as u64);
                true
            }
        };
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes `key` from the set. Returns whether it was present.
    ///
    /// Keys outside the universe are never present, so removing one is a no-op.
    ///
    /// # Complexity
    ///
    /// O(log log U)
    pub fn remove(&mut self, key: u64) -> bool {
        self.universe.contains(key) && self.remove_unchecked(key)
    }

    pub(crate) fn remove_unchecked(&mut self, key: u64) -> bool {
        let Some(min) = self.min else {
            return false;
        };
        let Some(max) = self.max else {
            if key != min {
                return false;
            }
            self.min = None;
            self.len = 0;
            return true;
        };
        if self.len == 2 {
            if key == min {
                self.min = Some(max);
            } else if key != max {
                return false;
            }
            self.max = None;
            self.len = 1;
            return true;
        }

        let universe = self.universe;
        let branches = self
            .branches
            .as_deref_mut()
            .expect("`VebSet::remove_unchecked()` - a set with three keys must have clusters!");

        // Removing an extreme pulls the nearest clustered key up into its slot; that key is then
        // the one deleted from its cluster.
        let target = if key == min {
            let high = branches.edge_cluster(true);
            let low = branches.cluster(high).min.expect("`VebSet::remove_unchecked()` - empty cluster!");
            let target = universe.join(high, low);
            self.min = Some(target);
            target
        } else if key == max {
            let high = branches.edge_cluster(false);
            let low = branches.cluster(high).max().expect("`VebSet::remove_unchecked()` - empty cluster!");
            let target = universe.join(high, low);
            self.max = Some(target);
            target
        } else {
            key
        };

        let (high, low) = universe.split(target);
        let Some(cluster) = branches.clusters[high].as_deref_mut() else {
            return false;
        };
        if !cluster.remove_unchecked(low) {
            return false;
        }
        if cluster.is_empty() {
            branches.release(high);
        }
        if branches.summary.is_empty() {
            trace!(bits = universe.bits(), "collapsing clusters");
            self.branches = None;
        }
        self.len -= 1;
        true
    }

    /// Returns the smallest key in the set strictly greater than `key`.
    ///
    /// `key` itself need not be in the set, nor in the universe.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::VebSet;
    ///
    /// let set: VebSet = [3, 9, 12].into_iter().collect();
    /// assert_eq!(set.successor(0), Some(3));
    /// assert_eq!(set.successor(3), Some(9));
    /// assert_eq!(set.successor(10), Some(12));
    /// assert_eq!(set.successor(12), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log log U)
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn successor(&self, key: u64) -> Option<u64> {
        let min = self.min?;
        let max = self.max.unwrap_or(min);
        if key >= max {
            return None;
        }
        if key < min {
            return Some(min);
        }
        let Some(branches) = self.branches.as_deref() else {
            return Some(max);
        };

        let (high, low) = self.universe.split(key);
        if let Some(cluster) = branches.clusters[high].as_deref()
            && cluster.max().is_some_and(|cluster_max| low < cluster_max)
        {
            return cluster.successor(low).map(|low| self.universe.join(high, low));
        }
        match branches.summary.successor(high as u64) {
            Some(next) => {
                let next = next as usize;
                branches.cluster(next).min.map(|low| self.universe.join(next, low))
            }
            None => Some(max),
        }
    }

    /// Gets an iterator over the keys of the set, in ascending order.
    ///
    /// Every step is a [`successor`](VebSet::successor) query.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            set: self,
            next: self.min,
            remaining: self.len,
        }
    }

    /// Retains only the keys specified by the predicate.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::VebSet;
    ///
    /// let mut set: VebSet = (0..10).collect();
    /// set.retain(|key| key % 3 == 0);
    /// assert!(set.iter().eq([0, 3, 6, 9]));
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(u64) -> bool,
    {
        let mut next = self.min;
        while let Some(key) = next {
            next = self.successor(key);
            if !f(key) {
                self.remove_unchecked(key);
            }
        }
    }
}

impl PartialEq for VebSet {
    fn eq(&self, other: &VebSet) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for VebSet {}

impl fmt::Debug for VebSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Default for VebSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects into a set over the full 32-bit universe.
///
/// # Panics
///
/// Panics if a key does not fit in 32 bits.
impl FromIterator<u64> for VebSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut set = VebSet::new();
        set.extend(iter);
        set
    }
}

/// # Panics
///
/// Panics if a key does not fit in the set's universe.
impl Extend<u64> for VebSet {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        for key in iter {
            if let Err(error) = self.insert(key) {
                panic!("`VebSet::extend()` - {error}");
            }
        }
    }
}

impl<'a> IntoIterator for &'a VebSet {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let key = self.next?;
        self.next = self.set.successor(key);
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl FusedIterator for Iter<'_> {}

impl Clone for Iter<'_> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl fmt::Debug for Iter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
