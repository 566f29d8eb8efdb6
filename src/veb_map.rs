use core::fmt;
use core::iter::FusedIterator;
use core::mem;

use alloc::boxed::Box;
use tracing::{debug, trace};

use crate::VebError;
use crate::universe::{Branches, Universe};

/// A map from integer keys of a fixed universe to values, based on a [van Emde Boas tree].
///
/// The map mirrors [`VebSet`](crate::VebSet): keys live in `[0, 2^bits)` and every keyed
/// operation, including [`successor`](VebMap::successor), is O(log log U). The smallest and
/// largest entries of each level are stored inline together with their values; a value always
/// travels with its key when the key moves between levels.
///
/// # Examples
///
/// ```
/// use ordtree::VebMap;
///
/// let mut counts = VebMap::new();
/// for key in [1, 4, 3, 3, 5, 7] {
///     match counts.get_mut(key) {
///         Some(count) => *count += 1,
///         None => {
///             counts.insert(key, 1).unwrap();
///         }
///     }
/// }
///
/// assert_eq!(counts.len(), 5);
/// assert_eq!(counts.get(3), Some(&2));
/// assert_eq!(counts.successor(4), Some(5));
/// assert_eq!(counts.iter().collect::<Vec<_>>(), [(1, &1), (3, &2), (4, &1), (5, &1), (7, &1)]);
/// ```
///
/// [van Emde Boas tree]: https://en.wikipedia.org/wiki/Van_Emde_Boas_tree
#[derive(Clone)]
pub struct VebMap<V> {
    universe: Universe,
    len: usize,
    min: Option<Slot<V>>,
    // Only `Some` while `len >= 2`; never shares a key with `min`.
    max: Option<Slot<V>>,
    branches: Option<Box<Branches<VebMap<V>>>>,
}

#[derive(Clone)]
struct Slot<V> {
    key: u64,
    value: V,
}

/// An iterator over the entries of a `VebMap`, in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`VebMap`].
///
/// [`iter`]: VebMap::iter
pub struct Iter<'a, V> {
    map: &'a VebMap<V>,
    next: Option<u64>,
    remaining: usize,
}

/// An iterator over the keys of a `VebMap`.
///
/// This `struct` is created by the [`keys`] method on [`VebMap`].
///
/// [`keys`]: VebMap::keys
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

/// An iterator over the values of a `VebMap`.
///
/// This `struct` is created by the [`values`] method on [`VebMap`].
///
/// [`values`]: VebMap::values
pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<V> VebMap<V> {
    /// Makes a new, empty `VebMap` over the full 32-bit universe.
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> Self {
        Self::empty(Universe::FULL)
    }

    /// Makes a new, empty `VebMap` over the universe `[0, 2^bits)`.
    ///
    /// # Errors
    ///
    /// [`VebError::InvalidWidth`] unless `1 <= bits <= MAX_BITS`.
    pub fn with_bits(bits: u32) -> Result<Self, VebError> {
        Universe::new(bits).map(Self::empty)
    }

    const fn empty(universe: Universe) -> Self {
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

    /// Returns the number of entries in the map.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears the map, removing all entries and releasing every cluster.
    pub fn clear(&mut self) {
        debug!(bits = self.bits(), len = self.len, "clearing van Emde Boas map");
        *self = Self::empty(self.universe);
    }

    fn last_slot(&self) -> Option<&Slot<V>> {
        self.max.as_ref().or(self.min.as_ref())
    }

    /// Returns the smallest key in the map.
    #[must_use]
    pub fn min_key(&self) -> Option<u64> {
        self.min.as_ref().map(|slot| slot.key)
    }

    /// Returns the largest key in the map.
    #[must_use]
    pub fn max_key(&self) -> Option<u64> {
        self.last_slot().map(|slot| slot.key)
    }

    /// Returns the entry with the smallest key.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(u64, &V)> {
        self.min.as_ref().map(|slot| (slot.key, &slot.value))
    }

    /// Returns the entry with the largest key.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(u64, &V)> {
        self.last_slot().map(|slot| (slot.key, &slot.value))
    }

    /// Returns `true` if the map contains a value for `key`.
    #[must_use]
    pub fn contains_key(&self, key: u64) -> bool {
        self.get(key).is_some()
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// Keys outside the universe are never present.
    ///
    /// # Complexity
    ///
    /// O(log log U)
    #[must_use]
    pub fn get(&self, key: u64) -> Option<&V> {
        if !self.universe.contains(key) {
            return None;
        }
        self.get_unchecked(key)
    }

    fn get_unchecked(&self, key: u64) -> Option<&V> {
        let min = self.min.as_ref()?;
        if min.key == key {
            return Some(&min.value);
        }
        if let Some(max) = &self.max
            && max.key == key
        {
            return Some(&max.value);
        }
        let (high, low) = self.universe.split(key);
        self.branches.as_deref()?.clusters[high].as_deref()?.get_unchecked(low)
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::VebMap;
    ///
    /// let mut map = VebMap::with_bits(8).unwrap();
    /// map.insert(42, String::from("a")).unwrap();
    /// map.get_mut(42).unwrap().push('b');
    /// assert_eq!(map.get(42).map(String::as_str), Some("ab"));
    /// ```
    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        if !self.universe.contains(key) {
            return None;
        }
        self.get_mut_unchecked(key)
    }

    fn get_mut_unchecked(&mut self, key: u64) -> Option<&mut V> {
        if self.min.as_ref()?.key == key {
            return self.min.as_mut().map(|slot| &mut slot.value);
        }
        if self.max.as_ref().is_some_and(|slot| slot.key == key) {
            return self.max.as_mut().map(|slot| &mut slot.value);
        }
        let (high, low) = self.universe.split(key);
        self.branches.as_deref_mut()?.clusters[high].as_deref_mut()?.get_mut_unchecked(low)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `Ok(None)` is returned. Otherwise the value is
    /// replaced in place and the old value returned.
    ///
    /// # Errors
    ///
    /// [`VebError::OutOfDomain`] if `key` does not fit in the universe. The map is unchanged.
    ///
    /// # Complexity
    ///
    /// O(log log U)
    pub fn insert(&mut self, key: u64, value: V) -> Result<Option<V>, VebError> {
        self.universe.check(key)?;
        Ok(self.insert_unchecked(key, value))
    }

    fn insert_unchecked(&mut self, key: u64, value: V) -> Option<V> {
        let Some(min) = self.min.as_mut() else {
            self.min = Some(Slot { key, value });
            self.len = 1;
            return None;
        };
        if min.key == key {
            return Some(mem::replace(&mut min.value, value));
        }
        let Some(max) = self.max.as_mut() else {
            let slot = Slot { key, value };
            if key < min.key {
                self.max = self.min.replace(slot);
            } else {
                self.max = Some(slot);
            }
            self.len = 2;
            return None;
        };
        if max.key == key {
            return Some(mem::replace(&mut max.value, value));
        }

        // A new extreme takes the inline slot and the old extreme moves down into a cluster.
        let mut slot = Slot { key, value };
        if key < min.key {
            mem::swap(min, &mut slot);
        } else if key > max.key {
            mem::swap(max, &mut slot);
        }

        let universe = self.universe;
        let branches = self.branches.get_or_insert_with(|| Box::new(Branches::new(universe)));
        let (high, low) = universe.split(slot.key);
        let previous = match branches.clusters[high].as_deref_mut() {
            Some(cluster) => cluster.insert_unchecked(low, slot.value),
            None => {
                trace!(high, "allocating cluster");
                let mut cluster = Self::empty(universe.cluster());
                cluster.insert_unchecked(low, slot.value);
                branches.clusters[high] = Some(Box::new(cluster));
                branches.summary.insert_unchecked(high as u64);
                None
            }
        };
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Removes `key` from the map, returning its value if it was present.
    ///
    /// # Complexity
    ///
    /// O(log log U)
    pub fn remove(&mut self, key: u64) -> Option<V> {
        if !self.universe.contains(key) {
            return None;
        }
        self.remove_unchecked(key)
    }

    fn remove_unchecked(&mut self, key: u64) -> Option<V> {
        let min_key = self.min.as_ref()?.key;
        let Some(max_key) = self.max.as_ref().map(|slot| slot.key) else {
            if key != min_key {
                return None;
            }
            self.len = 0;
            return self.min.take().map(|slot| slot.value);
        };
        if self.len == 2 {
            let removed = if key == min_key {
                mem::replace(&mut self.min, self.max.take())
            } else if key == max_key {
                self.max.take()
            } else {
                return None;
            };
            self.len = 1;
            return removed.map(|slot| slot.value);
        }

        let universe = self.universe;
        let branches = self
            .branches
            .as_deref_mut()
            .expect("`VebMap::remove_unchecked()` - a map with three entries must have clusters!");

        // Removing an extreme pulls the nearest clustered entry up into its slot; that entry is
        // then the one deleted from its cluster.
        let target = if key == min_key {
            let high = branches.edge_cluster(true);
            let low = branches.cluster(high).min_key();
            universe.join(high, low.expect("`VebMap::remove_unchecked()` - empty cluster!"))
        } else if key == max_key {
            let high = branches.edge_cluster(false);
            let low = branches.cluster(high).max_key();
            universe.join(high, low.expect("`VebMap::remove_unchecked()` - empty cluster!"))
        } else {
            key
        };

        let (high, low) = universe.split(target);
        let cluster = branches.clusters[high].as_deref_mut()?;
        let value = cluster.remove_unchecked(low)?;
        if cluster.is_empty() {
            branches.release(high);
        }
        if branches.summary.is_empty() {
            trace!(bits = universe.bits(), "collapsing clusters");
            self.branches = None;
        }
        self.len -= 1;

        let pulled = Slot { key: target, value };
        let removed = if key == min_key {
            self.min.replace(pulled)
        } else if key == max_key {
            self.max.replace(pulled)
        } else {
            Some(pulled)
        };
        removed.map(|slot| slot.value)
    }

    /// Returns the smallest key in the map strictly greater than `key`.
    ///
    /// # Complexity
    ///
    /// O(log log U)
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn successor(&self, key: u64) -> Option<u64> {
        let min = self.min.as_ref()?.key;
        let max = self.max.as_ref().map_or(min, |slot| slot.key);
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
            && cluster.max_key().is_some_and(|cluster_max| low < cluster_max)
        {
            return cluster.successor(low).map(|low| self.universe.join(high, low));
        }
        match branches.summary.successor(high as u64) {
            Some(next) => {
                let next = next as usize;
                branches.cluster(next).min_key().map(|low| self.universe.join(next, low))
            }
            None => Some(max),
        }
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            map: self,
            next: self.min_key(),
            remaining: self.len,
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, V> {
        Values { inner: self.iter() }
    }

    /// Retains only the entries specified by the predicate, which may also update values.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::VebMap;
    ///
    /// let mut map: VebMap<u64> = (0..8).map(|key| (key, 0)).collect();
    /// map.retain(|key, value| {
    ///     *value = key * 10;
    ///     key < 3
    /// });
    /// assert!(map.iter().eq([(0, &0), (1, &10), (2, &20)]));
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(u64, &mut V) -> bool,
    {
        let mut next = self.min_key();
        while let Some(key) = next {
            next = self.successor(key);
            let keep = self.get_mut_unchecked(key).is_none_or(|value| f(key, value));
            if !keep {
                self.remove_unchecked(key);
            }
        }
    }
}

impl<V: PartialEq> PartialEq for VebMap<V> {
    fn eq(&self, other: &VebMap<V>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<V: Eq> Eq for VebMap<V> {}

impl<V: fmt::Debug> fmt::Debug for VebMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Default for VebMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects into a map over the full 32-bit universe. Later values overwrite earlier ones.
///
/// # Panics
///
/// Panics if a key does not fit in 32 bits.
impl<V> FromIterator<(u64, V)> for VebMap<V> {
    fn from_iter<I: IntoIterator<Item = (u64, V)>>(iter: I) -> Self {
        let mut map = VebMap::new();
        map.extend(iter);
        map
    }
}

/// # Panics
///
/// Panics if a key does not fit in the map's universe.
impl<V> Extend<(u64, V)> for VebMap<V> {
    fn extend<I: IntoIterator<Item = (u64, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            if let Err(error) = self.insert(key, value) {
                panic!("`VebMap::extend()` - {error}");
            }
        }
    }
}

impl<'a, V> IntoIterator for &'a VebMap<V> {
    type Item = (u64, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u64, &'a V);

    fn next(&mut self) -> Option<(u64, &'a V)> {
        let key = self.next?;
        self.next = self.map.successor(key);
        self.remaining -= 1;
        let value = self
            .map
            .get_unchecked(key)
            .expect("`veb_map::Iter::next()` - successor produced an absent key!");
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<V> FusedIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Iter {
            map: self.map,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Iter<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<V> Iterator for Keys<'_, V> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<V> FusedIterator for Keys<'_, V> {}

impl<V> fmt::Debug for Keys<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.clone().map(|(key, _)| key)).finish()
    }
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<V> FusedIterator for Values<'_, V> {}

impl<V: fmt::Debug> fmt::Debug for Values<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.clone().map(|(_, value)| value)).finish()
    }
}
