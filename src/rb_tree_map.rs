use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::Index;

use crate::raw::{Arena, Node, RawRbTreeMap, Side, Traversal};

mod cursor;

pub use cursor::Cursor;

/// An ordered map based on a [red-black tree].
///
/// Given a key type with a [total order], the map stores its entries in key order. Every
/// lookup, insertion and removal is O(log n): after each mutation the tree is recoloured and
/// rotated so that no red node has a red child and every root-to-leaf path crosses the same
/// number of black nodes, which bounds the height at `2 * log2(n + 1)`.
///
/// Nodes live in an arena and carry no parent links. Rebalancing walks back up the explicit
/// root-to-node path recorded on the way down.
///
/// The map keeps a version counter that every mutation bumps. Borrowing iterators such as
/// [`RbTreeMap::iter`] cannot outlive a mutation, but a detached [`Cursor`] can; it compares the
/// counter on every step and reports [`CursorError::Stale`](crate::CursorError::Stale) instead of
/// yielding from a tree that changed under it.
///
/// It is a logic error for a key to be modified in such a way that the key's ordering relative to
/// any other key, as determined by the [`Ord`] trait, changes while it is in the map.
///
/// # Examples
///
/// ```
/// use ordtree::RbTreeMap;
///
/// let mut map = RbTreeMap::new();
/// map.insert(10, "a");
/// map.insert(20, "b");
/// map.insert(5, "c");
/// map.insert(15, "d");
///
/// let entries: Vec<_> = map.iter().collect();
/// assert_eq!(entries, [(&5, &"c"), (&10, &"a"), (&15, &"d"), (&20, &"b")]);
///
/// assert_eq!(map.remove(&10), Some("a"));
/// assert_eq!(map.get(&10), None);
/// assert_eq!(map.successor(&5), Some((&15, &"d")));
/// ```
///
/// [red-black tree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
/// [total order]: https://en.wikipedia.org/wiki/Total_order
#[derive(Clone)]
pub struct RbTreeMap<K, V> {
    raw: RawRbTreeMap<K, V>,
}

/// An iterator over the entries of a `RbTreeMap`, in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`RbTreeMap`].
///
/// [`iter`]: RbTreeMap::iter
pub struct Iter<'a, K, V> {
    tree: &'a RawRbTreeMap<K, V>,
    traversal: Traversal,
    remaining: usize,
}

/// A mutable iterator over the entries of a `RbTreeMap`, in ascending key order.
///
/// This `struct` is created by the [`iter_mut`] method on [`RbTreeMap`].
///
/// [`iter_mut`]: RbTreeMap::iter_mut
pub struct IterMut<'a, K, V> {
    slots: *mut Option<Node<K, V>>,
    traversal: Traversal,
    remaining: usize,
    _marker: PhantomData<&'a mut RawRbTreeMap<K, V>>,
}

/// An owning iterator over the entries of a `RbTreeMap`, in ascending key order.
///
/// This `struct` is created by the [`into_iter`] method on [`RbTreeMap`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of a `RbTreeMap`.
///
/// This `struct` is created by the [`keys`] method on [`RbTreeMap`].
///
/// [`keys`]: RbTreeMap::keys
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `RbTreeMap`.
///
/// This `struct` is created by the [`values`] method on [`RbTreeMap`].
///
/// [`values`]: RbTreeMap::values
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> RbTreeMap<K, V> {
    /// Makes a new, empty `RbTreeMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        RbTreeMap {
            raw: RawRbTreeMap::new(),
        }
    }

    /// Returns the number of elements in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the map, removing all elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::RbTreeMap;
    ///
    /// let mut a = RbTreeMap::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the map's mutation counter.
    ///
    /// Every insertion, overwrite, removal, `clear`, `get_mut` hit, `iter_mut` and
    /// [`Cursor::set_value`] increments it. Lookups that change nothing leave it alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// let before = map.version();
    /// map.insert(1, "a");
    /// assert!(map.version() > before);
    /// ```
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.raw.version()
    }

    /// Returns the first key-value pair in the map.
    /// The key in this pair is the minimum key in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.entry_at(self.raw.extreme(Side::Left))
    }

    /// Returns the last key-value pair in the map.
    /// The key in this pair is the maximum key in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.entry_at(self.raw.extreme(Side::Right))
    }

    fn entry_at(&self, link: Option<crate::raw::Handle>) -> Option<(&K, &V)> {
        let node = self.raw.node(link?);
        Some((&node.key, &node.value))
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::RbTreeMap;
    ///
    /// let map = RbTreeMap::from([(3, "c"), (2, "b"), (1, "a")]);
    /// let keys: Vec<_> = map.iter().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1) to create the iterator; amortized O(1) per step, O(log n) stack space.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: &self.raw,
            traversal: Traversal::new(self.raw.root()),
            remaining: self.raw.len(),
        }
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    ///
    /// Creating the iterator counts as a value mutation and bumps the map's version.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::from([("a", 1), ("b", 2), ("c", 3)]);
    ///
    /// for (key, value) in map.iter_mut() {
    ///     if key != &"a" {
    ///         *value += 10;
    ///     }
    /// }
    /// assert_eq!(map[&"b"], 12);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.raw.touch();
        IterMut {
            traversal: Traversal::new(self.raw.root()),
            remaining: self.raw.len(),
            slots: self.raw.node_slots_ptr(),
            _marker: PhantomData,
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Opens a detached, version-checked cursor positioned before the first entry.
    ///
    /// The cursor borrows nothing between steps, so the map may be mutated while it is open;
    /// the next step then fails with [`CursorError::Stale`](crate::CursorError::Stale).
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::{CursorError, RbTreeMap};
    ///
    /// let mut map = RbTreeMap::from([(1, "a"), (2, "b")]);
    /// let mut cursor = map.cursor();
    /// assert_eq!(cursor.next(&map), Ok(Some((&1, &"a"))));
    ///
    /// map.insert(3, "c");
    /// assert!(matches!(cursor.next(&map), Err(CursorError::Stale { .. })));
    /// ```
    pub fn cursor(&self) -> Cursor<K, V> {
        Cursor::new(&self.raw)
    }
}

impl<K: Ord, V> RbTreeMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.entry_at(self.raw.search(key))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// A hit bumps the map's version, since the caller may overwrite the value.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.search(key)?;
        self.raw.touch();
        Some(&mut self.raw.node_mut(handle).value)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned.
    ///
    /// If the map did have this key present, the value is updated, and the old
    /// value is returned. The key is not updated.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.is_empty(), false);
    ///
    /// map.insert(37, "b");
    /// assert_eq!(map.insert(37, "c"), Some("b"));
    /// assert_eq!(map[&37], "c");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value)
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the key
    /// was previously in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key)
    }

    /// Returns the entry with the smallest key strictly greater than `key`.
    ///
    /// `key` itself need not be present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::RbTreeMap;
    ///
    /// let map = RbTreeMap::from([(10, "a"), (20, "b")]);
    /// assert_eq!(map.successor(&0), Some((&10, &"a")));
    /// assert_eq!(map.successor(&10), Some((&20, &"b")));
    /// assert_eq!(map.successor(&20), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn successor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.entry_at(self.raw.successor(key))
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for RbTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq> Eq for RbTreeMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RbTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for RbTreeMap<K, V> {
    fn default() -> Self {
        RbTreeMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RbTreeMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = RbTreeMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for RbTreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for RbTreeMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<K, Q, V> Index<&Q> for RbTreeMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, K, V> IntoIterator for &'a RbTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut RbTreeMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for RbTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// ```
    /// use ordtree::RbTreeMap;
    ///
    /// let map = RbTreeMap::from([(2, "b"), (1, "a")]);
    /// let entries: Vec<_> = map.into_iter().collect();
    /// assert_eq!(entries, [(1, "a"), (2, "b")]);
    /// ```
    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.into_entries().into_iter(),
        }
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let handle = self.traversal.next(|h| tree.links(h))?;
        self.remaining -= 1;
        let node = tree.node(handle);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            traversal: self.traversal.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        let handle = self.traversal.next(|h| {
            // SAFETY: `slots` was taken from a map that stays mutably borrowed for `'a`, and the
            // traversal only reads links of nodes it has not yielded yet.
            let node = unsafe { Arena::get_mut_ptr(slots, h) };
            (node.left(), node.right())
        })?;
        self.remaining -= 1;
        // SAFETY: each node is yielded exactly once, so this is the only reference to it.
        let node: &'a mut Node<K, V> = unsafe { Arena::get_mut_ptr(slots, handle) };
        Some((&node.key, &mut node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

// SAFETY: `IterMut` hands out `&K` and `&mut V` into a map it borrows mutably, exactly like a
// `(&K, &mut V)` pair, so it may cross threads whenever such a pair may.
unsafe impl<K: Sync, V: Send> Send for IterMut<'_, K, V> {}

// SAFETY: a shared `&IterMut` only exposes `remaining`; the bounds match `&mut RawRbTreeMap<K, V>`.
unsafe impl<K: Sync, V: Sync> Sync for IterMut<'_, K, V> {}

impl<K, V> fmt::Debug for IterMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.remaining).finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(Keys { inner: self.inner.clone() }).finish()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(Values { inner: self.inner.clone() }).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec::Vec;

    #[test]
    fn iter_mut_updates_every_value_in_order() {
        let mut map: RbTreeMap<u32, u32> = (0..200).map(|k| (k, k)).collect();
        let mut seen = Vec::new();
        for (key, value) in &mut map {
            seen.push(*key);
            *value *= 3;
        }
        assert_eq!(seen, (0..200).collect::<Vec<_>>());
        assert!(map.iter().all(|(k, v)| *v == k * 3));
        map.raw.validate_invariants();
    }

    #[test]
    fn get_mut_bumps_version_only_on_hit() {
        let mut map = RbTreeMap::from([(1, String::from("a"))]);
        let version = map.version();
        assert!(map.get_mut(&2).is_none());
        assert_eq!(map.version(), version);
        map.get_mut(&1).expect("present").push('b');
        assert_eq!(map.version(), version + 1);
        assert_eq!(map[&1], "ab");
    }

    #[test]
    fn borrowed_lookup_with_str_keys() {
        let mut map: RbTreeMap<String, usize> = RbTreeMap::new();
        for word in ["pear", "apple", "fig"] {
            map.insert(String::from(word), word.len());
        }
        assert_eq!(map.get("fig"), Some(&3));
        assert_eq!(map.successor("fig").map(|(k, _)| k.as_str()), Some("pear"));
        assert_eq!(map.remove("apple"), Some(5));
        assert_eq!(map.keys().map(String::as_str).collect::<Vec<_>>(), ["fig", "pear"]);
    }

    #[test]
    fn iterators_report_exact_length() {
        let map: RbTreeMap<i32, i32> = (0..10).map(|k| (k, -k)).collect();
        let mut iter = map.iter();
        assert_eq!(iter.len(), 10);
        iter.next();
        assert_eq!(iter.len(), 9);
        assert_eq!(map.values().len(), 10);
        assert_eq!(map.clone().into_iter().len(), 10);
    }

    #[test]
    fn debug_lists_entries_in_order() {
        let map = RbTreeMap::from([(2, 'b'), (1, 'a')]);
        assert_eq!(alloc::format!("{map:?}"), "{1: 'a', 2: 'b'}");
        assert_eq!(alloc::format!("{:?}", map.keys()), "[1, 2]");
    }

    #[test]
    fn iterators_cross_threads_like_std() {
        static_assertions::assert_impl_all!(IterMut<'static, i32, i32>: Send, Sync);
        static_assertions::assert_impl_all!(Iter<'static, i32, i32>: Send, Sync);
        static_assertions::assert_impl_all!(RbTreeMap<i32, i32>: Send, Sync);
        static_assertions::assert_not_impl_any!(IterMut<'static, i32, core::cell::Cell<i32>>: Sync);
    }
}
