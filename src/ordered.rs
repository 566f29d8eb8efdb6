//! Capability traits shared by the ordered engines.
//!
//! Code written against [`OrderedMap`] or [`OrderedSet`] runs unchanged on a red-black tree or a
//! van Emde Boas structure. The traits are meant for static dispatch through generic bounds.

use core::convert::Infallible;

use crate::{RbTreeMap, VebError, VebMap, VebSet};

/// An ordered map from keys to values.
///
/// Keys are passed and returned by value; implementations for non-`Copy` keys clone them out
/// of the map.
///
/// # Examples
///
/// ```
/// use ordtree::{OrderedMap, RbTreeMap, VebMap};
///
/// fn histogram<M: OrderedMap<u64, u32>>(map: &mut M, keys: &[u64]) -> Result<(), M::Error> {
///     for &key in keys {
///         let count = map.get(&key).copied().unwrap_or(0);
///         map.insert(key, count + 1)?;
///     }
///     Ok(())
/// }
///
/// let mut tree = RbTreeMap::new();
/// let mut veb = VebMap::new();
/// histogram(&mut tree, &[1, 4, 3, 3]).unwrap();
/// histogram(&mut veb, &[1, 4, 3, 3]).unwrap();
/// assert_eq!(tree.get(&3), Some(&2));
/// assert_eq!(veb.get(3), Some(&2));
/// ```
pub trait OrderedMap<K, V> {
    /// Why an insertion can be refused.
    type Error;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` has a value.
    fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns the value stored under `key`.
    fn get(&self, key: &K) -> Option<&V>;

    /// Stores `value` under `key`, returning the previous value.
    ///
    /// # Errors
    ///
    /// When the implementation cannot store `key`; the map is then unchanged.
    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, Self::Error>;

    /// Removes `key`, returning its value.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes every entry.
    fn clear(&mut self);

    /// Returns the smallest key.
    fn first_key(&self) -> Option<K>;

    /// Returns the largest key.
    fn last_key(&self) -> Option<K>;

    /// Returns the smallest key strictly greater than `key`.
    fn successor(&self, key: &K) -> Option<K>;
}

/// An ordered set of keys.
pub trait OrderedSet<T> {
    /// Why an insertion can be refused.
    type Error;

    /// Returns the number of keys.
    fn len(&self) -> usize;

    /// Returns `true` if there are no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is in the set.
    fn contains(&self, key: &T) -> bool;

    /// Adds `key`, returning whether it was newly inserted.
    ///
    /// # Errors
    ///
    /// When the implementation cannot store `key`; the set is then unchanged.
    fn insert(&mut self, key: T) -> Result<bool, Self::Error>;

    /// Removes `key`, returning whether it was present.
    fn remove(&mut self, key: &T) -> bool;

    /// Removes every key.
    fn clear(&mut self);

    /// Returns the smallest key.
    fn first(&self) -> Option<T>;

    /// Returns the largest key.
    fn last(&self) -> Option<T>;

    /// Returns the smallest key strictly greater than `key`.
    fn successor(&self, key: &T) -> Option<T>;
}

impl<K: Ord + Clone, V> OrderedMap<K, V> for RbTreeMap<K, V> {
    type Error = Infallible;

    fn len(&self) -> usize {
        RbTreeMap::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        RbTreeMap::contains_key(self, key)
    }

    fn get(&self, key: &K) -> Option<&V> {
        RbTreeMap::get(self, key)
    }

    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, Infallible> {
        Ok(RbTreeMap::insert(self, key, value))
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        RbTreeMap::remove(self, key)
    }

    fn clear(&mut self) {
        RbTreeMap::clear(self);
    }

    fn first_key(&self) -> Option<K> {
        self.first_key_value().map(|(key, _)| key.clone())
    }

    fn last_key(&self) -> Option<K> {
        self.last_key_value().map(|(key, _)| key.clone())
    }

    fn successor(&self, key: &K) -> Option<K> {
        RbTreeMap::successor(self, key).map(|(key, _)| key.clone())
    }
}

impl<V> OrderedMap<u64, V> for VebMap<V> {
    type Error = VebError;

    fn len(&self) -> usize {
        VebMap::len(self)
    }

    fn contains_key(&self, key: &u64) -> bool {
        VebMap::contains_key(self, *key)
    }

    fn get(&self, key: &u64) -> Option<&V> {
        VebMap::get(self, *key)
    }

    fn insert(&mut self, key: u64, value: V) -> Result<Option<V>, VebError> {
        VebMap::insert(self, key, value)
    }

    fn remove(&mut self, key: &u64) -> Option<V> {
        VebMap::remove(self, *key)
    }

    fn clear(&mut self) {
        VebMap::clear(self);
    }

    fn first_key(&self) -> Option<u64> {
        self.min_key()
    }

    fn last_key(&self) -> Option<u64> {
        self.max_key()
    }

    fn successor(&self, key: &u64) -> Option<u64> {
        VebMap::successor(self, *key)
    }
}

impl OrderedSet<u64> for VebSet {
    type Error = VebError;

    fn len(&self) -> usize {
        VebSet::len(self)
    }

    fn contains(&self, key: &u64) -> bool {
        VebSet::contains(self, *key)
    }

    fn insert(&mut self, key: u64) -> Result<bool, VebError> {
        VebSet::insert(self, key)
    }

    fn remove(&mut self, key: &u64) -> bool {
        VebSet::remove(self, *key)
    }

    fn clear(&mut self) {
        VebSet::clear(self);
    }

    fn first(&self) -> Option<u64> {
        self.min()
    }

    fn last(&self) -> Option<u64> {
        self.max()
    }

    fn successor(&self, key: &u64) -> Option<u64> {
        VebSet::successor(self, *key)
    }
}

// A red-black map with unit payloads is a set.
impl<T: Ord + Clone> OrderedSet<T> for RbTreeMap<T, ()> {
    type Error = Infallible;

    fn len(&self) -> usize {
        RbTreeMap::len(self)
    }

    fn contains(&self, key: &T) -> bool {
        RbTreeMap::contains_key(self, key)
    }

    fn insert(&mut self, key: T) -> Result<bool, Infallible> {
        Ok(RbTreeMap::insert(self, key, ()).is_none())
    }

    fn remove(&mut self, key: &T) -> bool {
        RbTreeMap::remove(self, key).is_some()
    }

    fn clear(&mut self) {
        RbTreeMap::clear(self);
    }

    fn first(&self) -> Option<T> {
        self.first_key_value().map(|(key, ())| key.clone())
    }

    fn last(&self) -> Option<T> {
        self.last_key_value().map(|(key, ())| key.clone())
    }

    fn successor(&self, key: &T) -> Option<T> {
        RbTreeMap::successor(self, key).map(|(key, ())| key.clone())
    }
}
