use core::fmt;
use core::marker::PhantomData;
use core::mem;

use tracing::debug;

use super::RbTreeMap;
use crate::CursorError;
use crate::raw::{Handle, RawRbTreeMap, Traversal};

/// A detached, version-checked in-order cursor over a [`RbTreeMap`].
///
/// Unlike [`Iter`](super::Iter), a cursor does not borrow the map between steps: each call
/// takes the map as an argument. The cursor remembers the map's [`version`](RbTreeMap::version)
/// and checks it before doing anything; if the map was mutated in between (through any path
/// other than this cursor's own [`set_value`](Cursor::set_value)) the call fails with
/// [`CursorError::Stale`] and so does every later call.
///
/// A cursor only works with the map that opened it. Handing it any other map, a clone
/// included, fails with [`CursorError::ForeignMap`] without touching either map.
///
/// # Examples
///
/// ```
/// use ordtree::RbTreeMap;
///
/// let mut map = RbTreeMap::from([(1, 10), (2, 20), (3, 30)]);
/// let mut cursor = map.cursor();
///
/// loop {
///     let Some((_, &value)) = cursor.next(&map).unwrap() else { break };
///     if value == 20 {
///         cursor.set_value(&mut map, 200).unwrap();
///     }
/// }
/// assert_eq!(map[&2], 200);
/// ```
pub struct Cursor<K, V> {
    map: u64,
    traversal: Traversal,
    current: Option<Handle>,
    version: u64,
    stale: bool,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Cursor<K, V> {
    pub(super) fn new(raw: &RawRbTreeMap<K, V>) -> Self {
        Cursor {
            map: raw.id(),
            traversal: Traversal::new(raw.root()),
            current: None,
            version: raw.version(),
            stale: false,
            _marker: PhantomData,
        }
    }

    fn check(&mut self, map: &RbTreeMap<K, V>) -> Result<(), CursorError> {
        if map.raw.id() != self.map {
            debug!(opened_on = self.map, given = map.raw.id(), "cursor used with a foreign map");
            return Err(CursorError::ForeignMap);
        }
        let found = map.raw.version();
        if !self.stale && found == self.version {
            return Ok(());
        }
        if !self.stale {
            debug!(expected = self.version, found, "cursor observed a concurrent modification");
            self.stale = true;
        }
        Err(CursorError::Stale {
            expected: self.version,
            found,
        })
    }

    /// Advances to the next entry in ascending key order.
    ///
    /// Returns `Ok(None)` once every entry has been visited.
    ///
    /// # Errors
    ///
    /// - [`CursorError::ForeignMap`] if `map` is not the map that opened this cursor.
    /// - [`CursorError::Stale`] if `map` changed since this cursor last observed it.
    ///
    /// # Complexity
    ///
    /// Amortized O(1)
    pub fn next<'a>(&mut self, map: &'a RbTreeMap<K, V>) -> Result<Option<(&'a K, &'a V)>, CursorError> {
        self.check(map)?;
        let raw = &map.raw;
        self.current = self.traversal.next(|h| raw.links(h));
        Ok(self.current.map(|handle| {
            let node = raw.node(handle);
            (&node.key, &node.value)
        }))
    }

    /// Replaces the value of the entry most recently returned by [`next`](Cursor::next) and
    /// returns the old value.
    ///
    /// The write bumps the map's version and this cursor adopts the new version, so it keeps
    /// working while every other open cursor goes stale.
    ///
    /// # Errors
    ///
    /// - [`CursorError::ForeignMap`] if `map` is not the map that opened this cursor.
    /// - [`CursorError::Stale`] if `map` changed since this cursor last observed it.
    /// - [`CursorError::NoCurrentEntry`] before the first `next` or after the last entry.
    pub fn set_value(&mut self, map: &mut RbTreeMap<K, V>, value: V) -> Result<V, CursorError> {
        self.check(map)?;
        let handle = self.current.ok_or(CursorError::NoCurrentEntry)?;
        let old = mem::replace(&mut map.raw.node_mut(handle).value, value);
        map.raw.touch();
        self.version = map.raw.version();
        Ok(old)
    }

    /// Returns `true` if the next call on this cursor would fail with [`CursorError::Stale`].
    ///
    /// Always `false` for a map other than the one that opened the cursor.
    #[must_use]
    pub fn is_stale(&self, map: &RbTreeMap<K, V>) -> bool {
        map.raw.id() == self.map && (self.stale || self.version != map.raw.version())
    }
}

impl<K, V> fmt::Debug for Cursor<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("map", &self.map)
            .field("current", &self.current)
            .field("version", &self.version)
            .field("stale", &self.stale)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn sample() -> RbTreeMap<i32, i32> {
        (1..=5).map(|k| (k, k * 10)).collect()
    }

    #[test]
    fn walks_every_entry_in_order() {
        let map = sample();
        let mut cursor = map.cursor();
        let mut seen = Vec::new();
        while let Some((key, value)) = cursor.next(&map).expect("not stale") {
            seen.push((*key, *value));
        }
        assert_eq!(seen, [(1, 10), (2, 20), (3, 30), (4, 40), (5, 50)]);
        assert_eq!(cursor.next(&map), Ok(None));
    }

    #[test]
    fn staleness_is_sticky() {
        let mut map = sample();
        let mut cursor = map.cursor();
        cursor.next(&map).expect("not stale");

        let before = map.version();
        map.remove(&4);
        let expected = Err(CursorError::Stale {
            expected: before,
            found: before + 1,
        });
        assert_eq!(cursor.next(&map), expected);
        assert!(cursor.is_stale(&map));
        assert_eq!(cursor.set_value(&mut map, 0), Err(CursorError::Stale { expected: before, found: before + 1 }));
        assert_eq!(cursor.next(&map), expected);
    }

    #[test]
    fn foreign_map_at_same_version_is_rejected() {
        let mut big: RbTreeMap<i32, i32> = (0..100).map(|k| (k, k)).collect();
        let mut small = sample();
        while small.version() < big.version() {
            small.insert(0, 0);
        }
        while big.version() < small.version() {
            big.insert(0, 0);
        }
        assert_eq!(small.version(), big.version());

        let mut cursor = big.cursor();
        assert_eq!(cursor.next(&small), Err(CursorError::ForeignMap));
        assert_eq!(cursor.set_value(&mut small, 0), Err(CursorError::ForeignMap));
        assert!(!cursor.is_stale(&small));
        assert_eq!(small[&1], 10);

        // Rejection leaves the cursor usable on its own map.
        assert_eq!(cursor.next(&big), Ok(Some((&0, &0))));
    }

    #[test]
    fn clone_is_a_foreign_map() {
        let map = sample();
        let copy = map.clone();
        assert_eq!(copy.version(), map.version());
        let mut cursor = map.cursor();
        assert_eq!(cursor.next(&copy), Err(CursorError::ForeignMap));
        assert_eq!(cursor.next(&map), Ok(Some((&1, &10))));
    }

    #[test]
    fn set_value_needs_a_current_entry() {
        let mut map = sample();
        let mut cursor = map.cursor();
        assert_eq!(cursor.set_value(&mut map, 0), Err(CursorError::NoCurrentEntry));
        assert!(!cursor.is_stale(&map));
    }

    #[test]
    fn own_writes_do_not_invalidate() {
        let mut map = sample();
        let mut cursor = map.cursor();
        let mut other = map.cursor();

        cursor.next(&map).expect("not stale");
        assert_eq!(cursor.set_value(&mut map, 11), Ok(10));
        assert_eq!(cursor.next(&map).expect("not stale").map(|(k, _)| *k), Some(2));
        assert!(matches!(other.next(&map), Err(CursorError::Stale { .. })));
        assert_eq!(map[&1], 11);
    }
}
