use alloc::boxed::Box;
use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::VebError;
use crate::veb_set::VebSet;

/// The largest universe bit-width a [`VebSet`] or [`VebMap`](crate::VebMap) accepts.
///
/// A structure with `bits` bits holds keys in `[0, 2^bits)`. Each level that holds three or more
/// keys keeps an array of `2^(bits / 2)` cluster slots, which is what caps the width.
pub const MAX_BITS: u32 = 32;

/// The key domain `[0, 2^bits)` of one VEB level.
///
/// A key splits into `bits / 2` high bits, selecting a cluster, and the remaining low bits,
/// addressing a position inside that cluster. Cluster and summary levels get their own,
/// roughly halved, universes, so recursion depth is `log2(bits)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Universe {
    bits: u32,
}

impl Universe {
    /// The widest universe; the default for new structures.
    pub(crate) const FULL: Self = Self { bits: MAX_BITS };

    pub(crate) fn new(bits: u32) -> Result<Self, VebError> {
        if bits == 0 || bits > MAX_BITS {
            debug!(bits, "rejected universe bit-width");
            return Err(VebError::InvalidWidth { bits, max: MAX_BITS });
        }
        Ok(Self { bits })
    }

    #[inline]
    pub(crate) const fn bits(self) -> u32 {
        self.bits
    }

    #[inline]
    const fn high_bits(self) -> u32 {
        self.bits / 2
    }

    #[inline]
    const fn low_bits(self) -> u32 {
        self.bits - self.high_bits()
    }

    #[inline]
    pub(crate) const fn contains(self, key: u64) -> bool {
        key >> self.bits == 0
    }

    /// Rejects keys outside the universe.
    pub(crate) fn check(self, key: u64) -> Result<(), VebError> {
        if self.contains(key) {
            return Ok(());
        }
        debug!(key, bits = self.bits, "rejected key outside universe");
        Err(VebError::OutOfDomain { key, bits: self.bits })
    }

    /// Splits `key` into its cluster index and its position inside that cluster.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn split(self, key: u64) -> (usize, u64) {
        let low_bits = self.low_bits();
        ((key >> low_bits) as usize, key & ((1 << low_bits) - 1))
    }

    /// Inverse of [`Universe::split`].
    #[inline]
    pub(crate) const fn join(self, high: usize, low: u64) -> u64 {
        ((high as u64) << self.low_bits()) | low
    }

    /// Universe of each cluster.
    #[inline]
    pub(crate) const fn cluster(self) -> Self {
        Self { bits: self.low_bits() }
    }

    /// Universe of the summary, which stores cluster indices.
    #[inline]
    pub(crate) const fn summary(self) -> Self {
        Self { bits: self.high_bits() }
    }

    #[inline]
    pub(crate) const fn cluster_count(self) -> usize {
        1 << self.high_bits()
    }
}

/// The recursive part of a VEB level: a summary of which clusters are non-empty, and the
/// clusters themselves.
///
/// Only allocated while the level holds an element strictly between its min and max. A cluster
/// slot is `None` exactly when the summary does not contain its index.
#[derive(Clone)]
pub(crate) struct Branches<T> {
    pub(crate) summary: VebSet,
    pub(crate) clusters: Box<[Option<Box<T>>]>,
}

impl<T> Branches<T> {
    pub(crate) fn new(universe: Universe) -> Self {
        let count = universe.cluster_count();
        trace!(bits = universe.bits(), clusters = count, "allocating clusters");
        let mut clusters = Vec::with_capacity(count);
        clusters.resize_with(count, || None);
        Self {
            summary: VebSet::empty(universe.summary()),
            clusters: clusters.into_boxed_slice(),
        }
    }

    /// The cluster at `high`, which the summary says is non-empty.
    pub(crate) fn cluster(&self, high: usize) -> &T {
        self.clusters[high].as_deref().expect("`Branches::cluster()` - summary names an absent cluster!")
    }

    /// Index of the first (`first == true`) or last non-empty cluster.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn edge_cluster(&self, first: bool) -> usize {
        let high = if first { self.summary.min() } else { self.summary.max() };
        high.expect("`Branches::edge_cluster()` - summary is empty!") as usize
    }

    /// Drops the cluster at `high` after it became empty.
    pub(crate) fn release(&mut self, high: usize) {
        trace!(high, "releasing empty cluster");
        self.clusters[high] = None;
        self.summary.remove_unchecked(high as u64);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 0, 1)]
    #[case(2, 1, 1)]
    #[case(3, 1, 2)]
    #[case(8, 4, 4)]
    #[case(32, 16, 16)]
    fn split_widths(#[case] bits: u32, #[case] summary: u32, #[case] cluster: u32) {
        let universe = Universe::new(bits).expect("valid width");
        assert_eq!(universe.summary().bits(), summary);
        assert_eq!(universe.cluster().bits(), cluster);
        assert_eq!(universe.cluster_count(), 1 << summary);
    }

    #[test]
    fn split_and_join_are_inverse() {
        let universe = Universe::new(8).expect("valid width");
        assert_eq!(universe.split(0xA7), (0xA, 0x7));
        assert_eq!(universe.join(0xA, 0x7), 0xA7);

        let odd = Universe::new(5).expect("valid width");
        for key in 0..32 {
            let (high, low) = odd.split(key);
            assert!(high < odd.cluster_count());
            assert!(odd.cluster().contains(low));
            assert_eq!(odd.join(high, low), key);
        }
    }

    #[test]
    fn domain_checks() {
        let universe = Universe::new(8).expect("valid width");
        assert!(universe.contains(255));
        assert!(!universe.contains(256));
        assert_eq!(universe.check(255), Ok(()));
        assert_eq!(universe.check(256), Err(VebError::OutOfDomain { key: 256, bits: 8 }));
        assert!(Universe::FULL.contains(u64::from(u32::MAX)));
        assert!(!Universe::FULL.contains(1 << 32));
    }

    #[rstest]
    #[case(0)]
    #[case(33)]
    #[case(64)]
    fn unsupported_widths(#[case] bits: u32) {
        assert_eq!(Universe::new(bits), Err(VebError::InvalidWidth { bits, max: MAX_BITS }));
    }
}
