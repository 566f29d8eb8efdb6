use thiserror::Error;

/// Errors reported by [`VebSet`](crate::VebSet) and [`VebMap`](crate::VebMap).
///
/// Every error is raised before the structure is touched, so a failed call leaves it unchanged.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum VebError {
    /// The key does not fit in the structure's universe `[0, 2^bits)`.
    #[error("key {key} is outside the universe [0, 2^{bits})")]
    OutOfDomain {
        /// The rejected key.
        key: u64,
        /// Bit-width of the universe.
        bits: u32,
    },
    /// The requested bit-width is not supported.
    #[error("bit-width {bits} is outside 1..={max}")]
    InvalidWidth {
        /// The rejected bit-width.
        bits: u32,
        /// The largest supported bit-width.
        max: u32,
    },
}

/// Errors reported by a red-black map [`Cursor`](crate::rb_tree_map::Cursor).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum CursorError {
    /// The map was modified after the cursor last observed it. A stale cursor never recovers.
    #[error("map was modified during iteration (cursor saw version {expected}, map is at {found})")]
    Stale {
        /// The version the cursor was synchronised with.
        expected: u64,
        /// The map's version when the mismatch was detected.
        found: u64,
    },
    /// There is no current entry: `next` has not returned one yet, or the cursor is exhausted.
    #[error("cursor has no current entry")]
    NoCurrentEntry,
    /// The cursor was handed a map other than the one that opened it. Clones count as other maps.
    #[error("cursor was opened on a different map")]
    ForeignMap,
}
