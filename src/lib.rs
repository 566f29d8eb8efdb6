//! Ordered collections for Rust: a red-black tree map and van Emde Boas sets and maps.
//!
//! - [`RbTreeMap`] is a balanced binary search tree for any [`Ord`] key. Lookups, insertions,
//!   removals and successor queries are O(log n). Nodes live in an arena and the tree carries a
//!   version counter, so a detached [`Cursor`](rb_tree_map::Cursor) detects a map that changed
//!   under it and fails with [`CursorError::Stale`] instead of yielding garbage.
//! - [`VebSet`] and [`VebMap`] store integer keys from a fixed universe `[0, 2^bits)`, with
//!   `bits` up to [`MAX_BITS`]. Membership, insertion, removal and successor cost
//!   O(log log U). Sub-structures are allocated lazily and released as soon as they empty.
//!
//! The [`OrderedMap`] and [`OrderedSet`] traits describe the operations the engines share, so
//! code can be written once against either.
//!
//! # Example
//!
//! ```
//! use ordtree::{RbTreeMap, VebMap, VebSet};
//!
//! let mut tree = RbTreeMap::new();
//! tree.insert("pear", 3);
//! tree.insert("apple", 7);
//! assert_eq!(tree.first_key_value(), Some((&"apple", &7)));
//!
//! let mut set = VebSet::with_bits(4).unwrap();
//! for key in [2, 3, 4, 5, 7, 14, 15] {
//!     set.insert(key).unwrap();
//! }
//! assert_eq!(set.successor(7), Some(14));
//! assert!(set.insert(16).is_err());
//!
//! let mut counts = VebMap::new();
//! for key in [1, 4, 3, 3] {
//!     let count = counts.get(key).copied().unwrap_or(0);
//!     counts.insert(key, count + 1).unwrap();
//! }
//! assert_eq!(counts.get(3), Some(&2));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Familiar API** - Method names and iterator types follow `std::collections`
//! - **Structured logging** - Rebalancing and cluster lifecycle events are emitted through
//!   [`tracing`](https://docs.rs/tracing); they cost nothing without a subscriber

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: Mutable iteration over the arena hands out disjoint node borrows through a raw pointer.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![warn(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod ordered;
mod raw;
mod universe;

pub mod rb_tree_map;
pub mod veb_map;
pub mod veb_set;

pub use error::{CursorError, VebError};
pub use ordered::{OrderedMap, OrderedSet};
pub use rb_tree_map::RbTreeMap;
pub use universe::MAX_BITS;
pub use veb_map::VebMap;
pub use veb_set::VebSet;
