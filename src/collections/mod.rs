//! Ordered associative containers.
//!
//! Each container wraps a [`RedBlackTree`](crate::tree::RedBlackTree) with a
//! fixed key extraction and duplicate policy:
//!
//! - [`OrderedSet`]: unique elements
//! - [`OrderedMultiSet`]: elements with duplicates
//! - [`OrderedMap`]: unique keys mapped to values
//! - [`OrderedMultiMap`]: keys mapped to values, with duplicate keys
//!
//! All four accept a comparison policy, defaulting to
//! [`NaturalOrder`](crate::tree::NaturalOrder).
//!
//! # Examples
//!
//! ```rust
//! use ordtree::collections::{OrderedMap, OrderedMultiSet};
//!
//! let scores: OrderedMap<&str, u32> = [("carol", 7), ("alice", 9), ("bob", 4)]
//!     .into_iter()
//!     .collect();
//! assert_eq!(scores.first_key_value(), Some((&"alice", &9)));
//!
//! let grades: OrderedMultiSet<u32> = scores.values().copied().chain([9]).collect();
//! assert_eq!(grades.count(&9), 2);
//! ```

mod map;
mod multimap;
mod multiset;
mod set;

pub use map::{Iter as MapIter, OrderedMap};
pub use multimap::OrderedMultiMap;
pub use multiset::OrderedMultiSet;
pub use set::OrderedSet;

static_assertions::assert_impl_all!(OrderedMap<String, Vec<u8>>: Send, Sync, Clone, Default);
static_assertions::assert_impl_all!(OrderedSet<u64>: Send, Sync, Clone, Default, Eq);
