//! # ordtree
//!
//! Ordered associative containers for Rust built on a single red-black tree
//! engine.
//!
//! ## Overview
//!
//! The crate is organized in two layers:
//!
//! - **Tree**: [`tree::RedBlackTree`], an arena-backed red-black tree with
//!   pluggable key extraction and comparison, unique and duplicate insertion,
//!   positions that survive unrelated mutation, and an invariant checker
//! - **Collections**: `OrderedSet`, `OrderedMultiSet`, `OrderedMap` and
//!   `OrderedMultiMap`, thin typed containers over the tree
//!
//! ## Feature Flags
//!
//! - `collections`: The container types (enabled by default)
//! - `serde`: Serialization support for the container types
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use ordtree::prelude::*;
//!
//! let mut tree: RedBlackTree<i32> = RedBlackTree::new();
//! for value in [10, 20, 5, 15, 25, 1] {
//!     tree.insert_unique(value);
//! }
//! assert_eq!(tree.get(tree.lower_bound(&12)), Some(&15));
//! assert!(tree.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use ordtree::prelude::*;
/// ```
pub mod prelude {
    pub use crate::tree::{
        Compare, First, FnCompare, Identity, KeyOf, NaturalOrder, Position, RedBlackTree,
        ReverseOrder, TreeError,
    };

    #[cfg(feature = "collections")]
    pub use crate::collections::*;
}

pub mod tree;

#[cfg(feature = "collections")]
pub mod collections;
