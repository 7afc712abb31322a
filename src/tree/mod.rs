//! The red-black tree engine.
//!
//! This module provides [`RedBlackTree`], an ordered index that keeps its
//! values sorted by a projected key and rebalances with rotations and
//! recoloring:
//!
//! - [`RedBlackTree`]: the tree itself
//! - [`Position`]: a `Copy` handle to a node or to the end position
//! - [`Cursor`]: a borrowing cursor that steps between neighbors
//! - [`Iter`], [`Range`], [`IntoIter`]: in-order iterators
//! - [`KeyOf`] and [`Compare`]: the key extraction and ordering policies
//!
//! # Unique and Equal Insertion
//!
//! The same tree serves containers with unique keys and containers with
//! duplicate keys. The choice is made per call:
//!
//! ```rust
//! use ordtree::tree::RedBlackTree;
//!
//! let mut unique: RedBlackTree<i32> = RedBlackTree::new();
//! unique.extend_unique([3, 1, 3, 2]);
//! assert_eq!(unique.len(), 3);
//!
//! let mut equal: RedBlackTree<i32> = RedBlackTree::new();
//! equal.extend_equal([3, 1, 3, 2]);
//! assert_eq!(equal.len(), 4);
//! assert_eq!(equal.count(&3), 2);
//! ```
//!
//! # Positions
//!
//! Positions survive mutation of other nodes and are checked on every use:
//!
//! ```rust
//! use ordtree::tree::{RedBlackTree, TreeError};
//!
//! let mut tree: RedBlackTree<i32> = RedBlackTree::new();
//! let (five, _) = tree.insert_unique(5);
//! tree.extend_unique(0..100);
//! assert_eq!(tree.get(five), Some(&5));
//!
//! tree.erase(five).unwrap();
//! assert_eq!(tree.erase(five), Err(TreeError::StalePosition));
//! ```

mod cursor;
mod error;
mod iter;
mod node;
mod policy;
mod rbtree;
mod validate;

pub use cursor::{Cursor, Position};
pub use error::{InvariantViolation, TreeError};
pub use iter::{IntoIter, Iter, Range};
pub use node::Color;
pub use policy::{Compare, First, FnCompare, Identity, KeyOf, NaturalOrder, ReverseOrder};
pub use rbtree::RedBlackTree;
#[cfg(feature = "collections")]
pub(crate) use rbtree::Lookup;

static_assertions::assert_impl_all!(Position: Copy, Send, Sync);
static_assertions::assert_impl_all!(RedBlackTree<String>: Send, Sync, Clone);
static_assertions::assert_impl_all!(TreeError: std::error::Error, Send, Sync);
static_assertions::assert_not_impl_any!(RedBlackTree<std::rc::Rc<i32>>: Send, Sync);
