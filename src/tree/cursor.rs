//! Positions and cursors.
//!
//! A [`Position`] is a small `Copy` handle naming one node of one tree, or
//! that tree's past-the-end position. It does not borrow the tree, so it can
//! be held across mutations and is re-validated whenever it is used.
//!
//! A [`Cursor`] borrows a tree and walks it one node at a time.

use std::sync::atomic::{AtomicU64, Ordering};

use super::node::NodeIndex;
use super::rbtree::RedBlackTree;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a tree instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct TreeId(u64);

impl TreeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) enum Target {
    Node { slot: usize, generation: u32 },
    End,
}

/// A handle to a value in a [`RedBlackTree`], or to its end position.
///
/// Two positions are equal when they denote the same node of the same tree,
/// regardless of the values stored. A position stays valid until its node is
/// erased or the tree is cleared; afterwards every operation that accepts it
/// reports [`TreeError::StalePosition`](super::TreeError::StalePosition).
///
/// # Examples
///
/// ```rust
/// use ordtree::tree::RedBlackTree;
///
/// let mut tree: RedBlackTree<&str> = RedBlackTree::new();
/// let (banana, _) = tree.insert_unique("banana");
/// tree.insert_unique("apple");
/// tree.insert_unique("cherry");
///
/// assert_eq!(tree.get(banana), Some(&"banana"));
/// assert_eq!(tree.find(&"banana"), banana);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    tree: TreeId,
    target: Target,
}

impl Position {
    #[inline]
    pub(crate) const fn node(tree: TreeId, slot: usize, generation: u32) -> Self {
        Self {
            tree,
            target: Target::Node { slot, generation },
        }
    }

    #[inline]
    pub(crate) const fn end(tree: TreeId) -> Self {
        Self {
            tree,
            target: Target::End,
        }
    }

    #[inline]
    pub(crate) const fn tree(self) -> TreeId {
        self.tree
    }

    #[inline]
    pub(crate) const fn target(self) -> Target {
        self.target
    }

    /// Returns `true` if this is a past-the-end position.
    #[inline]
    #[must_use]
    pub const fn is_end(self) -> bool {
        matches!(self.target, Target::End)
    }
}

/// A borrowing cursor over a [`RedBlackTree`].
///
/// The cursor sits either on a node or on the end position. Moving forward
/// from the largest value reaches the end position, where it stays. Moving
/// backward from the end position reaches the largest value, and moving
/// backward from the smallest value reaches the end position.
///
/// # Examples
///
/// ```rust
/// use ordtree::tree::RedBlackTree;
///
/// let mut tree: RedBlackTree<i32> = RedBlackTree::new();
/// tree.extend_unique([2, 1, 3]);
///
/// let mut cursor = tree.cursor_end();
/// cursor.decrement();
/// assert_eq!(cursor.get(), Some(&3));
/// cursor.decrement();
/// assert_eq!(cursor.get(), Some(&2));
/// cursor.increment();
/// cursor.increment();
/// assert!(cursor.is_end());
/// ```
pub struct Cursor<'a, V, K, C> {
    tree: &'a RedBlackTree<V, K, C>,
    node: Option<NodeIndex>,
}

impl<'a, V, K, C> Cursor<'a, V, K, C> {
    pub(crate) const fn new(tree: &'a RedBlackTree<V, K, C>, node: Option<NodeIndex>) -> Self {
        Self { tree, node }
    }

    /// Returns the value under the cursor, or `None` at the end position.
    #[must_use]
    pub fn get(&self) -> Option<&'a V> {
        let tree = self.tree;
        self.node.map(|node| &tree.arena[node].value)
    }

    /// Returns the position under the cursor.
    #[must_use]
    pub fn position(&self) -> Position {
        self.tree.position_of(self.node)
    }

    /// Returns `true` if the cursor is at the end position.
    #[inline]
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Moves to the in-order successor.
    pub fn increment(&mut self) {
        if let Some(node) = self.node {
            self.node = self.tree.successor(node);
        }
    }

    /// Moves to the in-order predecessor.
    pub fn decrement(&mut self) {
        self.node = match self.node {
            Some(node) => self.tree.predecessor(node),
            None => self.tree.rightmost,
        };
    }
}

impl<V, K, C> Clone for Cursor<'_, V, K, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, K, C> Copy for Cursor<'_, V, K, C> {}

impl<V: std::fmt::Debug, K, C> std::fmt::Debug for Cursor<'_, V, K, C> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_tuple("Cursor").field(&self.get()).finish()
    }
}
