//! The red-black tree engine.
//!
//! [`RedBlackTree`] stores values in an arena of nodes linked by index. The
//! root link and the cached leftmost/rightmost nodes play the role of the
//! classic header node: `begin` and `end` are O(1) and the past-the-end
//! position is the dedicated [`Position`] end variant.
//!
//! # Invariants
//!
//! After every public operation returns:
//! 1. `root` is absent iff the tree is empty
//! 2. `leftmost`/`rightmost` are the minimum/maximum nodes, absent iff empty
//! 3. A red node never has a red parent
//! 4. Every root-to-absent-child path carries the same number of black nodes
//! 5. The root, when present, is black
//! 6. `length` equals the number of nodes reachable from the root
//!
//! [`RedBlackTree::validate`] checks all six.

use std::ops::{Bound, RangeBounds};

use smallvec::SmallVec;

use super::cursor::{Cursor, Position, Target, TreeId};
use super::error::TreeError;
use super::iter::{IntoIter, Iter, Range};
use super::node::{Arena, Color, Direction, Node, NodeIndex};
use super::policy::{Compare, Identity, KeyOf, NaturalOrder};

/// Inline capacity of the explicit traversal stacks. A valid tree of
/// `2^32` nodes is at most 64 levels deep.
pub(crate) const TRAVERSAL_STACK_INLINE: usize = 64;

/// Where a value with a given key would be attached.
#[derive(Clone, Copy, Debug)]
pub(crate) struct InsertionPoint {
    parent: Option<NodeIndex>,
    direction: Direction,
}

/// Result of looking a key up for unique insertion.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Lookup {
    /// A node with an equivalent key.
    Found(NodeIndex),
    /// No equivalent key; the value would be attached here.
    Vacant(InsertionPoint),
}

/// An ordered, arena-backed red-black tree.
///
/// Values are ordered by the key that `K` projects from them, compared with
/// `C`. The same engine backs sets (`Identity`) and maps (`First`), with
/// either unique keys ([`insert_unique`](Self::insert_unique)) or duplicate
/// keys ([`insert_equal`](Self::insert_equal)).
///
/// Positions returned by the tree are plain `Copy` handles. They stay valid
/// across insertions and erasures of other nodes, and every operation that
/// accepts one rejects handles to erased nodes or to another tree.
///
/// # Time Complexity
///
/// | Operation                        | Complexity    |
/// |----------------------------------|---------------|
/// | `insert_unique` / `insert_equal` | O(log N)      |
/// | `erase`                          | O(log N)      |
/// | `find` / `lower_bound` / `upper_bound` | O(log N) |
/// | `count`                          | O(log N + k)  |
/// | `begin` / `end` / `first` / `last` | O(1)        |
/// | `len` / `is_empty`               | O(1)          |
/// | `clear` / `clone`                | O(N)          |
///
/// # Examples
///
/// ```rust
/// use ordtree::tree::RedBlackTree;
///
/// let mut tree: RedBlackTree<i32> = RedBlackTree::new();
/// for value in [10, 20, 5, 15, 25, 1] {
///     tree.insert_unique(value);
/// }
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 5, 10, 15, 20, 25]);
///
/// let position = tree.lower_bound(&12);
/// assert_eq!(tree.get(position), Some(&15));
/// ```
pub struct RedBlackTree<V, K = Identity, C = NaturalOrder> {
    pub(super) arena: Arena<V>,
    pub(super) root: Option<NodeIndex>,
    pub(super) leftmost: Option<NodeIndex>,
    pub(super) rightmost: Option<NodeIndex>,
    pub(super) length: usize,
    pub(super) key_of: K,
    pub(super) compare: C,
    pub(super) id: TreeId,
}

impl<V, K: Default, C: Default> RedBlackTree<V, K, C> {
    /// Creates an empty tree with default policies.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policies(K::default(), C::default())
    }

    /// Creates an empty tree with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut tree = Self::new();
        tree.arena = Arena::with_capacity(capacity);
        tree
    }
}

impl<V, K, C> RedBlackTree<V, K, C> {
    /// Creates an empty tree with the given key extraction and comparison.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::tree::{Identity, RedBlackTree, ReverseOrder};
    ///
    /// let mut tree = RedBlackTree::with_policies(Identity, ReverseOrder);
    /// tree.extend_unique([1, 3, 2]);
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
    /// ```
    #[must_use]
    pub fn with_policies(key_of: K, compare: C) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            leftmost: None,
            rightmost: None,
            length: 0,
            key_of,
            compare,
            id: TreeId::next(),
        }
    }

    /// Returns the number of values in the tree.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree holds no values.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns how many values fit without reallocating node storage.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.length + self.arena.capacity()
    }

    /// Reserves node storage for at least `additional` more values.
    pub fn reserve(&mut self, additional: usize) {
        self.arena.reserve(additional);
    }

    /// Fallible counterpart of [`reserve`](Self::reserve).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::AllocationFailed`] if the storage cannot be
    /// obtained. The tree is unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TreeError> {
        self.arena.try_reserve(additional).map_err(TreeError::from)
    }

    /// Releases unused node storage where possible.
    pub fn shrink_to_fit(&mut self) {
        self.arena.shrink_to_fit();
    }

    /// Returns the comparison policy.
    #[inline]
    pub const fn key_comp(&self) -> &C {
        &self.compare
    }

    /// Returns the key extraction policy.
    #[inline]
    pub const fn key_extractor(&self) -> &K {
        &self.key_of
    }

    /// Returns the position of the smallest value, or [`end`](Self::end)
    /// if the tree is empty.
    #[inline]
    #[must_use]
    pub fn begin(&self) -> Position {
        self.position_of(self.leftmost)
    }

    /// Returns the past-the-end position.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> Position {
        Position::end(self.id)
    }

    /// Returns the smallest value.
    #[must_use]
    pub fn first(&self) -> Option<&V> {
        self.leftmost.map(|node| &self.arena[node].value)
    }

    /// Returns the largest value.
    #[must_use]
    pub fn last(&self) -> Option<&V> {
        self.rightmost.map(|node| &self.arena[node].value)
    }

    /// Returns the value at `position`.
    ///
    /// Returns `None` for the end position, and for positions that are
    /// stale or belong to another tree.
    #[must_use]
    pub fn get(&self, position: Position) -> Option<&V> {
        match self.locate(position) {
            Ok(Some(node)) => Some(&self.arena[node].value),
            _ => None,
        }
    }

    /// Returns the position that follows `position` in order.
    ///
    /// The position after the largest value is the end position, and the end
    /// position is its own successor.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StalePosition`] or [`TreeError::ForeignPosition`]
    /// for handles that do not belong to this tree's live nodes.
    pub fn next_position(&self, position: Position) -> Result<Position, TreeError> {
        let next = self.locate(position)?.and_then(|node| self.successor(node));
        Ok(self.position_of(next))
    }

    /// Returns the position that precedes `position` in order.
    ///
    /// The end position is preceded by the largest value. The smallest value
    /// is preceded by the end position.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StalePosition`] or [`TreeError::ForeignPosition`]
    /// for handles that do not belong to this tree's live nodes.
    pub fn prev_position(&self, position: Position) -> Result<Position, TreeError> {
        let previous = match self.locate(position)? {
            Some(node) => self.predecessor(node),
            None => self.rightmost,
        };
        Ok(self.position_of(previous))
    }

    /// Returns a cursor at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StalePosition`] or [`TreeError::ForeignPosition`]
    /// for handles that do not belong to this tree's live nodes.
    pub fn cursor(&self, position: Position) -> Result<Cursor<'_, V, K, C>, TreeError> {
        let node = self.locate(position)?;
        Ok(Cursor::new(self, node))
    }

    /// Returns a cursor at the smallest value.
    #[must_use]
    pub fn cursor_front(&self) -> Cursor<'_, V, K, C> {
        Cursor::new(self, self.leftmost)
    }

    /// Returns a cursor at the end position.
    #[must_use]
    pub fn cursor_end(&self) -> Cursor<'_, V, K, C> {
        Cursor::new(self, None)
    }

    /// Returns a double-ended iterator over the values in order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V, K, C> {
        Iter::new(self)
    }

    /// Returns an iterator over the values from `first` up to, but not
    /// including, `last`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StalePosition`] or [`TreeError::ForeignPosition`]
    /// if either handle does not belong to this tree's live nodes, and
    /// [`TreeError::InvertedRange`] if `first` comes after `last`.
    pub fn range_between(
        &self,
        first: Position,
        last: Position,
    ) -> Result<Range<'_, V, K, C>, TreeError> {
        let (first, last) = self.locate_span(first, last)?;
        Ok(Range::between(self, first, last))
    }

    /// Removes every value, dropping them children before parents.
    ///
    /// Positions into the tree become stale. Node storage is kept.
    pub fn clear(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        log::trace!("clearing red-black tree of {} nodes", self.length);
        let mut stack: SmallVec<[(NodeIndex, bool); TRAVERSAL_STACK_INLINE]> = SmallVec::new();
        stack.push((root, false));
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                drop(self.arena.release(node));
                continue;
            }
            stack.push((node, true));
            if let Some(right) = self.arena[node].right {
                stack.push((right, false));
            }
            if let Some(left) = self.arena[node].left {
                stack.push((left, false));
            }
        }
        self.root = None;
        self.leftmost = None;
        self.rightmost = None;
        self.length = 0;
    }

    /// Removes and returns the smallest value.
    pub fn pop_first(&mut self) -> Option<V> {
        self.leftmost.map(|node| self.unlink(node))
    }

    /// Removes and returns the largest value.
    pub fn pop_last(&mut self) -> Option<V> {
        self.rightmost.map(|node| self.unlink(node))
    }

    /// Removes the value at `position` and returns it.
    ///
    /// Positions to every other node stay valid, including the in-order
    /// successor that takes over the erased node's place in the tree.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EndPosition`] for the end position, and
    /// [`TreeError::StalePosition`] or [`TreeError::ForeignPosition`] for
    /// handles that do not denote a live node of this tree. The tree is
    /// unchanged in every error case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::tree::RedBlackTree;
    ///
    /// let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    /// tree.extend_unique([1, 2, 3]);
    /// let two = tree.begin();
    /// let two = tree.next_position(two).unwrap();
    ///
    /// assert_eq!(tree.erase(two), Ok(2));
    /// assert!(tree.erase(two).is_err());
    /// ```
    pub fn erase(&mut self, position: Position) -> Result<V, TreeError> {
        let node = self.locate(position)?.ok_or(TreeError::EndPosition)?;
        Ok(self.unlink(node))
    }

    /// Removes the values from `first` up to, but not including, `last`, and
    /// returns how many were removed.
    ///
    /// Erasing from [`begin`](Self::begin) to [`end`](Self::end) clears the
    /// tree in one pass.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StalePosition`] or [`TreeError::ForeignPosition`]
    /// if either handle does not belong to this tree's live nodes, and
    /// [`TreeError::InvertedRange`] if `first` comes after `last`. The tree
    /// is unchanged in every error case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::tree::{RedBlackTree, TreeError};
    ///
    /// let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    /// tree.extend_unique(0..10);
    /// assert_eq!(tree.erase_range(tree.find(&2), tree.find(&5)), Ok(3));
    /// assert_eq!(
    ///     tree.erase_range(tree.find(&7), tree.find(&1)),
    ///     Err(TreeError::InvertedRange)
    /// );
    /// assert_eq!(tree.len(), 7);
    /// ```
    pub fn erase_range(&mut self, first: Position, last: Position) -> Result<usize, TreeError> {
        let (first, last) = self.locate_span(first, last)?;
        if first == self.leftmost && last.is_none() {
            let removed = self.length;
            self.clear();
            return Ok(removed);
        }
        Ok(self.unlink_between(first, last))
    }

    /// Keeps only the values for which `predicate` returns `true`.
    pub fn retain<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&V) -> bool,
    {
        let mut current = self.leftmost;
        while let Some(node) = current {
            current = self.successor(node);
            if !predicate(&self.arena[node].value) {
                self.unlink(node);
            }
        }
    }

    /// Returns mutable references to every value, in order.
    ///
    /// Callers must not change the values' keys.
    #[cfg(feature = "collections")]
    pub(crate) fn values_mut_in_order(&mut self) -> Vec<&mut V> {
        let mut order = Vec::with_capacity(self.length);
        let mut current = self.leftmost;
        while let Some(node) = current {
            order.push(node);
            current = self.successor(node);
        }
        self.arena.values_mut_ordered(&order)
    }

    pub(super) fn position_of(&self, node: Option<NodeIndex>) -> Position {
        match node {
            Some(node) => Position::node(self.id, node.get(), self.arena.generation(node)),
            None => Position::end(self.id),
        }
    }

    /// Resolves a position to a live node, `None` meaning the end position.
    pub(super) fn locate(&self, position: Position) -> Result<Option<NodeIndex>, TreeError> {
        if position.tree() != self.id {
            return Err(TreeError::ForeignPosition);
        }
        match position.target() {
            Target::End => Ok(None),
            Target::Node { slot, generation } => self
                .arena
                .resolve(slot, generation)
                .map(Some)
                .ok_or(TreeError::StalePosition),
        }
    }

    /// Resolves both ends of a half-open span and checks that `first` does
    /// not come after `last`.
    fn locate_span(
        &self,
        first: Position,
        last: Position,
    ) -> Result<(Option<NodeIndex>, Option<NodeIndex>), TreeError> {
        let first = self.locate(first)?;
        let last = self.locate(last)?;
        let ordered = match (first, last) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(first), Some(last)) => self.precedes(first, last),
        };
        if ordered {
            Ok((first, last))
        } else {
            Err(TreeError::InvertedRange)
        }
    }

    /// Returns `true` if `first` is `last` or comes before it in order.
    ///
    /// Compares the two root paths, so it never consults the comparator.
    fn precedes(&self, first: NodeIndex, last: NodeIndex) -> bool {
        if first == last {
            return true;
        }
        let first_path = self.root_path(first);
        let last_path = self.root_path(last);
        let shared = first_path
            .iter()
            .zip(&last_path)
            .take_while(|(left, right)| left == right)
            .count();
        match (first_path.get(shared), last_path.get(shared)) {
            // `first` is an ancestor of `last`.
            (None, Some(&below)) => !self.is_left_child(below),
            // `last` is an ancestor of `first`, or the paths fork.
            (Some(&below), _) => self.is_left_child(below),
            (None, None) => true,
        }
    }

    fn is_left_child(&self, node: NodeIndex) -> bool {
        self.arena[node]
            .parent
            .is_some_and(|parent| self.arena[parent].left == Some(node))
    }

    /// Nodes from the root down to `node`, inclusive.
    fn root_path(&self, node: NodeIndex) -> SmallVec<[NodeIndex; TRAVERSAL_STACK_INLINE]> {
        let mut path: SmallVec<[NodeIndex; TRAVERSAL_STACK_INLINE]> = SmallVec::new();
        let mut current = Some(node);
        while let Some(step) = current {
            path.push(step);
            current = self.arena[step].parent;
        }
        path.reverse();
        path
    }

    #[inline]
    fn is_red(&self, node: Option<NodeIndex>) -> bool {
        node.is_some_and(|node| self.arena[node].color == Color::Red)
    }

    pub(super) fn minimum(&self, mut node: NodeIndex) -> NodeIndex {
        while let Some(left) = self.arena[node].left {
            node = left;
        }
        node
    }

    pub(super) fn maximum(&self, mut node: NodeIndex) -> NodeIndex {
        while let Some(right) = self.arena[node].right {
            node = right;
        }
        node
    }

    /// In-order successor; `None` past the largest node.
    pub(super) fn successor(&self, node: NodeIndex) -> Option<NodeIndex> {
        if let Some(right) = self.arena[node].right {
            return Some(self.minimum(right));
        }
        let mut current = node;
        let mut parent = self.arena[node].parent;
        while let Some(ancestor) = parent
            && self.arena[ancestor].right == Some(current)
        {
            current = ancestor;
            parent = self.arena[ancestor].parent;
        }
        parent
    }

    /// In-order predecessor; `None` before the smallest node.
    pub(super) fn predecessor(&self, node: NodeIndex) -> Option<NodeIndex> {
        if let Some(left) = self.arena[node].left {
            return Some(self.maximum(left));
        }
        let mut current = node;
        let mut parent = self.arena[node].parent;
        while let Some(ancestor) = parent
            && self.arena[ancestor].left == Some(current)
        {
            current = ancestor;
            parent = self.arena[ancestor].parent;
        }
        parent
    }

    /// Points `parent`'s link to `old` (or the root link) at `new`.
    fn replace_child(&mut self, parent: Option<NodeIndex>, old: NodeIndex, new: Option<NodeIndex>) {
        match parent {
            None => self.root = new,
            Some(parent) if self.arena[parent].left == Some(old) => self.arena[parent].left = new,
            Some(parent) => self.arena[parent].right = new,
        }
    }

    /// Moves `node` down toward `direction`.
    fn rotate(&mut self, node: NodeIndex, direction: Direction) {
        match direction {
            Direction::Left => self.rotate_left(node),
            Direction::Right => self.rotate_right(node),
        }
    }

    /// Swaps `node` with its right child. Colors and in-order sequence are
    /// unchanged. A node without a right child is left alone.
    pub(crate) fn rotate_left(&mut self, node: NodeIndex) {
        let Some(pivot) = self.arena[node].right else {
            return;
        };
        let inner = self.arena[pivot].left;
        self.arena[node].right = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(node);
        }
        let parent = self.arena[node].parent;
        self.arena[pivot].parent = parent;
        self.replace_child(parent, node, Some(pivot));
        self.arena[pivot].left = Some(node);
        self.arena[node].parent = Some(pivot);
    }

    /// Swaps `node` with its left child. Colors and in-order sequence are
    /// unchanged. A node without a left child is left alone.
    pub(crate) fn rotate_right(&mut self, node: NodeIndex) {
        let Some(pivot) = self.arena[node].left else {
            return;
        };
        let inner = self.arena[pivot].right;
        self.arena[node].left = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(node);
        }
        let parent = self.arena[node].parent;
        self.arena[pivot].parent = parent;
        self.replace_child(parent, node, Some(pivot));
        self.arena[pivot].right = Some(node);
        self.arena[node].parent = Some(pivot);
    }

    /// Allocates a red node holding `value`, hangs it below `parent` and
    /// restores the red-black rules.
    fn attach(&mut self, parent: Option<NodeIndex>, direction: Direction, value: V) -> NodeIndex {
        let node = self.arena.allocate(Node::new_red(value));
        self.arena[node].parent = parent;
        match parent {
            None => {
                self.root = Some(node);
                self.leftmost = Some(node);
                self.rightmost = Some(node);
            }
            Some(parent) => {
                self.arena[parent].set_child(direction, Some(node));
                match direction {
                    Direction::Left if self.leftmost == Some(parent) => self.leftmost = Some(node),
                    Direction::Right if self.rightmost == Some(parent) => {
                        self.rightmost = Some(node);
                    }
                    _ => {}
                }
            }
        }
        self.length += 1;
        self.rebalance_after_insert(node);
        node
    }

    fn rebalance_after_insert(&mut self, mut node: NodeIndex) {
        while let Some(parent) = self.arena[node].parent
            && self.arena[parent].color == Color::Red
        {
            // A red parent is never the root.
            let Some(grandparent) = self.arena[parent].parent else {
                break;
            };
            let side = if self.arena[grandparent].left == Some(parent) {
                Direction::Left
            } else {
                Direction::Right
            };
            let uncle = self.arena[grandparent].child(side.opposite());

            if let Some(uncle) = uncle
                && self.arena[uncle].color == Color::Red
            {
                self.arena[parent].color = Color::Black;
                self.arena[uncle].color = Color::Black;
                self.arena[grandparent].color = Color::Red;
                node = grandparent;
                continue;
            }

            let mut parent = parent;
            if self.arena[parent].child(side.opposite()) == Some(node) {
                self.rotate(parent, side);
                parent = node;
            }
            self.arena[parent].color = Color::Black;
            self.arena[grandparent].color = Color::Red;
            self.rotate(grandparent, side.opposite());
            break;
        }
        if let Some(root) = self.root {
            self.arena[root].color = Color::Black;
        }
    }

    /// Replaces the subtree at `old` with the subtree at `new` in `old`'s
    /// parent.
    fn transplant(&mut self, old: NodeIndex, new: Option<NodeIndex>) {
        let parent = self.arena[old].parent;
        self.replace_child(parent, old, new);
        if let Some(new) = new {
            self.arena[new].parent = parent;
        }
    }

    /// Splices `target` out of the tree, rebalances, and returns its value.
    pub(super) fn unlink(&mut self, target: NodeIndex) -> V {
        let left = self.arena[target].left;
        let right = self.arena[target].right;
        let mut removed_color = self.arena[target].color;
        let replacement;
        let replacement_parent;

        match (left, right) {
            (None, _) => {
                replacement = right;
                replacement_parent = self.arena[target].parent;
                self.transplant(target, right);
            }
            (Some(_), None) => {
                replacement = left;
                replacement_parent = self.arena[target].parent;
                self.transplant(target, left);
            }
            (Some(left), Some(right)) => {
                // The successor takes over the target's links and color; its
                // value stays in its own node.
                let successor = self.minimum(right);
                removed_color = self.arena[successor].color;
                replacement = self.arena[successor].right;
                if successor == right {
                    replacement_parent = Some(successor);
                } else {
                    replacement_parent = self.arena[successor].parent;
                    self.transplant(successor, replacement);
                    self.arena[successor].right = Some(right);
                    self.arena[right].parent = Some(successor);
                }
                self.transplant(target, Some(successor));
                self.arena[successor].left = Some(left);
                self.arena[left].parent = Some(successor);
                let target_color = self.arena[target].color;
                self.arena[successor].color = target_color;
            }
        }

        if removed_color == Color::Black {
            self.rebalance_after_erase(replacement, replacement_parent);
        }

        if self.leftmost == Some(target) {
            let leftmost = self.root.map(|root| self.minimum(root));
            self.leftmost = leftmost;
        }
        if self.rightmost == Some(target) {
            let rightmost = self.root.map(|root| self.maximum(root));
            self.rightmost = rightmost;
        }
        self.length -= 1;
        self.arena.release(target)
    }

    /// Repairs the black-height deficit at `node`, a child of `parent`.
    fn rebalance_after_erase(&mut self, mut node: Option<NodeIndex>, mut parent: Option<NodeIndex>) {
        while node != self.root && !self.is_red(node) {
            let Some(current_parent) = parent else {
                break;
            };
            let side = if self.arena[current_parent].left == node {
                Direction::Left
            } else {
                Direction::Right
            };
            // The deficit side is one black short, so the sibling exists.
            let Some(mut sibling) = self.arena[current_parent].child(side.opposite()) else {
                break;
            };

            if self.arena[sibling].color == Color::Red {
                self.arena[sibling].color = Color::Black;
                self.arena[current_parent].color = Color::Red;
                self.rotate(current_parent, side);
                let Some(next) = self.arena[current_parent].child(side.opposite()) else {
                    break;
                };
                sibling = next;
            }

            let near = self.arena[sibling].child(side);
            let far = self.arena[sibling].child(side.opposite());
            if !self.is_red(near) && !self.is_red(far) {
                self.arena[sibling].color = Color::Red;
                node = Some(current_parent);
                parent = self.arena[current_parent].parent;
                continue;
            }

            if !self.is_red(far) {
                if let Some(near) = near {
                    self.arena[near].color = Color::Black;
                }
                self.arena[sibling].color = Color::Red;
                self.rotate(sibling, side.opposite());
                let Some(next) = self.arena[current_parent].child(side.opposite()) else {
                    break;
                };
                sibling = next;
            }

            let parent_color = self.arena[current_parent].color;
            self.arena[sibling].color = parent_color;
            self.arena[current_parent].color = Color::Black;
            if let Some(far) = self.arena[sibling].child(side.opposite()) {
                self.arena[far].color = Color::Black;
            }
            self.rotate(current_parent, side);
            node = self.root;
            break;
        }
        if let Some(node) = node {
            self.arena[node].color = Color::Black;
        }
    }

    /// Unlinks every node from `first` up to `last`; `None` is the end.
    fn unlink_between(&mut self, first: Option<NodeIndex>, last: Option<NodeIndex>) -> usize {
        let mut removed = 0;
        let mut current = first;
        while current != last {
            let Some(node) = current else {
                break;
            };
            current = self.successor(node);
            drop(self.unlink(node));
            removed += 1;
        }
        removed
    }

    /// Rebuilds this (empty) tree as a node-for-node copy of `source`.
    fn copy_structure_from(&mut self, source: &Self)
    where
        V: Clone,
    {
        let Some(source_root) = source.root else {
            return;
        };
        log::trace!("copying red-black tree of {} nodes", source.length);
        let clone_node = |source_node: NodeIndex, parent: Option<NodeIndex>| {
            let node = &source.arena[source_node];
            Node {
                value: node.value.clone(),
                color: node.color,
                parent,
                left: None,
                right: None,
            }
        };

        let root = self.arena.allocate(clone_node(source_root, None));
        let mut stack: SmallVec<[(NodeIndex, NodeIndex); TRAVERSAL_STACK_INLINE]> = SmallVec::new();
        stack.push((source_root, root));
        while let Some((source_node, node)) = stack.pop() {
            for direction in [Direction::Left, Direction::Right] {
                if let Some(source_child) = source.arena[source_node].child(direction) {
                    let child = self.arena.allocate(clone_node(source_child, Some(node)));
                    self.arena[node].set_child(direction, Some(child));
                    stack.push((source_child, child));
                }
            }
        }

        self.root = Some(root);
        self.leftmost = Some(self.minimum(root));
        self.rightmost = Some(self.maximum(root));
        self.length = source.length;
    }
}

impl<V, K, C> RedBlackTree<V, K, C>
where
    K: KeyOf<V>,
    C: Compare<K::Key>,
{
    #[inline]
    fn key(&self, node: NodeIndex) -> &K::Key {
        self.key_of.key_of(&self.arena[node].value)
    }

    /// Descends toward `key`, going left only while `key` sorts strictly
    /// before the visited node. Equal keys therefore land after the last
    /// existing equal key.
    fn equal_insertion_point(&self, key: &K::Key) -> (Option<NodeIndex>, Direction) {
        let mut parent = None;
        let mut direction = Direction::Left;
        let mut current = self.root;
        while let Some(node) = current {
            parent = Some(node);
            direction = if self.compare.less(key, self.key(node)) {
                Direction::Left
            } else {
                Direction::Right
            };
            current = self.arena[node].child(direction);
        }
        (parent, direction)
    }

    /// Like [`equal_insertion_point`](Self::equal_insertion_point), but
    /// reports an existing node with an equivalent key instead.
    pub(crate) fn lookup_unique(&self, key: &K::Key) -> Lookup {
        let (parent, direction) = self.equal_insertion_point(key);
        let vacant = Lookup::Vacant(InsertionPoint { parent, direction });
        let Some(attach_to) = parent else {
            return vacant;
        };
        // The largest node not greater than `key` is the only candidate for
        // an equal key.
        let candidate = match direction {
            Direction::Left if self.leftmost == Some(attach_to) => None,
            Direction::Left => self.predecessor(attach_to),
            Direction::Right => Some(attach_to),
        };
        match candidate {
            Some(candidate) if !self.compare.less(self.key(candidate), key) => {
                Lookup::Found(candidate)
            }
            _ => vacant,
        }
    }

    /// Attaches `value` at a point obtained from
    /// [`lookup_unique`](Self::lookup_unique) with no mutation in between.
    pub(crate) fn insert_at(&mut self, point: InsertionPoint, value: V) -> NodeIndex {
        self.attach(point.parent, point.direction, value)
    }

    /// Fallible counterpart of [`insert_at`](Self::insert_at).
    pub(crate) fn try_insert_at(
        &mut self,
        point: InsertionPoint,
        value: V,
    ) -> Result<NodeIndex, TreeError> {
        self.reserve_node()?;
        Ok(self.insert_at(point, value))
    }

    /// Returns the value stored at a live node. Callers must not change the
    /// value's key.
    #[cfg(feature = "collections")]
    pub(crate) fn value_mut(&mut self, node: NodeIndex) -> &mut V {
        &mut self.arena[node].value
    }

    /// Returns the first value with a key equivalent to `key`, mutably.
    /// Callers must not change the value's key.
    #[cfg(feature = "collections")]
    pub(crate) fn find_mut(&mut self, key: &K::Key) -> Option<&mut V> {
        let node = self.find_node(key)?;
        Some(self.value_mut(node))
    }

    /// Inserts `value` unless a value with an equivalent key is present.
    ///
    /// Returns the position of the inserted or already present value, and
    /// whether the insertion happened. On a duplicate, `value` is dropped.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::tree::RedBlackTree;
    ///
    /// let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    /// let (first, inserted) = tree.insert_unique(7);
    /// assert!(inserted);
    ///
    /// let (second, inserted) = tree.insert_unique(7);
    /// assert!(!inserted);
    /// assert_eq!(first, second);
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert_unique(&mut self, value: V) -> (Position, bool) {
        match self.lookup_unique(self.key_of.key_of(&value)) {
            Lookup::Found(existing) => (self.position_of(Some(existing)), false),
            Lookup::Vacant(point) => {
                let node = self.insert_at(point, value);
                (self.position_of(Some(node)), true)
            }
        }
    }

    /// Fallible counterpart of [`insert_unique`](Self::insert_unique).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::AllocationFailed`] if no node storage can be
    /// obtained. The tree is unchanged and `value` is dropped.
    pub fn try_insert_unique(&mut self, value: V) -> Result<(Position, bool), TreeError> {
        match self.lookup_unique(self.key_of.key_of(&value)) {
            Lookup::Found(existing) => Ok((self.position_of(Some(existing)), false)),
            Lookup::Vacant(point) => {
                let node = self.try_insert_at(point, value)?;
                Ok((self.position_of(Some(node)), true))
            }
        }
    }

    /// Inserts `value`, keeping any values with an equivalent key.
    ///
    /// The new value is placed after every existing value with an
    /// equivalent key, so equal keys iterate in insertion order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::tree::{First, NaturalOrder, RedBlackTree};
    ///
    /// let mut tree = RedBlackTree::with_policies(First, NaturalOrder);
    /// tree.insert_equal((1, "a"));
    /// tree.insert_equal((0, "z"));
    /// tree.insert_equal((1, "b"));
    ///
    /// let values: Vec<_> = tree.iter().map(|(_, value)| *value).collect();
    /// assert_eq!(values, vec!["z", "a", "b"]);
    /// ```
    pub fn insert_equal(&mut self, value: V) -> Position {
        let (parent, direction) = self.equal_insertion_point(self.key_of.key_of(&value));
        let node = self.attach(parent, direction, value);
        self.position_of(Some(node))
    }

    /// Fallible counterpart of [`insert_equal`](Self::insert_equal).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::AllocationFailed`] if no node storage can be
    /// obtained. The tree is unchanged and `value` is dropped.
    pub fn try_insert_equal(&mut self, value: V) -> Result<Position, TreeError> {
        let (parent, direction) = self.equal_insertion_point(self.key_of.key_of(&value));
        self.reserve_node()?;
        let node = self.attach(parent, direction, value);
        Ok(self.position_of(Some(node)))
    }

    fn reserve_node(&mut self) -> Result<(), TreeError> {
        self.arena.try_reserve(1).map_err(|error| {
            log::warn!("red-black tree node allocation failed: {error}");
            TreeError::AllocationFailed(error)
        })
    }

    /// Inserts every value with [`insert_unique`](Self::insert_unique) and
    /// returns how many were inserted.
    pub fn extend_unique<I>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = V>,
    {
        values
            .into_iter()
            .map(|value| usize::from(self.insert_unique(value).1))
            .sum()
    }

    /// Inserts every value with [`insert_equal`](Self::insert_equal).
    pub fn extend_equal<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
    {
        for value in values {
            self.insert_equal(value);
        }
    }

    pub(super) fn find_node(&self, key: &K::Key) -> Option<NodeIndex> {
        self.lower_bound_node(key)
            .filter(|&node| !self.compare.less(key, self.key(node)))
    }

    /// First node whose key is not less than `key`.
    pub(super) fn lower_bound_node(&self, key: &K::Key) -> Option<NodeIndex> {
        let mut candidate = None;
        let mut current = self.root;
        while let Some(node) = current {
            if self.compare.less(self.key(node), key) {
                current = self.arena[node].right;
            } else {
                candidate = Some(node);
                current = self.arena[node].left;
            }
        }
        candidate
    }

    /// First node whose key is greater than `key`.
    pub(super) fn upper_bound_node(&self, key: &K::Key) -> Option<NodeIndex> {
        let mut candidate = None;
        let mut current = self.root;
        while let Some(node) = current {
            if self.compare.less(key, self.key(node)) {
                candidate = Some(node);
                current = self.arena[node].left;
            } else {
                current = self.arena[node].right;
            }
        }
        candidate
    }

    /// Returns the position of a value whose key is equivalent to `key`, or
    /// [`end`](Self::end) if there is none.
    ///
    /// With duplicate keys the first one in order is found.
    #[must_use]
    pub fn find(&self, key: &K::Key) -> Position {
        self.position_of(self.find_node(key))
    }

    /// Returns `true` if a value with a key equivalent to `key` is present.
    #[must_use]
    pub fn contains(&self, key: &K::Key) -> bool {
        self.find_node(key).is_some()
    }

    /// Returns the position of the first value whose key is not less than
    /// `key`, or [`end`](Self::end).
    #[must_use]
    pub fn lower_bound(&self, key: &K::Key) -> Position {
        self.position_of(self.lower_bound_node(key))
    }

    /// Returns the position of the first value whose key is greater than
    /// `key`, or [`end`](Self::end).
    #[must_use]
    pub fn upper_bound(&self, key: &K::Key) -> Position {
        self.position_of(self.upper_bound_node(key))
    }

    /// Returns `(lower_bound(key), upper_bound(key))`.
    #[must_use]
    pub fn equal_range(&self, key: &K::Key) -> (Position, Position) {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Returns the number of values with a key equivalent to `key`.
    #[must_use]
    pub fn count(&self, key: &K::Key) -> usize {
        let last = self.upper_bound_node(key);
        Range::between(self, self.lower_bound_node(key), last).count()
    }

    /// Returns an iterator over the values whose keys are equivalent to
    /// `key`, in insertion order for duplicates.
    #[must_use]
    pub fn equal_values(&self, key: &K::Key) -> Range<'_, V, K, C> {
        Range::between(self, self.lower_bound_node(key), self.upper_bound_node(key))
    }

    /// Removes every value with a key equivalent to `key` and returns how
    /// many were removed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::tree::RedBlackTree;
    ///
    /// let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    /// tree.extend_equal([3, 1, 3, 2, 3]);
    /// assert_eq!(tree.erase_key(&3), 3);
    /// assert_eq!(tree.erase_key(&3), 0);
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn erase_key(&mut self, key: &K::Key) -> usize {
        let first = self.lower_bound_node(key);
        let last = self.upper_bound_node(key);
        self.unlink_between(first, last)
    }

    /// Removes every value whose key is equivalent to any of `keys`, and
    /// returns how many were removed.
    pub fn erase_keys<'q, I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = &'q K::Key>,
        K::Key: 'q,
    {
        keys.into_iter().map(|key| self.erase_key(key)).sum()
    }

    /// Returns an iterator over the values whose keys fall within `range`.
    ///
    /// An empty or inverted range yields nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::tree::RedBlackTree;
    ///
    /// let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    /// tree.extend_unique(1..=9);
    /// let middle: Vec<_> = tree.range(3..=5).copied().collect();
    /// assert_eq!(middle, vec![3, 4, 5]);
    /// ```
    pub fn range<R>(&self, range: R) -> Range<'_, V, K, C>
    where
        R: RangeBounds<K::Key>,
    {
        let first = match range.start_bound() {
            Bound::Included(key) => self.lower_bound_node(key),
            Bound::Excluded(key) => self.upper_bound_node(key),
            Bound::Unbounded => self.leftmost,
        };
        let last = match range.end_bound() {
            Bound::Included(key) => self.upper_bound_node(key),
            Bound::Excluded(key) => self.lower_bound_node(key),
            Bound::Unbounded => None,
        };
        match (first, last) {
            (None, _) => Range::empty(self),
            (Some(first_node), Some(last_node))
                if self.compare.less(self.key(last_node), self.key(first_node)) =>
            {
                Range::empty(self)
            }
            _ => Range::between(self, first, last),
        }
    }
}

impl<V, K: Default, C: Default> Default for RedBlackTree<V, K, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone, K: Clone, C: Clone> Clone for RedBlackTree<V, K, C> {
    fn clone(&self) -> Self {
        let mut tree = Self::with_policies(self.key_of.clone(), self.compare.clone());
        tree.arena = Arena::with_capacity(self.length);
        tree.copy_structure_from(self);
        tree
    }

    /// Replaces the contents with a copy of `source`. Positions obtained
    /// from `self` before the call no longer belong to it.
    fn clone_from(&mut self, source: &Self) {
        self.arena.reset();
        self.root = None;
        self.leftmost = None;
        self.rightmost = None;
        self.length = 0;
        self.key_of.clone_from(&source.key_of);
        self.compare.clone_from(&source.compare);
        self.id = TreeId::next();
        self.copy_structure_from(source);
    }
}

impl<V: PartialEq, K, C> PartialEq for RedBlackTree<V, K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<V: Eq, K, C> Eq for RedBlackTree<V, K, C> {}

impl<V: std::hash::Hash, K, C> std::hash::Hash for RedBlackTree<V, K, C> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<V: std::fmt::Debug, K, C> std::fmt::Debug for RedBlackTree<V, K, C> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<V, K, C> IntoIterator for RedBlackTree<V, K, C> {
    type Item = V;
    type IntoIter = IntoIter<V, K, C>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, V, K, C> IntoIterator for &'a RedBlackTree<V, K, C> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V, K, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
