//! Iterators over a [`RedBlackTree`].

use std::iter::FusedIterator;

use super::node::NodeIndex;
use super::rbtree::RedBlackTree;

// =============================================================================
// Iter
// =============================================================================

/// A double-ended iterator over the values of a tree, in order.
///
/// Created by [`RedBlackTree::iter`].
pub struct Iter<'a, V, K, C> {
    tree: &'a RedBlackTree<V, K, C>,
    front: Option<NodeIndex>,
    back: Option<NodeIndex>,
    remaining: usize,
}

impl<'a, V, K, C> Iter<'a, V, K, C> {
    pub(crate) const fn new(tree: &'a RedBlackTree<V, K, C>) -> Self {
        Self {
            tree,
            front: tree.leftmost,
            back: tree.rightmost,
            remaining: tree.length,
        }
    }
}

impl<'a, V, K, C> Iterator for Iter<'a, V, K, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front?;
        self.remaining -= 1;
        self.front = self.tree.successor(node);
        Some(&self.tree.arena[node].value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V, K, C> DoubleEndedIterator for Iter<'_, V, K, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back?;
        self.remaining -= 1;
        self.back = self.tree.predecessor(node);
        Some(&self.tree.arena[node].value)
    }
}

impl<V, K, C> ExactSizeIterator for Iter<'_, V, K, C> {}

impl<V, K, C> FusedIterator for Iter<'_, V, K, C> {}

impl<V, K, C> Clone for Iter<'_, V, K, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

// =============================================================================
// Range
// =============================================================================

/// A double-ended iterator over a contiguous run of values.
///
/// Created by [`RedBlackTree::range`], [`RedBlackTree::range_between`] and
/// [`RedBlackTree::equal_values`].
pub struct Range<'a, V, K, C> {
    tree: &'a RedBlackTree<V, K, C>,
    /// Next value from the front; `None` once exhausted.
    front: Option<NodeIndex>,
    /// Next value from the back, inclusive.
    back: Option<NodeIndex>,
}

impl<'a, V, K, C> Range<'a, V, K, C> {
    /// Values from `first` up to, but not including, `last`. `None` is the
    /// end position. `first` must not come after `last`; a span starting at
    /// the end position is empty.
    pub(crate) fn between(
        tree: &'a RedBlackTree<V, K, C>,
        first: Option<NodeIndex>,
        last: Option<NodeIndex>,
    ) -> Self {
        if first.is_none() || first == last {
            return Self::empty(tree);
        }
        let back = match last {
            Some(last) => tree.predecessor(last),
            None => tree.rightmost,
        };
        Self {
            tree,
            front: first,
            back,
        }
    }

    pub(crate) const fn empty(tree: &'a RedBlackTree<V, K, C>) -> Self {
        Self {
            tree,
            front: None,
            back: None,
        }
    }

    fn finish_if_met(&mut self, node: NodeIndex) -> bool {
        if self.front == Some(node) && self.back == Some(node) {
            self.front = None;
            self.back = None;
            true
        } else {
            false
        }
    }
}

impl<'a, V, K, C> Iterator for Range<'a, V, K, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.front?;
        if !self.finish_if_met(node) {
            self.front = self.tree.successor(node);
        }
        Some(&self.tree.arena[node].value)
    }
}

impl<V, K, C> DoubleEndedIterator for Range<'_, V, K, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.back?;
        if !self.finish_if_met(node) {
            self.back = self.tree.predecessor(node);
        }
        Some(&self.tree.arena[node].value)
    }
}

impl<V, K, C> FusedIterator for Range<'_, V, K, C> {}

impl<V, K, C> Clone for Range<'_, V, K, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
        }
    }
}

// =============================================================================
// IntoIter
// =============================================================================

/// An owning iterator over the values of a tree, in order.
///
/// Created by the [`IntoIterator`] implementation of [`RedBlackTree`].
pub struct IntoIter<V, K, C> {
    tree: RedBlackTree<V, K, C>,
}

impl<V, K, C> IntoIter<V, K, C> {
    pub(crate) const fn new(tree: RedBlackTree<V, K, C>) -> Self {
        Self { tree }
    }
}

impl<V, K, C> Iterator for IntoIter<V, K, C> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.tree.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<V, K, C> DoubleEndedIterator for IntoIter<V, K, C> {
    fn next_back(&mut self) -> Option<V> {
        self.tree.pop_last()
    }
}

impl<V, K, C> ExactSizeIterator for IntoIter<V, K, C> {}

impl<V, K, C> FusedIterator for IntoIter<V, K, C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tree_of(values: impl IntoIterator<Item = i32>) -> RedBlackTree<i32> {
        let mut tree: RedBlackTree<i32> = RedBlackTree::new();
        tree.extend_equal(values);
        tree
    }

    #[rstest]
    fn test_iter_is_exact_size() {
        let tree = tree_of([3, 1, 2]);
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.len(), 2);
    }

    #[rstest]
    fn test_iter_meets_in_the_middle() {
        let tree = tree_of(1..=5);
        let mut iter = tree.iter();
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&3));
        assert_eq!(iter.next_back(), None);
        assert_eq!(iter.next(), None);
    }

    #[rstest]
    fn test_iter_rev_on_empty_tree() {
        let tree = tree_of([]);
        assert_eq!(tree.iter().rev().next(), None);
    }

    #[rstest]
    fn test_range_between_positions() {
        let tree = tree_of(1..=6);
        let range = tree
            .range_between(tree.find(&2), tree.find(&5))
            .expect("own positions");
        assert_eq!(range.copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[rstest]
    fn test_range_to_end_position() {
        let tree = tree_of(1..=4);
        let range = tree
            .range_between(tree.find(&3), tree.end())
            .expect("own positions");
        assert_eq!(range.rev().copied().collect::<Vec<_>>(), vec![4, 3]);
    }

    #[rstest]
    fn test_range_meets_in_the_middle() {
        let tree = tree_of(0..10);
        let mut range = tree.range(2..6);
        assert_eq!(range.next(), Some(&2));
        assert_eq!(range.next_back(), Some(&5));
        assert_eq!(range.next_back(), Some(&4));
        assert_eq!(range.next(), Some(&3));
        assert_eq!(range.next(), None);
        assert_eq!(range.next_back(), None);
    }

    #[rstest]
    fn test_equal_values_of_duplicates() {
        let tree = tree_of([4, 2, 4, 1, 4]);
        assert_eq!(tree.equal_values(&4).count(), 3);
        assert_eq!(tree.equal_values(&3).count(), 0);
    }

    #[rstest]
    fn test_into_iter_from_both_ends() {
        let tree = tree_of([5, 3, 1, 4, 2]);
        let mut values = tree.into_iter();
        assert_eq!(values.len(), 5);
        assert_eq!(values.next(), Some(1));
        assert_eq!(values.next_back(), Some(5));
        assert_eq!(values.collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[rstest]
    fn test_borrowed_into_iter_in_for_loop() {
        let tree = tree_of([2, 1]);
        let mut total = 0;
        for value in &tree {
            total += value;
        }
        assert_eq!(total, 3);
    }

    #[rstest]
    fn test_range_starting_at_end_is_empty_from_both_sides() {
        let tree = tree_of(0..10);
        let three = tree.lower_bound_node(&3);
        let mut range = Range::between(&tree, None, three);
        assert_eq!(range.next_back(), None);
        assert_eq!(range.next(), None);
    }
}
