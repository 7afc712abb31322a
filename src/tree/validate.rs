//! Structural invariant checking.

use smallvec::SmallVec;

use super::error::InvariantViolation;
use super::node::{Color, NodeIndex};
use super::policy::{Compare, KeyOf};
use super::rbtree::{RedBlackTree, TRAVERSAL_STACK_INLINE};

impl<V, K, C> RedBlackTree<V, K, C>
where
    K: KeyOf<V>,
    C: Compare<K::Key>,
{
    /// Checks every structural invariant and returns the black height.
    ///
    /// The black height is the number of black nodes on each path from the
    /// root to an absent child; it is zero for an empty tree. A tree only
    /// fails this check if its comparator is not a strict weak ordering.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    ///
    /// # Complexity
    ///
    /// O(N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::tree::RedBlackTree;
    ///
    /// let mut tree: RedBlackTree<u32> = RedBlackTree::new();
    /// tree.extend_unique(0..100);
    /// assert!(tree.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        self.check_structure().inspect_err(|violation| {
            log::debug!("red-black tree failed validation: {violation}");
        })
    }

    fn check_structure(&self) -> Result<usize, InvariantViolation> {
        let Some(root) = self.root else {
            if self.length != 0 {
                return Err(InvariantViolation::LengthMismatch {
                    recorded: self.length,
                    reachable: 0,
                });
            }
            if self.leftmost.is_some() {
                return Err(InvariantViolation::LeftmostMismatch);
            }
            if self.rightmost.is_some() {
                return Err(InvariantViolation::RightmostMismatch);
            }
            return Ok(0);
        };

        if self.arena[root].color == Color::Red {
            return Err(InvariantViolation::RedRoot);
        }
        if self.arena[root].parent.is_some() {
            return Err(InvariantViolation::BrokenParentLink { node: root.get() });
        }

        let black_height = self.check_colors_and_links(root)?;
        self.check_order_and_extremes(root)?;
        Ok(black_height)
    }

    /// Depth-first walk checking parent links, red-red pairs and path black
    /// counts. Also bounds the walk by the arena size so a cycle cannot spin.
    fn check_colors_and_links(&self, root: NodeIndex) -> Result<usize, InvariantViolation> {
        let mut expected: Option<usize> = None;
        let mut reachable = 0_usize;
        let mut stack: SmallVec<[(NodeIndex, usize); TRAVERSAL_STACK_INLINE]> = SmallVec::new();
        stack.push((root, 0));

        while let Some((node, blacks_above)) = stack.pop() {
            reachable += 1;
            if reachable > self.arena.occupied() {
                return Err(InvariantViolation::LengthMismatch {
                    recorded: self.length,
                    reachable,
                });
            }

            let current = &self.arena[node];
            let blacks = blacks_above + usize::from(current.color == Color::Black);

            for child in [current.left, current.right] {
                let Some(child) = child else {
                    match expected {
                        None => expected = Some(blacks),
                        Some(expected) if expected != blacks => {
                            return Err(InvariantViolation::BlackHeightMismatch {
                                node: node.get(),
                                expected,
                                found: blacks,
                            });
                        }
                        Some(_) => {}
                    }
                    continue;
                };
                if self.arena[child].parent != Some(node) {
                    return Err(InvariantViolation::BrokenParentLink { node: child.get() });
                }
                if current.color == Color::Red && self.arena[child].color == Color::Red {
                    return Err(InvariantViolation::RedParentOfRed { node: child.get() });
                }
                stack.push((child, blacks));
            }
        }

        if reachable != self.length {
            return Err(InvariantViolation::LengthMismatch {
                recorded: self.length,
                reachable,
            });
        }
        Ok(expected.unwrap_or(0))
    }

    fn check_order_and_extremes(&self, root: NodeIndex) -> Result<(), InvariantViolation> {
        if self.leftmost != Some(self.minimum(root)) {
            return Err(InvariantViolation::LeftmostMismatch);
        }
        if self.rightmost != Some(self.maximum(root)) {
            return Err(InvariantViolation::RightmostMismatch);
        }

        let mut previous = self.minimum(root);
        let mut current = self.successor(previous);
        while let Some(node) = current {
            let previous_key = self.key_of.key_of(&self.arena[previous].value);
            let key = self.key_of.key_of(&self.arena[node].value);
            if self.compare.less(key, previous_key) {
                return Err(InvariantViolation::OutOfOrder { node: node.get() });
            }
            previous = node;
            current = self.successor(node);
        }
        Ok(())
    }
}
