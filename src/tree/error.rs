//! Error types for the red-black tree engine.
//!
//! [`TreeError`] is returned by operations whose failure leaves the tree
//! unchanged: a fallible insertion that could not allocate a node, or a
//! position handle that does not denote a live node of this tree, or a
//! pair of positions given in the wrong order.
//!
//! [`InvariantViolation`] is produced by
//! [`RedBlackTree::validate`](super::RedBlackTree::validate) when the
//! structure no longer satisfies the red-black rules. That only happens
//! when a comparator breaks the strict weak ordering contract.

use std::collections::TryReserveError;

/// Represents errors that can occur when operating on a tree.
///
/// # Examples
///
/// ```rust
/// use ordtree::tree::{RedBlackTree, TreeError};
///
/// let mut tree: RedBlackTree<i32> = RedBlackTree::new();
/// let end = tree.end();
/// assert_eq!(tree.erase(end), Err(TreeError::EndPosition));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Storage for a new node could not be reserved.
    AllocationFailed(TryReserveError),
    /// The position is the past-the-end position, which holds no value.
    EndPosition,
    /// The position refers to a node that has since been erased.
    StalePosition,
    /// The position was obtained from a different tree.
    ForeignPosition,
    /// The first position of a range comes after the last.
    InvertedRange,
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllocationFailed(error) => {
                write!(formatter, "failed to allocate a tree node: {error}")
            }
            Self::EndPosition => write!(formatter, "the end position does not denote a value"),
            Self::StalePosition => {
                write!(formatter, "the position refers to an erased node")
            }
            Self::ForeignPosition => {
                write!(formatter, "the position belongs to a different tree")
            }
            Self::InvertedRange => {
                write!(formatter, "the range starts after it ends")
            }
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AllocationFailed(error) => Some(error),
            _ => None,
        }
    }
}

impl From<TryReserveError> for TreeError {
    fn from(error: TryReserveError) -> Self {
        Self::AllocationFailed(error)
    }
}

/// Describes which structural rule a tree broke.
///
/// Node locations are reported as arena slot numbers, which are stable for
/// the lifetime of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The root node is red.
    RedRoot,
    /// A red node has a red parent.
    RedParentOfRed {
        /// Slot of the red child.
        node: usize,
    },
    /// Two root-to-leaf paths carry different numbers of black nodes.
    BlackHeightMismatch {
        /// Slot of the node with a missing child whose path count differs.
        node: usize,
        /// Black count of the first complete path seen.
        expected: usize,
        /// Black count of the path ending below `node`.
        found: usize,
    },
    /// A child does not point back at its parent.
    BrokenParentLink {
        /// Slot of the child with the wrong parent link.
        node: usize,
    },
    /// In-order traversal found a key smaller than its predecessor.
    OutOfOrder {
        /// Slot of the node that sorts before its predecessor.
        node: usize,
    },
    /// The cached minimum does not match the leftmost node.
    LeftmostMismatch,
    /// The cached maximum does not match the rightmost node.
    RightmostMismatch,
    /// The stored length differs from the number of reachable nodes.
    LengthMismatch {
        /// The length recorded by the tree.
        recorded: usize,
        /// The number of nodes reachable from the root.
        reachable: usize,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RedRoot => write!(formatter, "root node is red"),
            Self::RedParentOfRed { node } => {
                write!(formatter, "red node {node} has a red parent")
            }
            Self::BlackHeightMismatch {
                node,
                expected,
                found,
            } => write!(
                formatter,
                "path below node {node} has {found} black nodes, expected {expected}"
            ),
            Self::BrokenParentLink { node } => {
                write!(formatter, "node {node} does not point back at its parent")
            }
            Self::OutOfOrder { node } => {
                write!(formatter, "node {node} sorts before its in-order predecessor")
            }
            Self::LeftmostMismatch => write!(formatter, "cached minimum is not the leftmost node"),
            Self::RightmostMismatch => {
                write!(formatter, "cached maximum is not the rightmost node")
            }
            Self::LengthMismatch {
                recorded,
                reachable,
            } => write!(
                formatter,
                "recorded length {recorded} but {reachable} nodes are reachable"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}
