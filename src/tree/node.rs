//! Node storage for the red-black tree.
//!
//! Nodes live in an [`Arena`]: a vector of slots addressed by [`NodeIndex`].
//! Parent and child links are plain indices, so the parent/child cycle needs
//! no shared ownership. Released slots are threaded onto an intrusive free
//! list and reused by later insertions. Every slot carries a generation that
//! is bumped on release, which lets a position detect that its node is gone.

use std::collections::TryReserveError;
use std::ops::{Index, IndexMut};

/// The color of a red-black tree node.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Color {
    /// A red node. Never the parent of another red node.
    Red,
    /// A black node. Counted by the black-height rule.
    Black,
}

/// The side of a parent a child hangs on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Direction {
    Left,
    Right,
}

impl Direction {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Index of a slot in the node arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct NodeIndex(usize);

impl NodeIndex {
    #[inline]
    pub(crate) const fn get(self) -> usize {
        self.0
    }
}

/// A single tree element.
#[derive(Clone, Debug)]
pub(crate) struct Node<V> {
    pub(crate) value: V,
    pub(crate) color: Color,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) left: Option<NodeIndex>,
    pub(crate) right: Option<NodeIndex>,
}

impl<V> Node<V> {
    /// Creates a detached red node.
    pub(crate) const fn new_red(value: V) -> Self {
        Self {
            value,
            color: Color::Red,
            parent: None,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) const fn child(&self, direction: Direction) -> Option<NodeIndex> {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    #[inline]
    pub(crate) const fn set_child(&mut self, direction: Direction, child: Option<NodeIndex>) {
        match direction {
            Direction::Left => self.left = child,
            Direction::Right => self.right = child,
        }
    }
}

#[derive(Clone, Debug)]
enum Slot<V> {
    Occupied { generation: u32, node: Node<V> },
    Vacant { generation: u32, next_free: Option<NodeIndex> },
}

/// Slot storage with an intrusive free list.
#[derive(Clone, Debug)]
pub(crate) struct Arena<V> {
    slots: Vec<Slot<V>>,
    free_head: Option<NodeIndex>,
    occupied: usize,
}

impl<V> Arena<V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            occupied: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            occupied: 0,
        }
    }

    #[inline]
    pub(crate) const fn occupied(&self) -> usize {
        self.occupied
    }

    /// Number of nodes that can be stored without growing the slot vector.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity() - self.occupied
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        let vacant = self.slots.len() - self.occupied;
        self.slots.reserve(additional.saturating_sub(vacant));
    }

    /// Makes room for `additional` more nodes, or reports why it cannot.
    ///
    /// Nothing else changes on failure.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let vacant = self.slots.len() - self.occupied;
        self.slots.try_reserve(additional.saturating_sub(vacant))
    }

    /// Stores `node` in a free slot and returns its index.
    pub(crate) fn allocate(&mut self, node: Node<V>) -> NodeIndex {
        self.occupied += 1;
        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index.0];
            let Slot::Vacant {
                generation,
                next_free,
            } = *slot
            else {
                unreachable!("free list points at an occupied slot");
            };
            self.free_head = next_free;
            *slot = Slot::Occupied { generation, node };
            index
        } else {
            self.slots.push(Slot::Occupied {
                generation: 0,
                node,
            });
            NodeIndex(self.slots.len() - 1)
        }
    }

    /// Removes the node at `index`, returning its value and freeing the slot.
    pub(crate) fn release(&mut self, index: NodeIndex) -> V {
        let slot = &mut self.slots[index.0];
        let Slot::Occupied { generation, .. } = *slot else {
            panic!("release of vacant node slot {}", index.0);
        };
        let vacant = Slot::Vacant {
            generation: generation.wrapping_add(1),
            next_free: self.free_head,
        };
        let Slot::Occupied { node, .. } = std::mem::replace(slot, vacant) else {
            unreachable!();
        };
        self.free_head = Some(index);
        self.occupied -= 1;
        node.value
    }

    /// Returns the generation of an occupied slot.
    pub(crate) fn generation(&self, index: NodeIndex) -> u32 {
        match &self.slots[index.0] {
            Slot::Occupied { generation, .. } => *generation,
            Slot::Vacant { .. } => panic!("generation of vacant node slot {}", index.0),
        }
    }

    /// Resolves a raw slot number and generation to a live node index.
    pub(crate) fn resolve(&self, slot: usize, generation: u32) -> Option<NodeIndex> {
        match self.slots.get(slot)? {
            Slot::Occupied {
                generation: current,
                ..
            } if *current == generation => Some(NodeIndex(slot)),
            _ => None,
        }
    }

    /// Borrows the values of the nodes in `order` mutably, in that order.
    ///
    /// `order` must list every occupied slot exactly once.
    #[cfg(feature = "collections")]
    pub(crate) fn values_mut_ordered(&mut self, order: &[NodeIndex]) -> Vec<&mut V> {
        let mut ranks: Vec<(usize, usize)> = order
            .iter()
            .enumerate()
            .map(|(rank, index)| (index.0, rank))
            .collect();
        ranks.sort_unstable();

        let mut ranked: Vec<(usize, &mut V)> = self
            .slots
            .iter_mut()
            .filter_map(|slot| match slot {
                Slot::Occupied { node, .. } => Some(&mut node.value),
                Slot::Vacant { .. } => None,
            })
            .zip(ranks)
            .map(|(value, (_, rank))| (rank, value))
            .collect();
        ranked.sort_unstable_by_key(|&(rank, _)| rank);
        ranked.into_iter().map(|(_, value)| value).collect()
    }

    /// Drops every slot, keeping the allocation.
    pub(crate) fn reset(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.occupied = 0;
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        if self.occupied == 0 {
            self.reset();
        }
        self.slots.shrink_to_fit();
    }
}

impl<V> Default for Arena<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Index<NodeIndex> for Arena<V> {
    type Output = Node<V>;

    #[inline]
    fn index(&self, index: NodeIndex) -> &Node<V> {
        match &self.slots[index.0] {
            Slot::Occupied { node, .. } => node,
            Slot::Vacant { .. } => panic!("access to vacant node slot {}", index.0),
        }
    }
}

impl<V> IndexMut<NodeIndex> for Arena<V> {
    #[inline]
    fn index_mut(&mut self, index: NodeIndex) -> &mut Node<V> {
        match &mut self.slots[index.0] {
            Slot::Occupied { node, .. } => node,
            Slot::Vacant { .. } => panic!("access to vacant node slot {}", index.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_allocate_appends_when_no_free_slot() {
        let mut arena = Arena::new();
        let first = arena.allocate(Node::new_red(1));
        let second = arena.allocate(Node::new_red(2));
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
        assert_eq!(arena.occupied(), 2);
        assert_eq!(arena[second].value, 2);
    }

    #[rstest]
    fn test_release_recycles_slot_with_new_generation() {
        let mut arena = Arena::new();
        let first = arena.allocate(Node::new_red("a"));
        let generation = arena.generation(first);

        assert_eq!(arena.release(first), "a");
        assert_eq!(arena.resolve(first.get(), generation), None);

        let reused = arena.allocate(Node::new_red("b"));
        assert_eq!(reused, first);
        assert_eq!(arena.generation(reused), generation + 1);
        assert_eq!(arena.resolve(reused.get(), generation + 1), Some(reused));
    }

    #[rstest]
    fn test_free_list_is_last_in_first_out() {
        let mut arena = Arena::new();
        let indices: Vec<_> = (0..4).map(|value| arena.allocate(Node::new_red(value))).collect();
        arena.release(indices[1]);
        arena.release(indices[3]);

        assert_eq!(arena.allocate(Node::new_red(10)), indices[3]);
        assert_eq!(arena.allocate(Node::new_red(11)), indices[1]);
        assert_eq!(arena.allocate(Node::new_red(12)).get(), 4);
    }

    #[rstest]
    fn test_resolve_rejects_out_of_range_slot() {
        let arena: Arena<i32> = Arena::new();
        assert_eq!(arena.resolve(7, 0), None);
    }

    #[rstest]
    fn test_try_reserve_counts_vacant_slots() {
        let mut arena = Arena::new();
        let index = arena.allocate(Node::new_red(0_u8));
        arena.release(index);
        assert!(arena.try_reserve(1).is_ok());
        assert!(arena.try_reserve(usize::MAX).is_err());
        assert_eq!(arena.occupied(), 0);
    }

    #[rstest]
    #[should_panic(expected = "vacant node slot")]
    fn test_index_vacant_slot_panics() {
        let mut arena = Arena::new();
        let index = arena.allocate(Node::new_red(5));
        arena.release(index);
        let _ = &arena[index];
    }

    #[rstest]
    fn test_direction_opposite() {
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
    }

    #[rstest]
    #[cfg(feature = "collections")]
    fn test_values_mut_ordered_skips_vacant_slots() {
        let mut arena = Arena::new();
        let indices: Vec<_> = ["c", "x", "a", "b"]
            .into_iter()
            .map(|value| arena.allocate(Node::new_red(value.to_string())))
            .collect();
        arena.release(indices[1]);
        let order = [indices[2], indices[3], indices[0]];

        let visited: Vec<String> = arena
            .values_mut_ordered(&order)
            .into_iter()
            .map(|value| {
                value.push('!');
                value.clone()
            })
            .collect();
        assert_eq!(visited, vec!["a!", "b!", "c!"]);
        assert_eq!(arena[indices[0]].value, "c!");
    }
}
