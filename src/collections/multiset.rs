//! Ordered multiset.

use std::fmt;
use std::ops::RangeBounds;

use crate::tree::{self, Compare, Identity, NaturalOrder, RedBlackTree};

/// An ordered collection that keeps every inserted element, including
/// equivalent ones.
///
/// Equivalent elements are kept in insertion order.
///
/// # Examples
///
/// ```rust
/// use ordtree::collections::OrderedMultiSet;
///
/// let mut bag: OrderedMultiSet<char> = "banana".chars().collect();
/// assert_eq!(bag.count(&'a'), 3);
/// assert_eq!(bag.len(), 6);
///
/// assert!(bag.remove_one(&'a'));
/// assert_eq!(bag.count(&'a'), 2);
/// assert_eq!(bag.remove_all(&'n'), 2);
/// assert_eq!(bag.iter().collect::<String>(), "aab");
/// ```
pub struct OrderedMultiSet<T, C = NaturalOrder> {
    tree: RedBlackTree<T, Identity, C>,
}

impl<T> OrderedMultiSet<T> {
    /// Creates an empty multiset ordered by [`Ord`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_compare(NaturalOrder)
    }
}

impl<T, C> OrderedMultiSet<T, C> {
    /// Creates an empty multiset ordered by `compare`.
    #[must_use]
    pub fn with_compare(compare: C) -> Self {
        Self {
            tree: RedBlackTree::with_policies(Identity, compare),
        }
    }

    /// Returns the number of elements, counting duplicates.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the multiset holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the smallest element, the earliest inserted among equals.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.first()
    }

    /// Returns the largest element, the latest inserted among equals.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.last()
    }

    /// Returns an iterator over the elements in order.
    #[must_use]
    pub fn iter(&self) -> tree::Iter<'_, T, Identity, C> {
        self.tree.iter()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the underlying tree.
    #[must_use]
    pub const fn as_tree(&self) -> &RedBlackTree<T, Identity, C> {
        &self.tree
    }
}

impl<T, C: Compare<T>> OrderedMultiSet<T, C> {
    /// Adds `value` after any equivalent elements.
    pub fn insert(&mut self, value: T) {
        self.tree.insert_equal(value);
    }

    /// Returns how many elements are equivalent to `value`.
    #[must_use]
    pub fn count(&self, value: &T) -> usize {
        self.tree.count(value)
    }

    /// Returns `true` if an element equivalent to `value` is present.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    /// Removes the earliest inserted element equivalent to `value`,
    /// returning whether one was present.
    pub fn remove_one(&mut self, value: &T) -> bool {
        let position = self.tree.find(value);
        self.tree.erase(position).is_ok()
    }

    /// Removes every element equivalent to `value` and returns how many
    /// were removed.
    pub fn remove_all(&mut self, value: &T) -> usize {
        self.tree.erase_key(value)
    }

    /// Returns an iterator over the elements equivalent to `value`, in
    /// insertion order.
    pub fn equal_range(&self, value: &T) -> tree::Range<'_, T, Identity, C> {
        self.tree.equal_values(value)
    }

    /// Returns an iterator over the elements within `range`.
    pub fn range<R>(&self, range: R) -> tree::Range<'_, T, Identity, C>
    where
        R: RangeBounds<T>,
    {
        self.tree.range(range)
    }
}

impl<T, C: Default> Default for OrderedMultiSet<T, C> {
    fn default() -> Self {
        Self::with_compare(C::default())
    }
}

impl<T: Clone, C: Clone> Clone for OrderedMultiSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.clone_from(&source.tree);
    }
}

impl<T: PartialEq, C> PartialEq for OrderedMultiSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<T: Eq, C> Eq for OrderedMultiSet<T, C> {}

impl<T: fmt::Debug, C> fmt::Debug for OrderedMultiSet<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for OrderedMultiSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut multiset = Self::default();
        multiset.extend(iter);
        multiset
    }
}

impl<T, C: Compare<T>> Extend<T> for OrderedMultiSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tree.extend_equal(iter);
    }
}

impl<T, C> IntoIterator for OrderedMultiSet<T, C> {
    type Item = T;
    type IntoIter = tree::IntoIter<T, Identity, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, T, C> IntoIterator for &'a OrderedMultiSet<T, C> {
    type Item = &'a T;
    type IntoIter = tree::Iter<'a, T, Identity, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize, C> serde::Serialize for OrderedMultiSet<T, C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
struct OrderedMultiSetVisitor<T, C> {
    marker: std::marker::PhantomData<(T, C)>,
}

#[cfg(feature = "serde")]
impl<'de, T, C> serde::de::Visitor<'de> for OrderedMultiSetVisitor<T, C>
where
    T: serde::Deserialize<'de>,
    C: Compare<T> + Default,
{
    type Value = OrderedMultiSet<T, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut multiset = OrderedMultiSet::default();
        while let Some(element) = access.next_element()? {
            multiset.insert(element);
        }
        Ok(multiset)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, C> serde::Deserialize<'de> for OrderedMultiSet<T, C>
where
    T: serde::Deserialize<'de>,
    C: Compare<T> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(OrderedMultiSetVisitor {
            marker: std::marker::PhantomData,
        })
    }
}
