//! Ordered set with unique elements.

use std::fmt;
use std::ops::RangeBounds;

use crate::tree::{self, Compare, Identity, Lookup, NaturalOrder, RedBlackTree};

/// An ordered set of unique elements.
///
/// Elements are kept sorted by `C` (natural order by default). Inserting an
/// element equivalent to one already present leaves the set unchanged.
///
/// # Time Complexity
///
/// | Operation          | Complexity |
/// |--------------------|------------|
/// | `insert`           | O(log N)   |
/// | `remove`           | O(log N)   |
/// | `contains`         | O(log N)   |
/// | `first` / `last`   | O(1)       |
/// | `len`              | O(1)       |
///
/// # Examples
///
/// ```rust
/// use ordtree::collections::OrderedSet;
///
/// let mut set = OrderedSet::new();
/// assert!(set.insert(3));
/// assert!(set.insert(1));
/// assert!(!set.insert(3));
///
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
/// assert_eq!(set.first(), Some(&1));
/// ```
pub struct OrderedSet<T, C = NaturalOrder> {
    tree: RedBlackTree<T, Identity, C>,
}

impl<T> OrderedSet<T> {
    /// Creates an empty set ordered by [`Ord`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_compare(NaturalOrder)
    }
}

impl<T, C> OrderedSet<T, C> {
    /// Creates an empty set ordered by `compare`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::collections::OrderedSet;
    /// use ordtree::tree::ReverseOrder;
    ///
    /// let mut set = OrderedSet::with_compare(ReverseOrder);
    /// set.extend([1, 2, 3]);
    /// assert_eq!(set.first(), Some(&3));
    /// ```
    #[must_use]
    pub fn with_compare(compare: C) -> Self {
        Self {
            tree: RedBlackTree::with_policies(Identity, compare),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the smallest element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.first()
    }

    /// Returns the largest element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.last()
    }

    /// Removes and returns the smallest element.
    pub fn pop_first(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    /// Removes and returns the largest element.
    pub fn pop_last(&mut self) -> Option<T> {
        self.tree.pop_last()
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

    /// Keeps only the elements for which `predicate` returns `true`.
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.tree.retain(predicate);
    }

    /// Returns the comparison policy.
    pub const fn compare(&self) -> &C {
        self.tree.key_comp()
    }

    /// Returns the underlying tree.
    #[must_use]
    pub const fn as_tree(&self) -> &RedBlackTree<T, Identity, C> {
        &self.tree
    }
}

impl<T, C: Compare<T>> OrderedSet<T, C> {
    /// Adds `value`, returning `true` if no equivalent element was present.
    pub fn insert(&mut self, value: T) -> bool {
        self.tree.insert_unique(value).1
    }

    /// Adds `value`, replacing and returning an equivalent element if one
    /// was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::collections::OrderedSet;
    /// use ordtree::tree::FnCompare;
    ///
    /// let by_magnitude = FnCompare::new(|left: &i32, right: &i32| left.abs() < right.abs());
    /// let mut set = OrderedSet::with_compare(by_magnitude);
    /// set.insert(-3);
    /// assert_eq!(set.replace(3), Some(-3));
    /// assert_eq!(set.first(), Some(&3));
    /// ```
    pub fn replace(&mut self, value: T) -> Option<T> {
        match self.tree.lookup_unique(&value) {
            Lookup::Found(node) => Some(std::mem::replace(self.tree.value_mut(node), value)),
            Lookup::Vacant(point) => {
                self.tree.insert_at(point, value);
                None
            }
        }
    }

    /// Returns `true` if an element equivalent to `value` is present.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    /// Returns the stored element equivalent to `value`.
    #[must_use]
    pub fn get(&self, value: &T) -> Option<&T> {
        self.tree.get(self.tree.find(value))
    }

    /// Removes the element equivalent to `value`, returning whether one was
    /// present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.tree.erase_key(value) > 0
    }

    /// Removes and returns the element equivalent to `value`.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let position = self.tree.find(value);
        self.tree.erase(position).ok()
    }

    /// Returns the smallest element not less than `value`.
    #[must_use]
    pub fn lower_bound(&self, value: &T) -> Option<&T> {
        self.tree.get(self.tree.lower_bound(value))
    }

    /// Returns the smallest element greater than `value`.
    #[must_use]
    pub fn upper_bound(&self, value: &T) -> Option<&T> {
        self.tree.get(self.tree.upper_bound(value))
    }

    /// Returns an iterator over the elements within `range`.
    pub fn range<R>(&self, range: R) -> tree::Range<'_, T, Identity, C>
    where
        R: RangeBounds<T>,
    {
        self.tree.range(range)
    }
}

impl<T, C: Default> Default for OrderedSet<T, C> {
    fn default() -> Self {
        Self::with_compare(C::default())
    }
}

impl<T: Clone, C: Clone> Clone for OrderedSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.clone_from(&source.tree);
    }
}

impl<T: PartialEq, C> PartialEq for OrderedSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<T: Eq, C> Eq for OrderedSet<T, C> {}

impl<T: std::hash::Hash, C> std::hash::Hash for OrderedSet<T, C> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.tree.hash(state);
    }
}

impl<T: fmt::Debug, C> fmt::Debug for OrderedSet<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, C> fmt::Display for OrderedSet<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        for (index, element) in self.iter().enumerate() {
            if index > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "}}")
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for OrderedSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::with_compare(C::default());
        set.extend(iter);
        set
    }
}

impl<T, C: Compare<T>> Extend<T> for OrderedSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tree.extend_unique(iter);
    }
}

impl<T, C> IntoIterator for OrderedSet<T, C> {
    type Item = T;
    type IntoIter = tree::IntoIter<T, Identity, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, T, C> IntoIterator for &'a OrderedSet<T, C> {
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
impl<T: serde::Serialize, C> serde::Serialize for OrderedSet<T, C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
struct OrderedSetVisitor<T, C> {
    marker: std::marker::PhantomData<(T, C)>,
}

#[cfg(feature = "serde")]
impl<'de, T, C> serde::de::Visitor<'de> for OrderedSetVisitor<T, C>
where
    T: serde::Deserialize<'de>,
    C: Compare<T> + Default,
{
    type Value = OrderedSet<T, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut set = OrderedSet::with_compare(C::default());
        while let Some(element) = access.next_element()? {
            set.insert(element);
        }
        Ok(set)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, C> serde::Deserialize<'de> for OrderedSet<T, C>
where
    T: serde::Deserialize<'de>,
    C: Compare<T> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(OrderedSetVisitor {
            marker: std::marker::PhantomData,
        })
    }
}
