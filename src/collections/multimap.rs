//! Ordered multimap.

use std::fmt;
use std::ops::RangeBounds;

use super::map::Iter;
use crate::tree::{self, Compare, First, NaturalOrder, RedBlackTree};

/// An ordered map that keeps every inserted entry, including entries with
/// equivalent keys.
///
/// Entries with equivalent keys are kept in insertion order.
///
/// # Examples
///
/// ```rust
/// use ordtree::collections::OrderedMultiMap;
///
/// let mut index = OrderedMultiMap::new();
/// index.insert("fruit", "apple");
/// index.insert("veg", "leek");
/// index.insert("fruit", "pear");
///
/// assert_eq!(index.get_all(&"fruit").collect::<Vec<_>>(), vec![&"apple", &"pear"]);
/// assert_eq!(index.count(&"veg"), 1);
/// ```
pub struct OrderedMultiMap<K, V, C = NaturalOrder> {
    tree: RedBlackTree<(K, V), First, C>,
}

impl<K, V> OrderedMultiMap<K, V> {
    /// Creates an empty multimap ordered by [`Ord`] on keys.
    #[must_use]
    pub fn new() -> Self {
        Self::with_compare(NaturalOrder)
    }
}

impl<K, V, C> OrderedMultiMap<K, V, C> {
    /// Creates an empty multimap ordered by `compare` on keys.
    #[must_use]
    pub fn with_compare(compare: C) -> Self {
        Self {
            tree: RedBlackTree::with_policies(First, compare),
        }
    }

    /// Returns the number of entries, counting every duplicate key.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the multimap holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns an iterator over the entries in key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            inner: self.tree.iter(),
        }
    }

    /// Returns an iterator over the keys in order, repeating duplicates.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.iter().map(|(key, _)| key)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the underlying tree.
    #[must_use]
    pub const fn as_tree(&self) -> &RedBlackTree<(K, V), First, C> {
        &self.tree
    }
}

impl<K, V, C: Compare<K>> OrderedMultiMap<K, V, C> {
    /// Adds an entry after any entries with an equivalent key.
    pub fn insert(&mut self, key: K, value: V) {
        self.tree.insert_equal((key, value));
    }

    /// Returns the values stored under `key`, in insertion order.
    pub fn get_all(&self, key: &K) -> impl DoubleEndedIterator<Item = &V> {
        self.tree.equal_values(key).map(|(_, value)| value)
    }

    /// Returns how many entries have a key equivalent to `key`.
    #[must_use]
    pub fn count(&self, key: &K) -> usize {
        self.tree.count(key)
    }

    /// Returns `true` if any entry has a key equivalent to `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Removes every entry for `key` and returns how many were removed.
    pub fn remove_all(&mut self, key: &K) -> usize {
        self.tree.erase_key(key)
    }

    /// Returns an iterator over the entries whose keys fall within `range`.
    pub fn range<R>(&self, range: R) -> impl DoubleEndedIterator<Item = (&K, &V)>
    where
        R: RangeBounds<K>,
    {
        self.tree.range(range).map(|(key, value)| (key, value))
    }
}

impl<K, V, C: Default> Default for OrderedMultiMap<K, V, C> {
    fn default() -> Self {
        Self::with_compare(C::default())
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for OrderedMultiMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.clone_from(&source.tree);
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for OrderedMultiMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, V: Eq, C> Eq for OrderedMultiMap<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for OrderedMultiMap<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for OrderedMultiMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut multimap = Self::default();
        multimap.extend(iter);
        multimap
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for OrderedMultiMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.tree.extend_equal(iter);
    }
}

impl<K, V, C> IntoIterator for OrderedMultiMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = tree::IntoIter<(K, V), First, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a OrderedMultiMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V, C> serde::Serialize for OrderedMultiMap<K, V, C>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.tree.iter())
    }
}

#[cfg(feature = "serde")]
struct OrderedMultiMapVisitor<K, V, C> {
    marker: std::marker::PhantomData<(K, V, C)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V, C> serde::de::Visitor<'de> for OrderedMultiMapVisitor<K, V, C>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    C: Compare<K> + Default,
{
    type Value = OrderedMultiMap<K, V, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of key-value pairs")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut multimap = OrderedMultiMap::default();
        while let Some((key, value)) = access.next_element()? {
            multimap.insert(key, value);
        }
        Ok(multimap)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, C> serde::Deserialize<'de> for OrderedMultiMap<K, V, C>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    C: Compare<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(OrderedMultiMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}
