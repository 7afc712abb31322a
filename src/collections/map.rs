//! Ordered map with unique keys.

use std::fmt;
use std::iter::FusedIterator;
use std::ops::RangeBounds;

use crate::tree::{self, Compare, First, Lookup, NaturalOrder, RedBlackTree, TreeError};

/// An ordered map from unique keys to values.
///
/// Entries are stored as `(K, V)` pairs ordered by key. Inserting an
/// existing key replaces its value.
///
/// # Time Complexity
///
/// | Operation                | Complexity |
/// |--------------------------|------------|
/// | `insert`                 | O(log N)   |
/// | `get` / `get_mut`        | O(log N)   |
/// | `remove`                 | O(log N)   |
/// | `first_key_value` / `last_key_value` | O(1) |
/// | `len`                    | O(1)       |
///
/// # Examples
///
/// ```rust
/// use ordtree::collections::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.insert(3, "three");
/// map.insert(1, "one");
/// assert_eq!(map.insert(3, "THREE"), Some("three"));
///
/// assert_eq!(map.get(&3), Some(&"THREE"));
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
/// ```
pub struct OrderedMap<K, V, C = NaturalOrder> {
    tree: RedBlackTree<(K, V), First, C>,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map ordered by [`Ord`] on keys.
    #[must_use]
    pub fn new() -> Self {
        Self::with_compare(NaturalOrder)
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    /// Creates an empty map ordered by `compare` on keys.
    #[must_use]
    pub fn with_compare(compare: C) -> Self {
        Self {
            tree: RedBlackTree::with_policies(First, compare),
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|(key, value)| (key, value))
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|(key, value)| (key, value))
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_first()
    }

    /// Removes and returns the entry with the largest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_last()
    }

    /// Returns an iterator over the entries in key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            inner: self.tree.iter(),
        }
    }

    /// Returns an iterator over the keys in order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values in key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.iter().map(|(_, value)| value)
    }

    /// Returns an iterator over mutable references to the values in key
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::collections::OrderedMap;
    ///
    /// let mut map: OrderedMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    /// for value in map.values_mut() {
    ///     *value *= 10;
    /// }
    /// assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![10, 20]);
    /// ```
    pub fn values_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut V> + ExactSizeIterator {
        self.tree
            .values_mut_in_order()
            .into_iter()
            .map(|(_, value)| value)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the key comparison policy.
    pub const fn compare(&self) -> &C {
        self.tree.key_comp()
    }

    /// Returns the underlying tree.
    #[must_use]
    pub const fn as_tree(&self) -> &RedBlackTree<(K, V), First, C> {
        &self.tree
    }
}

impl<K, V, C: Compare<K>> OrderedMap<K, V, C> {
    /// Inserts `value` under `key`, returning the value it replaced.
    ///
    /// The stored key is kept when a value is replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.tree.lookup_unique(&key) {
            Lookup::Found(node) => Some(std::mem::replace(&mut self.tree.value_mut(node).1, value)),
            Lookup::Vacant(point) => {
                self.tree.insert_at(point, (key, value));
                None
            }
        }
    }

    /// Fallible counterpart of [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::AllocationFailed`] if a new entry is needed and
    /// no node storage can be obtained. The map is unchanged.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, TreeError> {
        match self.tree.lookup_unique(&key) {
            Lookup::Found(node) => Ok(Some(std::mem::replace(
                &mut self.tree.value_mut(node).1,
                value,
            ))),
            Lookup::Vacant(point) => {
                self.tree.try_insert_at(point, (key, value))?;
                Ok(None)
            }
        }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree
            .get(self.tree.find(key))
            .map(|(_, value)| value)
    }

    /// Returns the stored key and value for `key`.
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.tree
            .get(self.tree.find(key))
            .map(|(key, value)| (key, value))
    }

    /// Returns the value stored under `key`, mutably.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.find_mut(key).map(|(_, value)| value)
    }

    /// Returns the value under `key`, inserting `default()` first if the key
    /// is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::collections::OrderedMap;
    ///
    /// let mut counts = OrderedMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_insert_with(word, || 0) += 1;
    /// }
    /// assert_eq!(counts.get(&"a"), Some(&2));
    /// ```
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let node = match self.tree.lookup_unique(&key) {
            Lookup::Found(node) => node,
            Lookup::Vacant(point) => self.tree.insert_at(point, (key, default())),
        };
        &mut self.tree.value_mut(node).1
    }

    /// Returns `true` if the map holds an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Removes the entry for `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the entry for `key` and returns it.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let position = self.tree.find(key);
        self.tree.erase(position).ok()
    }

    /// Keeps only the entries for which `predicate` returns `true`.
    pub fn retain<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.tree.retain(|(key, value)| predicate(key, value));
    }

    /// Returns an iterator over the entries whose keys fall within `range`.
    pub fn range<R>(&self, range: R) -> impl DoubleEndedIterator<Item = (&K, &V)>
    where
        R: RangeBounds<K>,
    {
        self.tree.range(range).map(|(key, value)| (key, value))
    }
}

impl<K, V, C: Default> Default for OrderedMap<K, V, C> {
    fn default() -> Self {
        Self::with_compare(C::default())
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for OrderedMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.clone_from(&source.tree);
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for OrderedMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, V: Eq, C> Eq for OrderedMap<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for OrderedMap<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, C> fmt::Display for OrderedMap<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for OrderedMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for OrderedMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, C> IntoIterator for OrderedMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = tree::IntoIter<(K, V), First, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a OrderedMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Iter
// =============================================================================

/// An iterator over the entries of an [`OrderedMap`] or
/// [`OrderedMultiMap`](super::OrderedMultiMap), in key order.
pub struct Iter<'a, K, V, C> {
    pub(super) inner: tree::Iter<'a, (K, V), First, C>,
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for Iter<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, value)| (key, value))
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {}

impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V, C> serde::Serialize for OrderedMap<K, V, C>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

#[cfg(feature = "serde")]
struct OrderedMapVisitor<K, V, C> {
    marker: std::marker::PhantomData<(K, V, C)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V, C> serde::de::Visitor<'de> for OrderedMapVisitor<K, V, C>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    C: Compare<K> + Default,
{
    type Value = OrderedMap<K, V, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = OrderedMap::default();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, C> serde::Deserialize<'de> for OrderedMap<K, V, C>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    C: Compare<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}
