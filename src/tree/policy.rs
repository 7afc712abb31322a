//! Key-extraction and comparison policies.
//!
//! A [`RedBlackTree`](super::RedBlackTree) never compares stored values
//! directly. It projects each value to a key with a [`KeyOf`] policy and
//! orders keys with a [`Compare`] policy. Both are compile-time type
//! parameters, so every descent step is statically dispatched.
//!
//! | Container  | Key extraction | Duplicate policy |
//! |------------|----------------|------------------|
//! | set        | [`Identity`]   | unique           |
//! | multiset   | [`Identity`]   | equal            |
//! | map        | [`First`]      | unique           |
//! | multimap   | [`First`]      | equal            |
//!
//! # Examples
//!
//! ```rust
//! use ordtree::tree::{Compare, FnCompare, NaturalOrder, ReverseOrder};
//!
//! assert!(NaturalOrder.less(&1, &2));
//! assert!(ReverseOrder.less(&2, &1));
//!
//! let by_length = FnCompare::new(|left: &str, right: &str| left.len() < right.len());
//! assert!(by_length.less("ab", "abc"));
//! ```

/// Projects a stored value to the key used for ordering.
pub trait KeyOf<V> {
    /// The key type the projection yields.
    type Key: ?Sized;

    /// Returns the ordering key of `value`.
    fn key_of<'a>(&self, value: &'a V) -> &'a Self::Key;
}

/// Uses the whole value as its key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Identity;

impl<V> KeyOf<V> for Identity {
    type Key = V;

    #[inline]
    fn key_of<'a>(&self, value: &'a V) -> &'a V {
        value
    }
}

/// Uses the first element of a pair as the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct First;

impl<K, T> KeyOf<(K, T)> for First {
    type Key = K;

    #[inline]
    fn key_of<'a>(&self, value: &'a (K, T)) -> &'a K {
        &value.0
    }
}

/// A strict weak ordering over keys.
///
/// Two keys are considered equal when neither is less than the other.
/// Implementations must be irreflexive and transitive; the tree does not
/// guard against a comparator that is neither.
pub trait Compare<Q: ?Sized> {
    /// Returns `true` if `left` sorts strictly before `right`.
    fn less(&self, left: &Q, right: &Q) -> bool;

    /// Returns `true` if neither key sorts before the other.
    #[inline]
    fn equivalent(&self, left: &Q, right: &Q) -> bool {
        !self.less(left, right) && !self.less(right, left)
    }
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<Q: Ord + ?Sized> Compare<Q> for NaturalOrder {
    #[inline]
    fn less(&self, left: &Q, right: &Q) -> bool {
        left < right
    }
}

/// Orders keys by the reverse of their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder;

impl<Q: Ord + ?Sized> Compare<Q> for ReverseOrder {
    #[inline]
    fn less(&self, left: &Q, right: &Q) -> bool {
        right < left
    }
}

/// Adapts a `less` closure into a [`Compare`] policy.
#[derive(Clone, Copy, Default)]
pub struct FnCompare<F>(F);

impl<F> FnCompare<F> {
    /// Wraps `less`, which must return `true` iff its first argument sorts
    /// strictly before its second.
    #[inline]
    pub const fn new(less: F) -> Self {
        Self(less)
    }
}

impl<Q: ?Sized, F> Compare<Q> for FnCompare<F>
where
    F: Fn(&Q, &Q) -> bool,
{
    #[inline]
    fn less(&self, left: &Q, right: &Q) -> bool {
        (self.0)(left, right)
    }
}

impl<F> std::fmt::Debug for FnCompare<F> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("FnCompare(..)")
    }
}
