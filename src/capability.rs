//! The bare collection capabilities a set must provide.
//!
//! Two traits describe what code can rely on without knowing anything about
//! equivalence strategies:
//!
//! - [`SetLike`]: read-only access to a sequence of elements and its raw
//!   cardinality. Every algebra and query operation of
//!   [`ComparableSet`](crate::ComparableSet) accepts any `SetLike` as its
//!   right operand, including plain `Vec`s, slices and arrays.
//! - [`MutableSet`]: the full capability of a mutable collection with a
//!   membership test (`has`, `add`, `delete`, `clear`, `values`, `keys`,
//!   `entries`, `for_each`, `size`).
//!
//! `ComparableSet` implements both, as do the standard library's `HashSet` and
//! `BTreeSet`, so a function written against `MutableSet` accepts either
//! without modification.
//!
//! # Examples
//!
//! ```rust
//! use comparable_sets::capability::MutableSet;
//! use comparable_sets::ComparableSet;
//! use std::collections::HashSet;
//!
//! fn register<S: MutableSet<u32>>(set: &mut S) -> usize {
//!     set.add(7).add(8).add(7);
//!     set.size()
//! }
//!
//! let mut plain: HashSet<u32> = HashSet::new();
//! let mut enhanced: ComparableSet<u32> = ComparableSet::new();
//! assert_eq!(register(&mut plain), 2);
//! assert_eq!(register(&mut enhanced), 2);
//! ```

use std::collections::{BTreeSet, HashSet, btree_set, hash_set};
use std::hash::{BuildHasher, Hash};
use std::iter::{Cloned, FusedIterator};

/// Read-only access to a sequence of elements.
pub trait SetLike<T> {
    /// Returns the raw number of elements.
    ///
    /// For sequences that are not canonical sets (a `Vec` with repeated
    /// values, for example) this counts every occurrence.
    fn size(&self) -> usize;

    /// Calls `visit` with an iterator over the elements in their natural
    /// order and returns its result.
    fn with_elements<R>(&self, visit: impl FnOnce(&mut dyn Iterator<Item = &T>) -> R) -> R;
}

impl<T, S: SetLike<T> + ?Sized> SetLike<T> for &S {
    #[inline]
    fn size(&self) -> usize {
        (**self).size()
    }

    #[inline]
    fn with_elements<R>(&self, visit: impl FnOnce(&mut dyn Iterator<Item = &T>) -> R) -> R {
        (**self).with_elements(visit)
    }
}

impl<T> SetLike<T> for [T] {
    #[inline]
    fn size(&self) -> usize {
        self.len()
    }

    fn with_elements<R>(&self, visit: impl FnOnce(&mut dyn Iterator<Item = &T>) -> R) -> R {
        visit(&mut self.iter())
    }
}

impl<T, const N: usize> SetLike<T> for [T; N] {
    #[inline]
    fn size(&self) -> usize {
        N
    }

    fn with_elements<R>(&self, visit: impl FnOnce(&mut dyn Iterator<Item = &T>) -> R) -> R {
        visit(&mut self.iter())
    }
}

impl<T> SetLike<T> for Vec<T> {
    #[inline]
    fn size(&self) -> usize {
        self.len()
    }

    fn with_elements<R>(&self, visit: impl FnOnce(&mut dyn Iterator<Item = &T>) -> R) -> R {
        visit(&mut self.iter())
    }
}

impl<T, S> SetLike<T> for HashSet<T, S> {
    #[inline]
    fn size(&self) -> usize {
        self.len()
    }

    fn with_elements<R>(&self, visit: impl FnOnce(&mut dyn Iterator<Item = &T>) -> R) -> R {
        visit(&mut self.iter())
    }
}

impl<T> SetLike<T> for BTreeSet<T> {
    #[inline]
    fn size(&self) -> usize {
        self.len()
    }

    fn with_elements<R>(&self, visit: impl FnOnce(&mut dyn Iterator<Item = &T>) -> R) -> R {
        visit(&mut self.iter())
    }
}

// =============================================================================
// MutableSet
// =============================================================================

/// The capability set of a mutable collection with a membership test.
///
/// Enumeration yields owned values, so every implementor requires
/// `T: Clone`. `keys` and `values` enumerate the same elements, and
/// `entries` pairs each element with itself.
pub trait MutableSet<T>: SetLike<T> {
    /// Iterator returned by [`values`](Self::values) and [`keys`](Self::keys).
    type Values<'a>: Iterator<Item = T>
    where
        Self: 'a;

    /// Returns `true` if the collection holds `value`.
    fn has(&self, value: &T) -> bool;

    /// Adds `value` if it is not already present and returns the collection
    /// for chaining.
    fn add(&mut self, value: T) -> &mut Self;

    /// Removes `value`, returning whether anything was removed.
    fn delete(&mut self, value: &T) -> bool;

    /// Removes every element.
    fn clear(&mut self);

    /// Returns an iterator over the elements.
    fn values(&self) -> Self::Values<'_>;

    /// Returns an iterator over the elements, identical to [`values`](Self::values).
    fn keys(&self) -> Self::Values<'_> {
        self.values()
    }

    /// Returns an iterator over `(element, element)` pairs.
    fn entries(&self) -> Entries<Self::Values<'_>> {
        Entries {
            inner: self.values(),
        }
    }

    /// Calls `callback` with `(value, key, collection)` for every element.
    fn for_each(&self, mut callback: impl FnMut(&T, &T, &Self)) {
        for value in self.values() {
            callback(&value, &value, self);
        }
    }

    /// Returns `true` if the collection holds no elements.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// Iterator over `(element, element)` pairs, see [`MutableSet::entries`].
#[derive(Debug, Clone)]
pub struct Entries<I> {
    inner: I,
}

impl<T: Clone, I: Iterator<Item = T>> Iterator for Entries<I> {
    type Item = (T, T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|value| (value.clone(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T: Clone, I: ExactSizeIterator<Item = T>> ExactSizeIterator for Entries<I> {}

impl<T: Clone, I: FusedIterator<Item = T>> FusedIterator for Entries<I> {}

impl<T, S> MutableSet<T> for HashSet<T, S>
where
    T: Clone + Eq + Hash,
    S: BuildHasher,
{
    type Values<'a>
        = Cloned<hash_set::Iter<'a, T>>
    where
        Self: 'a;

    fn has(&self, value: &T) -> bool {
        self.contains(value)
    }

    fn add(&mut self, value: T) -> &mut Self {
        self.insert(value);
        self
    }

    fn delete(&mut self, value: &T) -> bool {
        self.remove(value)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn values(&self) -> Self::Values<'_> {
        self.iter().cloned()
    }
}

impl<T> MutableSet<T> for BTreeSet<T>
where
    T: Clone + Ord,
{
    type Values<'a>
        = Cloned<btree_set::Iter<'a, T>>
    where
        Self: 'a;

    fn has(&self, value: &T) -> bool {
        self.contains(value)
    }

    fn add(&mut self, value: T) -> &mut Self {
        self.insert(value);
        self
    }

    fn delete(&mut self, value: &T) -> bool {
        self.remove(value)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn values(&self) -> Self::Values<'_> {
        self.iter().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn collect_elements<T: Clone, S: SetLike<T> + ?Sized>(set: &S) -> Vec<T> {
        set.with_elements(|elements| elements.cloned().collect())
    }

    #[rstest]
    fn test_vec_size_counts_duplicates() {
        let elements = vec![1, 1, 2];
        assert_eq!(elements.size(), 3);
        assert_eq!(collect_elements(&elements), vec![1, 1, 2]);
    }

    #[rstest]
    fn test_slice_and_array_are_set_like() {
        let array = [4, 5, 6];
        assert_eq!(SetLike::size(&array), 3);
        assert_eq!(collect_elements(&array[..2]), vec![4, 5]);
    }

    #[rstest]
    fn test_btree_set_visits_in_sorted_order() {
        let set: BTreeSet<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(collect_elements(&set), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_hash_set_mutable_capability() {
        let mut set: HashSet<&str> = HashSet::new();
        MutableSet::add(&mut set, "a").add("b").add("a");
        assert_eq!(SetLike::size(&set), 2);
        assert!(MutableSet::has(&set, &"a"));
        assert!(MutableSet::delete(&mut set, &"a"));
        assert!(!MutableSet::delete(&mut set, &"a"));
        MutableSet::clear(&mut set);
        assert!(MutableSet::is_empty(&set));
    }

    #[rstest]
    fn test_entries_pair_each_value_with_itself() {
        let set: BTreeSet<i32> = [1, 2].into_iter().collect();
        let entries: Vec<(i32, i32)> = set.entries().collect();
        assert_eq!(entries, vec![(1, 1), (2, 2)]);
        let keys: Vec<i32> = set.keys().collect();
        assert_eq!(keys, vec![1, 2]);
    }

    #[rstest]
    fn test_for_each_passes_value_twice() {
        let set: BTreeSet<i32> = [1, 2, 3].into_iter().collect();
        let mut seen = Vec::new();
        MutableSet::for_each(&set, |value, key, collection| {
            assert_eq!(value, key);
            assert_eq!(collection.len(), 3);
            seen.push(*value);
        });
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
