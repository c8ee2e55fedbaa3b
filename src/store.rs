//! Insertion-ordered, duplicate-free element storage.
//!
//! [`BackingStore`] is the container beneath every
//! [`ComparableSet`](crate::ComparableSet). It keeps elements in a `Vec` in
//! first-insertion order and, for strategies that provide fingerprints,
//! a side table from fingerprint to positions so that membership tests do
//! not need to scan.
//!
//! A store does not remember which strategy built it. Callers must pass the
//! same strategy to every method for the lifetime of a store; mixing
//! strategies breaks the no-duplicates invariant.
//!
//! # Time Complexity
//!
//! | Operation  | Hashed strategy  | Scanning strategy |
//! |------------|------------------|-------------------|
//! | `contains` | amortized O(1)   | O(n)              |
//! | `insert`   | amortized O(1)   | O(n)              |
//! | `remove`   | O(n)             | O(n)              |
//! | `build`    | O(n)             | O(n²)             |

use smallvec::SmallVec;
use std::collections::HashMap;

use crate::equivalence::Equivalence;

// =============================================================================
// Buckets
// =============================================================================

/// Positions of elements grouped by fingerprint.
#[derive(Debug, Clone, Default)]
struct Buckets {
    slots: HashMap<u64, SmallVec<[usize; 2]>>,
}

impl Buckets {
    fn record(&mut self, fingerprint: u64, position: usize) {
        self.slots.entry(fingerprint).or_default().push(position);
    }

    fn candidates(&self, fingerprint: u64) -> &[usize] {
        self.slots.get(&fingerprint).map_or(&[][..], SmallVec::as_slice)
    }

    /// Drops `position` and shifts every later position down by one, mirroring
    /// a `Vec::remove` on the entries.
    fn forget(&mut self, fingerprint: Option<u64>, position: usize) {
        if let Some(fingerprint) = fingerprint
            && let Some(slot) = self.slots.get_mut(&fingerprint)
        {
            slot.retain(|stored| *stored != position);
            if slot.is_empty() {
                self.slots.remove(&fingerprint);
            }
        }
        for slot in self.slots.values_mut() {
            for stored in slot.iter_mut() {
                if *stored > position {
                    *stored -= 1;
                }
            }
        }
    }

    fn clear(&mut self) {
        self.slots.clear();
    }
}

// =============================================================================
// BackingStore
// =============================================================================

/// An insertion-ordered collection holding no two equivalent elements.
///
/// Deduplication happens at insertion time only. Elements are never
/// re-validated, so changing a strategy after the fact is done by building a
/// new store with [`BackingStore::build`].
#[derive(Debug, Clone)]
pub(crate) struct BackingStore<T> {
    entries: Vec<T>,
    buckets: Buckets,
}

impl<T> BackingStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            buckets: Buckets::default(),
        }
    }

    /// Returns the number of stored elements.
    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no elements.
    #[inline]
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the elements in insertion order.
    #[inline]
    #[must_use]
    pub(crate) fn as_slice(&self) -> &[T] {
        &self.entries
    }

    /// Returns an iterator over the elements in insertion order.
    pub(crate) fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Consumes the store, returning its elements in insertion order.
    #[must_use]
    pub(crate) fn into_vec(self) -> Vec<T> {
        self.entries
    }

    /// Removes every element, keeping allocated capacity.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.buckets.clear();
    }

    /// Returns the position of an element equivalent to `value`.
    pub(crate) fn position_of<E>(&self, value: &T, equivalence: &E) -> Option<usize>
    where
        E: Equivalence<T> + ?Sized,
    {
        match equivalence.fingerprint(value) {
            Some(fingerprint) => self
                .buckets
                .candidates(fingerprint)
                .iter()
                .copied()
                .find(|&position| equivalence.equivalent(value, &self.entries[position])),
            None => self
                .entries
                .iter()
                .position(|stored| equivalence.equivalent(value, stored)),
        }
    }

    /// Returns `true` if an element equivalent to `value` is stored.
    ///
    /// This is the single membership primitive of the crate.
    #[inline]
    pub(crate) fn contains<E>(&self, value: &T, equivalence: &E) -> bool
    where
        E: Equivalence<T> + ?Sized,
    {
        self.position_of(value, equivalence).is_some()
    }

    /// Appends `value` unless an equivalent element is already stored.
    ///
    /// Returns `true` if the value was appended.
    pub(crate) fn insert<E>(&mut self, value: T, equivalence: &E) -> bool
    where
        E: Equivalence<T> + ?Sized,
    {
        if self.contains(&value, equivalence) {
            return false;
        }
        self.push_unchecked(value, equivalence);
        true
    }

    /// Appends `value` without checking for an equivalent element.
    ///
    /// Only valid when the caller knows `value` has no equivalent in the
    /// store, for example when copying a subsequence of a canonical store.
    pub(crate) fn push_unchecked<E>(&mut self, value: T, equivalence: &E)
    where
        E: Equivalence<T> + ?Sized,
    {
        if let Some(fingerprint) = equivalence.fingerprint(&value) {
            self.buckets.record(fingerprint, self.entries.len());
        }
        self.entries.push(value);
    }

    /// Removes the element equivalent to `value`, preserving the order of the
    /// remaining elements.
    pub(crate) fn remove<E>(&mut self, value: &T, equivalence: &E) -> Option<T>
    where
        E: Equivalence<T> + ?Sized,
    {
        let position = self.position_of(value, equivalence)?;
        let fingerprint = equivalence.fingerprint(&self.entries[position]);
        let removed = self.entries.remove(position);
        self.buckets.forget(fingerprint, position);
        Some(removed)
    }

    /// Builds a canonical store from `elements`, keeping the first of every
    /// group of equivalent elements in input order.
    pub(crate) fn build<I, E>(elements: I, equivalence: &E) -> Self
    where
        I: IntoIterator<Item = T>,
        E: Equivalence<T> + ?Sized,
    {
        let mut store = Self::new();
        let mut discarded = 0_usize;
        for element in elements {
            if !store.insert(element, equivalence) {
                discarded += 1;
            }
        }
        if discarded > 0 {
            tracing::trace!(
                target: "comparable_sets",
                discarded,
                retained = store.len(),
                "discarded equivalent elements during construction"
            );
        }
        store
    }

    /// Builds a store from elements already known to be mutually
    /// non-equivalent, skipping the membership checks.
    pub(crate) fn from_canonical<I, E>(elements: I, equivalence: &E) -> Self
    where
        I: IntoIterator<Item = T>,
        E: Equivalence<T> + ?Sized,
    {
        let mut store = Self::new();
        for element in elements {
            store.push_unchecked(element, equivalence);
        }
        store
    }
}

impl<T> Default for BackingStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Probe
// =============================================================================

/// A borrowed, indexed view of an arbitrary element sequence.
///
/// Right-hand operands of set operations are not necessarily canonical under
/// the left operand's strategy, so they are indexed here without
/// deduplication.
pub(crate) struct Probe<'a, T> {
    elements: Vec<&'a T>,
    buckets: Buckets,
}

impl<'a, T> Probe<'a, T> {
    pub(crate) fn new<I, E>(elements: I, equivalence: &E) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        E: Equivalence<T> + ?Sized,
    {
        let mut probe = Self {
            elements: Vec::new(),
            buckets: Buckets::default(),
        };
        for element in elements {
            if let Some(fingerprint) = equivalence.fingerprint(element) {
                probe.buckets.record(fingerprint, probe.elements.len());
            }
            probe.elements.push(element);
        }
        probe
    }

    pub(crate) fn contains<E>(&self, value: &T, equivalence: &E) -> bool
    where
        E: Equivalence<T> + ?Sized,
    {
        match equivalence.fingerprint(value) {
            Some(fingerprint) => self
                .buckets
                .candidates(fingerprint)
                .iter()
                .any(|&position| equivalence.equivalent(value, self.elements[position])),
            None => self
                .elements
                .iter()
                .any(|stored| equivalence.equivalent(value, stored)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equivalence::{Comparator, Intrinsic};
    use rstest::rstest;

    #[rstest]
    fn test_build_keeps_first_seen_order() {
        let store = BackingStore::build([3, 1, 3, 2, 1], &Intrinsic);
        assert_eq!(store.as_slice(), &[3, 1, 2]);
    }

    #[rstest]
    fn test_build_with_comparator_keeps_first_representative() {
        let same_length = Comparator::new(|left: &&str, right: &&str| left.len() == right.len());
        let store = BackingStore::build(["one", "two", "three", "four"], &same_length);
        assert_eq!(store.as_slice(), &["one", "three", "four"]);
    }

    #[rstest]
    fn test_insert_rejects_equivalent_element() {
        let mut store = BackingStore::new();
        assert!(store.insert(1, &Intrinsic));
        assert!(!store.insert(1, &Intrinsic));
        assert_eq!(store.len(), 1);
    }

    #[rstest]
    fn test_remove_reindexes_later_positions() {
        let mut store = BackingStore::build([10, 20, 30, 40], &Intrinsic);
        assert_eq!(store.remove(&20, &Intrinsic), Some(20));
        assert_eq!(store.as_slice(), &[10, 30, 40]);
        assert_eq!(store.position_of(&30, &Intrinsic), Some(1));
        assert_eq!(store.position_of(&40, &Intrinsic), Some(2));
        assert!(!store.contains(&20, &Intrinsic));
        assert!(store.insert(20, &Intrinsic));
        assert_eq!(store.position_of(&20, &Intrinsic), Some(3));
    }

    #[rstest]
    fn test_remove_missing_returns_none() {
        let mut store = BackingStore::build([1, 2], &Intrinsic);
        assert_eq!(store.remove(&9, &Intrinsic), None);
        assert_eq!(store.len(), 2);
    }

    #[rstest]
    fn test_remove_with_comparator_removes_stored_representative() {
        let parity = Comparator::new(|left: &i32, right: &i32| left % 2 == right % 2);
        let mut store = BackingStore::build([1, 2, 3, 4], &parity);
        assert_eq!(store.as_slice(), &[1, 2]);
        assert_eq!(store.remove(&7, &parity), Some(1));
        assert_eq!(store.as_slice(), &[2]);
    }

    #[rstest]
    fn test_clear_empties_index() {
        let mut store = BackingStore::build(["a", "b"], &Intrinsic);
        store.clear();
        assert!(store.is_empty());
        assert!(!store.contains(&"a", &Intrinsic));
        assert!(store.insert("a", &Intrinsic));
    }

    #[rstest]
    fn test_probe_indexes_duplicates_without_dropping_them() {
        let elements = [5, 5, 6];
        let probe = Probe::new(elements.iter(), &Intrinsic);
        assert_eq!(probe.elements.len(), 3);
        assert!(probe.contains(&5, &Intrinsic));
        assert!(!probe.contains(&7, &Intrinsic));
    }
}
