//! Equivalence strategies.
//!
//! An [`Equivalence`] decides when two elements are "the same" for the
//! purposes of membership and deduplication. Every set operation in this
//! crate funnels through a strategy value; no other component compares
//! elements on its own.
//!
//! Three strategies are provided:
//!
//! | Strategy          | Equality                        | Membership cost |
//! |-------------------|---------------------------------|-----------------|
//! | [`Intrinsic`]     | `T: Eq + Hash`                  | amortized O(1)  |
//! | [`Comparator`]    | caller predicate `(&T, &T)`     | O(n) scan       |
//! | [`ByKey`]         | equality of a projected key `K` | amortized O(1)  |
//!
//! # Fingerprints
//!
//! A strategy may return a fingerprint for a value. Fingerprints are hashes
//! that must agree with [`Equivalence::equivalent`]: two equivalent values
//! must produce the same fingerprint. A strategy that cannot hash its notion
//! of equality returns `None` for every value, and lookups fall back to a
//! linear scan.
//!
//! # Examples
//!
//! ```rust
//! use comparable_sets::equivalence::{ByKey, Comparator, Equivalence, Intrinsic};
//!
//! assert!(Intrinsic.equivalent(&3, &3));
//!
//! let same_length = Comparator::new(|left: &&str, right: &&str| left.len() == right.len());
//! assert!(same_length.equivalent(&"one", &"two"));
//!
//! let by_length = ByKey::new(|word: &&str| word.len());
//! assert!(by_length.equivalent(&"three", &"seven"));
//! assert_eq!(by_length.fingerprint(&"three"), by_length.fingerprint(&"seven"));
//! ```

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::rc::Rc;

/// Decides element equivalence for a set.
///
/// Implementations are expected to be true equivalence relations (reflexive,
/// symmetric, transitive). This is not validated; a predicate that breaks
/// these laws yields unspecified membership and ordering results.
pub trait Equivalence<T: ?Sized> {
    /// Returns `true` if `candidate` is equivalent to `stored`.
    ///
    /// The engine always passes the value being looked up first and the
    /// element already held by a collection second.
    fn equivalent(&self, candidate: &T, stored: &T) -> bool;

    /// Returns a hash of `value` consistent with [`equivalent`](Self::equivalent),
    /// or `None` when this strategy only supports linear scans.
    ///
    /// A strategy must return `Some` for every value or `None` for every value.
    fn fingerprint(&self, value: &T) -> Option<u64> {
        let _ = value;
        None
    }
}

/// Hashes a key with the hasher selected by the crate features.
///
/// `ahash` takes precedence over `fxhash`; without either feature the
/// standard SipHash-based hasher is used. All three are deterministic within
/// a process, which is all a fingerprint needs.
#[inline]
pub(crate) fn compute_fingerprint<K: Hash + ?Sized>(key: &K) -> u64 {
    use std::hash::BuildHasher;

    #[cfg(feature = "ahash")]
    {
        ahash::RandomState::with_seeds(
            0x243f_6a88_85a3_08d3,
            0x1319_8a2e_0370_7344,
            0xa409_3822_299f_31d0,
            0x082e_fa98_ec4e_6c89,
        )
        .hash_one(key)
    }

    #[cfg(all(feature = "fxhash", not(feature = "ahash")))]
    {
        rustc_hash::FxBuildHasher.hash_one(key)
    }

    #[cfg(not(any(feature = "fxhash", feature = "ahash")))]
    {
        std::hash::BuildHasherDefault::<std::collections::hash_map::DefaultHasher>::default()
            .hash_one(key)
    }
}

// =============================================================================
// Intrinsic
// =============================================================================

/// Equivalence by the element's own `Eq` implementation.
///
/// This is the default strategy of [`ComparableSet`](crate::ComparableSet)
/// and the only one that is `Default`, which is what `FromIterator`,
/// `Default` and deserialization require.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Intrinsic;

impl<T: Eq + Hash + ?Sized> Equivalence<T> for Intrinsic {
    #[inline]
    fn equivalent(&self, candidate: &T, stored: &T) -> bool {
        candidate == stored
    }

    #[inline]
    fn fingerprint(&self, value: &T) -> Option<u64> {
        Some(compute_fingerprint(value))
    }
}

// =============================================================================
// Comparator
// =============================================================================

/// Equivalence by a caller-supplied predicate.
///
/// Since an arbitrary predicate cannot be hashed, every lookup under a
/// `Comparator` scans the collection.
///
/// The predicate is held behind an `Rc`, so cloning a `Comparator` (which
/// every derived set does) never clones the closure itself.
///
/// # Examples
///
/// ```rust
/// use comparable_sets::equivalence::Comparator;
/// use comparable_sets::set_from;
///
/// let set = set_from(
///     [1.0_f64, 1.04, 2.0],
///     Comparator::new(|left: &f64, right: &f64| (left - right).abs() < 0.1),
/// );
/// assert_eq!(set.to_vec(), vec![1.0, 2.0]);
/// ```
pub struct Comparator<F> {
    predicate: Rc<F>,
}

impl<F> Comparator<F> {
    /// Wraps `predicate` as an equivalence strategy.
    #[must_use]
    pub fn new(predicate: F) -> Self {
        Self {
            predicate: Rc::new(predicate),
        }
    }
}

impl<F> Clone for Comparator<F> {
    fn clone(&self) -> Self {
        Self {
            predicate: Rc::clone(&self.predicate),
        }
    }
}

impl<F> fmt::Debug for Comparator<F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Comparator(..)")
    }
}

impl<T: ?Sized, F> Equivalence<T> for Comparator<F>
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn equivalent(&self, candidate: &T, stored: &T) -> bool {
        (self.predicate)(candidate, stored)
    }
}

// =============================================================================
// ByKey
// =============================================================================

/// Equivalence by equality of a projected key.
///
/// Two elements are equivalent when `key(a) == key(b)`. Because the key is
/// hashable, lookups stay amortized O(1) even for composite elements that
/// have no `Eq` of their own.
///
/// # Examples
///
/// ```rust
/// use comparable_sets::equivalence::ByKey;
/// use comparable_sets::set_from;
///
/// let words = set_from(["one", "two", "three", "four"], ByKey::new(|word: &&str| word.len()));
/// assert_eq!(words.to_vec(), vec!["one", "three", "four"]);
/// ```
pub struct ByKey<F, K> {
    key: Rc<F>,
    marker: PhantomData<fn() -> K>,
}

impl<F, K> ByKey<F, K> {
    /// Wraps `key` as an equivalence strategy.
    #[must_use]
    pub fn new<T: ?Sized>(key: F) -> Self
    where
        F: Fn(&T) -> K,
    {
        Self {
            key: Rc::new(key),
            marker: PhantomData,
        }
    }
}

impl<F, K> Clone for ByKey<F, K> {
    fn clone(&self) -> Self {
        Self {
            key: Rc::clone(&self.key),
            marker: PhantomData,
        }
    }
}

impl<F, K> fmt::Debug for ByKey<F, K> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("ByKey(..)")
    }
}

impl<T: ?Sized, F, K> Equivalence<T> for ByKey<F, K>
where
    F: Fn(&T) -> K,
    K: Eq + Hash,
{
    #[inline]
    fn equivalent(&self, candidate: &T, stored: &T) -> bool {
        (self.key)(candidate) == (self.key)(stored)
    }

    #[inline]
    fn fingerprint(&self, value: &T) -> Option<u64> {
        Some(compute_fingerprint(&(self.key)(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 1, true)]
    #[case(1, 2, false)]
    #[case(-7, -7, true)]
    fn test_intrinsic_uses_eq(#[case] left: i32, #[case] right: i32, #[case] expected: bool) {
        assert_eq!(Intrinsic.equivalent(&left, &right), expected);
    }

    #[rstest]
    fn test_intrinsic_fingerprint_is_deterministic() {
        let first = Intrinsic.fingerprint("alpha");
        let second = Intrinsic.fingerprint("alpha");
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[rstest]
    fn test_comparator_has_no_fingerprint() {
        let comparator = Comparator::new(|left: &i32, right: &i32| left % 3 == right % 3);
        assert!(comparator.equivalent(&1, &4));
        assert!(!comparator.equivalent(&1, &5));
        assert_eq!(comparator.fingerprint(&1), None);
    }

    #[rstest]
    fn test_comparator_passes_candidate_first() {
        let comparator = Comparator::new(|candidate: &i32, stored: &i32| candidate < stored);
        assert!(comparator.equivalent(&1, &2));
        assert!(!comparator.equivalent(&2, &1));
    }

    #[rstest]
    fn test_comparator_clone_shares_predicate() {
        let comparator = Comparator::new(|left: &u8, right: &u8| left == right);
        let cloned = comparator.clone();
        assert!(Rc::ptr_eq(&comparator.predicate, &cloned.predicate));
    }

    #[rstest]
    fn test_by_key_fingerprint_agrees_with_equivalence() {
        let by_parity = ByKey::new(|value: &i64| value.rem_euclid(2));
        assert!(by_parity.equivalent(&2, &10));
        assert_eq!(by_parity.fingerprint(&2), by_parity.fingerprint(&10));
        assert!(!by_parity.equivalent(&2, &3));
    }

    #[rstest]
    fn test_debug_output_hides_closures() {
        let comparator = Comparator::new(|left: &i32, right: &i32| left == right);
        let by_key = ByKey::new(|value: &i32| *value);
        assert_eq!(format!("{comparator:?}"), "Comparator(..)");
        assert_eq!(format!("{by_key:?}"), "ByKey(..)");
    }
}
