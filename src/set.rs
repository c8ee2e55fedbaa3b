//! Sets with a pluggable equivalence relation.
//!
//! This module provides [`ComparableSet`], an insertion-ordered set whose
//! notion of "same element" is an explicit [`Equivalence`] strategy value.
//! On top of the basic mutable collection it layers a full set algebra,
//! predicate queries and functional transforms.
//!
//! # Overview
//!
//! | Group      | Operations                                                       |
//! |------------|------------------------------------------------------------------|
//! | Algebra    | `union`, `intersection`, `complement`, `symmetric_difference`, `cartesian_product` |
//! | Algebra under another strategy | `union_with`, `intersection_with`, `complement_with`, `symmetric_difference_with` |
//! | Queries    | `is_subset_of`, `is_proper_subset_of`, `equals`, `not_equals`    |
//! | Transforms | `map`, `filter`, `reduce`, `fold`                                |
//! | Mutation   | `add`, `delete`, `has`, `clear`                                  |
//!
//! Every algebra, query and transform operation returns a freshly built set
//! and leaves its operands untouched. The right operand of a binary operation
//! may be any [`SetLike`] value, and is always compared under the left
//! operand's strategy. The `_with` variants take an explicit strategy for
//! the result instead, which is how elements the left strategy keeps apart
//! are merged (or the reverse).
//!
//! # Ordering
//!
//! Iteration order is first-insertion order. Operations that copy elements
//! forward (`filter`, `union`, `complement`, `intersection`) keep the left
//! operand's order; `union` appends the right operand's new elements in
//! their own order.
//!
//! # Shared Stores
//!
//! A set may share its backing store with other handles. Sharing only
//! happens on request, through [`ComparableSet::from_set`] with
//! [`Construction::Borrow`]. Mutating any handle (`add`, `delete`, `clear`)
//! is then visible through all of them. `Clone` and
//! [`ComparableSet::materialize`] always produce an independent copy.
//!
//! There is no locking discipline for shared stores: sets are `!Send` and
//! `!Sync`, and callers must not mutate one handle while iterating another
//! handle of the same store. Doing so panics with a `RefCell` borrow error;
//! the usual way to hit this is `set.extend(&alias)`.
//!
//! The store itself is reachable only through set handles, so every
//! insertion goes through the strategy the set was built with:
//!
//! ```compile_fail
//! use comparable_sets::store::BackingStore;
//! ```
//!
//! # Examples
//!
//! ```rust
//! use comparable_sets::{Intrinsic, set_from};
//!
//! let set_a = set_from([1, 2, 3, 4], Intrinsic);
//! let set_b = set_from([3, 4, 5, 6, 7], Intrinsic);
//!
//! assert_eq!(set_a.union(&set_b).to_vec(), vec![1, 2, 3, 4, 5, 6, 7]);
//! assert_eq!(set_a.intersection(&set_b).to_vec(), vec![3, 4]);
//! assert_eq!(set_a.complement(&set_b).to_vec(), vec![1, 2]);
//! assert!(set_a.symmetric_difference(&set_b).equals(&[1, 2, 5, 6, 7]));
//! ```

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;
use std::rc::Rc;

use crate::capability::{MutableSet, SetLike};
use crate::equivalence::{Equivalence, Intrinsic};
use crate::error::EmptyReductionError;
use crate::store::{BackingStore, Probe};

static_assertions::assert_not_impl_any!(ComparableSet<i32>: Send, Sync);

/// How [`ComparableSet::from_set`] treats the source's backing store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Construction {
    /// Copy the source's elements into a new store.
    #[default]
    Copy,
    /// Share the source's store. Mutations through either handle are visible
    /// through both.
    Borrow,
}

/// An insertion-ordered set deduplicated under an [`Equivalence`] strategy.
///
/// # Type Parameters
///
/// * `T` - The element type.
/// * `E` - The equivalence strategy, [`Intrinsic`] by default.
///
/// # Examples
///
/// ```rust
/// use comparable_sets::{ComparableSet, Comparator, set_from};
///
/// #[derive(Debug, Clone)]
/// struct Lengthy {
///     string: &'static str,
///     length: usize,
/// }
///
/// let words = ["one", "two", "three", "four"].map(|string| Lengthy { string, length: string.len() });
/// let set = set_from(words, Comparator::new(|left: &Lengthy, right: &Lengthy| left.length == right.length));
///
/// assert_eq!(set.len(), 3);
/// let strings: Vec<&str> = set.iter().map(|word| word.string).collect();
/// assert_eq!(strings, vec!["one", "three", "four"]);
/// ```
pub struct ComparableSet<T, E = Intrinsic> {
    store: Rc<RefCell<BackingStore<T>>>,
    equivalence: E,
}

/// Creates an empty set under `equivalence`.
///
/// # Examples
///
/// ```rust
/// use comparable_sets::{Intrinsic, empty_set};
///
/// let mut set = empty_set(Intrinsic);
/// set.add(3).add(1).add(5);
/// assert_eq!(set.to_vec(), vec![3, 1, 5]);
/// ```
#[must_use]
pub fn empty_set<T, E: Equivalence<T>>(equivalence: E) -> ComparableSet<T, E> {
    ComparableSet::with_equivalence(equivalence)
}

/// Creates a set from `elements`, keeping the first of every group of
/// equivalent elements.
///
/// # Examples
///
/// ```rust
/// use comparable_sets::{Intrinsic, set_from};
///
/// let set = set_from(vec![1, 2, 2, 3, 1], Intrinsic);
/// assert_eq!(set.to_vec(), vec![1, 2, 3]);
/// ```
pub fn set_from<T, E, I>(elements: I, equivalence: E) -> ComparableSet<T, E>
where
    E: Equivalence<T>,
    I: IntoIterator<Item = T>,
{
    ComparableSet::from_elements(elements, equivalence)
}

impl<T: Eq + Hash> ComparableSet<T, Intrinsic> {
    /// Creates an empty set compared by the elements' own `Eq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::ComparableSet;
    ///
    /// let set: ComparableSet<i32> = ComparableSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::from_store(BackingStore::new(), Intrinsic)
    }
}

impl<T, E> ComparableSet<T, E> {
    fn from_store(store: BackingStore<T>, equivalence: E) -> Self {
        Self {
            store: Rc::new(RefCell::new(store)),
            equivalence,
        }
    }

    /// Returns the strategy this set was built with.
    #[inline]
    pub const fn equivalence(&self) -> &E {
        &self.equivalence
    }

    /// Returns the number of elements.
    ///
    /// # Panics
    ///
    /// Panics if a handle sharing this store is being mutated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    /// Returns the number of elements, identical to [`len`](Self::len).
    #[inline]
    #[must_use]
    pub fn cardinality(&self) -> usize {
        self.len()
    }

    /// Returns `true` if the set holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.borrow().is_empty()
    }

    /// Returns `true` if the set holds at least one element.
    #[inline]
    #[must_use]
    pub fn non_empty(&self) -> bool {
        !self.is_empty()
    }

    /// Returns `true` if `self` and `other` share one backing store.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::{ComparableSet, Construction, Intrinsic, set_from};
    ///
    /// let source = set_from([1, 2], Intrinsic);
    /// let alias = ComparableSet::from_set(&source, Construction::Borrow);
    /// let copy = ComparableSet::from_set(&source, Construction::Copy);
    /// assert!(alias.shares_store_with(&source));
    /// assert!(!copy.shares_store_with(&source));
    /// ```
    #[must_use]
    pub fn shares_store_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }
}

// =============================================================================
// Construction and Mutable View
// =============================================================================

impl<T, E: Equivalence<T>> ComparableSet<T, E> {
    /// Creates an empty set under `equivalence`.
    #[must_use]
    pub fn with_equivalence(equivalence: E) -> Self {
        Self::from_store(BackingStore::new(), equivalence)
    }

    /// Creates a set from `elements` in their natural order, discarding every
    /// element equivalent to one seen earlier.
    ///
    /// # Complexity
    ///
    /// O(n) for hashed strategies, O(n²) worst case for scanning ones.
    pub fn from_elements<I>(elements: I, equivalence: E) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let store = BackingStore::build(elements, &equivalence);
        Self::from_store(store, equivalence)
    }

    /// Returns `true` if an element equivalent to `value` is in the set.
    ///
    /// # Panics
    ///
    /// Panics if a handle sharing this store is being mutated.
    #[must_use]
    pub fn has(&self, value: &T) -> bool {
        self.store.borrow().contains(value, &self.equivalence)
    }

    /// Appends `value` unless an equivalent element is present, then returns
    /// the set for chaining.
    ///
    /// # Panics
    ///
    /// Panics if a handle sharing this store is being iterated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::ComparableSet;
    ///
    /// let mut set = ComparableSet::new();
    /// set.add(3).add(1).add(5).add(3);
    /// assert_eq!(set.to_vec(), vec![3, 1, 5]);
    /// ```
    pub fn add(&mut self, value: T) -> &mut Self {
        self.store.borrow_mut().insert(value, &self.equivalence);
        self
    }

    /// Removes the element equivalent to `value`, returning whether one was
    /// removed. The remaining elements keep their order.
    ///
    /// # Panics
    ///
    /// Panics if a handle sharing this store is being iterated.
    pub fn delete(&mut self, value: &T) -> bool {
        self.store
            .borrow_mut()
            .remove(value, &self.equivalence)
            .is_some()
    }

    /// Removes every element from the backing store.
    ///
    /// # Panics
    ///
    /// Panics if a handle sharing this store is being iterated.
    pub fn clear(&mut self) {
        self.store.borrow_mut().clear();
    }
}

impl<T: Clone, E> ComparableSet<T, E> {
    /// Returns the elements in iteration order.
    ///
    /// # Panics
    ///
    /// Panics if a handle sharing this store is being mutated.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.store.borrow().as_slice().to_vec()
    }

    /// Returns an iterator over clones of the elements in iteration order.
    ///
    /// The iterator keeps the backing store borrowed until it is dropped, so
    /// no handle sharing this store may be mutated while it is alive. For
    /// example, `set.extend(&alias)` where `alias` was built from `set` with
    /// [`Construction::Borrow`] panics; extend from `alias.to_vec()` instead.
    ///
    /// # Panics
    ///
    /// Panics if a handle sharing this store is being mutated.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            store: self.store.borrow(),
            position: 0,
        }
    }
}

impl<T: Clone + Eq + Hash, E> ComparableSet<T, E> {
    /// Returns the elements as a standard `HashSet`.
    ///
    /// Elements distinct under `Eq` but equivalent under a custom strategy
    /// cannot occur here, since the set never holds two equivalent elements.
    #[must_use]
    pub fn to_hash_set(&self) -> HashSet<T> {
        self.store.borrow().iter().cloned().collect()
    }
}

impl<T: Clone, E: Equivalence<T> + Clone> ComparableSet<T, E> {
    /// Creates a set from another set under the same strategy.
    ///
    /// With [`Construction::Copy`] the result owns a copy of the elements.
    /// With [`Construction::Borrow`] the result shares `source`'s store, and
    /// `add`, `delete` and `clear` on either handle are visible through both.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::{ComparableSet, Construction, Intrinsic, set_from};
    ///
    /// let mut source = set_from([1, 2, 3], Intrinsic);
    /// let alias = ComparableSet::from_set(&source, Construction::Borrow);
    /// let copy = ComparableSet::from_set(&source, Construction::Copy);
    ///
    /// source.add(4);
    /// assert!(alias.has(&4));
    /// assert!(!copy.has(&4));
    /// ```
    #[must_use]
    pub fn from_set(source: &Self, construction: Construction) -> Self {
        match construction {
            Construction::Copy => source.materialize(),
            Construction::Borrow => {
                tracing::debug!(
                    target: "comparable_sets",
                    size = source.len(),
                    "sharing backing store between set handles"
                );
                Self {
                    store: Rc::clone(&source.store),
                    equivalence: source.equivalence.clone(),
                }
            }
        }
    }

    /// Creates a set from any [`SetLike`] value, deduplicating under
    /// `equivalence`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::{ComparableSet, Intrinsic};
    /// use std::collections::HashSet;
    ///
    /// let plain: HashSet<i32> = [1, 2, 3, 4, 5, 5, 6].into_iter().collect();
    /// let set = ComparableSet::from_set_like(&plain, Intrinsic);
    /// assert_eq!(set.len(), 6);
    /// ```
    pub fn from_set_like<S: SetLike<T> + ?Sized>(source: &S, equivalence: E) -> Self {
        let store = source.with_elements(|elements| BackingStore::build(elements.cloned(), &equivalence));
        Self::from_store(store, equivalence)
    }

    /// Returns an independent copy of this set, never sharing the store.
    #[must_use]
    pub fn materialize(&self) -> Self {
        tracing::trace!(
            target: "comparable_sets",
            size = self.len(),
            "materializing set into a new backing store"
        );
        self.clone()
    }

    /// Rebuilds the set under a different strategy.
    ///
    /// Elements the new strategy considers equivalent collapse to the first
    /// one in the current iteration order.
    pub fn rebuild_with<P: Equivalence<T>>(&self, equivalence: P) -> ComparableSet<T, P> {
        ComparableSet::from_elements(self.to_vec(), equivalence)
    }

    fn derive(&self, canonical: Vec<T>) -> Self {
        Self::from_store(
            BackingStore::from_canonical(canonical, &self.equivalence),
            self.equivalence.clone(),
        )
    }

    /// Collects the elements of `self` whose membership in `other` under
    /// `equivalence` equals `keep_members`, in `self`'s order.
    fn partition_by<S, P>(&self, other: &S, equivalence: &P, keep_members: bool) -> Vec<T>
    where
        S: SetLike<T> + ?Sized,
        P: Equivalence<T> + ?Sized,
    {
        let store = self.store.borrow();
        other.with_elements(|elements| {
            let probe = Probe::new(elements, equivalence);
            store
                .iter()
                .filter(|value| probe.contains(value, equivalence) == keep_members)
                .cloned()
                .collect()
        })
    }

    /// Collects the elements of `other` with no equivalent in `self` under
    /// `equivalence`, in `other`'s order.
    fn right_only<S, P>(&self, other: &S, equivalence: &P) -> Vec<T>
    where
        S: SetLike<T> + ?Sized,
        P: Equivalence<T> + ?Sized,
    {
        let store = self.store.borrow();
        let probe = Probe::new(store.iter(), equivalence);
        other.with_elements(|elements| {
            elements
                .filter(|element| !probe.contains(element, equivalence))
                .cloned()
                .collect()
        })
    }

    // =========================================================================
    // Set Algebra
    // =========================================================================

    /// Returns the elements of `self` that have an equivalent in `other`
    /// (`self ∩ other`), in `self`'s order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::{Intrinsic, set_from};
    ///
    /// let set = set_from([1, 2, 3, 4], Intrinsic);
    /// assert_eq!(set.intersection(&[4, 2, 9]).to_vec(), vec![2, 4]);
    /// ```
    #[must_use]
    pub fn intersection<S: SetLike<T> + ?Sized>(&self, other: &S) -> Self {
        self.derive(self.partition_by(other, &self.equivalence, true))
    }

    /// Like [`intersection`](Self::intersection), but compares and
    /// deduplicates under `equivalence` instead of `self`'s strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::{Comparator, Intrinsic, set_from};
    ///
    /// let set = set_from([1, 2, 3, 4], Intrinsic);
    /// let same_parity = Comparator::new(|left: &i32, right: &i32| left % 2 == right % 2);
    /// assert_eq!(set.intersection_with(&[6], same_parity).to_vec(), vec![2]);
    /// ```
    pub fn intersection_with<S, P>(&self, other: &S, equivalence: P) -> ComparableSet<T, P>
    where
        S: SetLike<T> + ?Sized,
        P: Equivalence<T>,
    {
        let kept = self.partition_by(other, &equivalence, true);
        ComparableSet::from_elements(kept, equivalence)
    }

    /// Returns every element of `self` followed by the elements of `other`
    /// that are not equivalent to anything already collected (`self ∪ other`).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::{Intrinsic, set_from};
    ///
    /// let set = set_from([1, 2, 3, 4], Intrinsic);
    /// let other = set_from([3, 4, 5, 6, 7], Intrinsic);
    /// assert_eq!(set.union(&other).to_vec(), vec![1, 2, 3, 4, 5, 6, 7]);
    /// ```
    #[must_use]
    pub fn union<S: SetLike<T> + ?Sized>(&self, other: &S) -> Self {
        let mut store = self.store.borrow().clone();
        other.with_elements(|elements| {
            for element in elements {
                if !store.contains(element, &self.equivalence) {
                    store.push_unchecked(element.clone(), &self.equivalence);
                }
            }
        });
        Self::from_store(store, self.equivalence.clone())
    }

    /// Like [`union`](Self::union), but compares and deduplicates under
    /// `equivalence`. Elements of `self` that `equivalence` considers the
    /// same collapse to the first one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::{ByKey, Intrinsic, set_from};
    ///
    /// let set = set_from([11, 12, 25], Intrinsic);
    /// let union = set.union_with(&[19, 31], ByKey::new(|value: &i32| value / 10));
    /// assert_eq!(union.to_vec(), vec![11, 25, 31]);
    /// ```
    pub fn union_with<S, P>(&self, other: &S, equivalence: P) -> ComparableSet<T, P>
    where
        S: SetLike<T> + ?Sized,
        P: Equivalence<T>,
    {
        let mut store = BackingStore::build(self.to_vec(), &equivalence);
        other.with_elements(|elements| {
            for element in elements {
                store.insert(element.clone(), &equivalence);
            }
        });
        ComparableSet::from_store(store, equivalence)
    }

    /// Returns the elements of `self` with no equivalent in `other`
    /// (`self \ other`), in `self`'s order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::{Intrinsic, set_from};
    ///
    /// let set = set_from([1, 2, 3, 4], Intrinsic);
    /// assert_eq!(set.complement(&set_from([2, 3, 4], Intrinsic)).to_vec(), vec![1]);
    /// ```
    #[must_use]
    pub fn complement<S: SetLike<T> + ?Sized>(&self, other: &S) -> Self {
        self.derive(self.partition_by(other, &self.equivalence, false))
    }

    /// Like [`complement`](Self::complement), but compares and deduplicates
    /// under `equivalence`.
    pub fn complement_with<S, P>(&self, other: &S, equivalence: P) -> ComparableSet<T, P>
    where
        S: SetLike<T> + ?Sized,
        P: Equivalence<T>,
    {
        let kept = self.partition_by(other, &equivalence, false);
        ComparableSet::from_elements(kept, equivalence)
    }

    /// Returns `(self \ other) ∪ (other \ self)`.
    ///
    /// The result has the same members whichever operand comes first, but
    /// the iteration order depends on the call order. Compare results with
    /// [`equals`](Self::equals), not by order.
    #[must_use]
    pub fn symmetric_difference<S: SetLike<T> + ?Sized>(&self, other: &S) -> Self {
        let left_only = self.complement(other);
        let right_only = self.right_only(other, &self.equivalence);
        left_only.union(&right_only)
    }

    /// Like [`symmetric_difference`](Self::symmetric_difference), but compares
    /// and deduplicates under `equivalence`.
    pub fn symmetric_difference_with<S, P>(&self, other: &S, equivalence: P) -> ComparableSet<T, P>
    where
        S: SetLike<T> + ?Sized,
        P: Equivalence<T>,
    {
        let left_only = self.partition_by(other, &equivalence, false);
        let right_only = self.right_only(other, &equivalence);
        ComparableSet::from_elements(left_only.into_iter().chain(right_only), equivalence)
    }

    /// Returns every ordered pair `(a, b)` with `a` from `self` and `b` from
    /// `other`, `self` varying slowest.
    ///
    /// The pair strategy is mandatory: pairs are new values and only the
    /// caller knows how they should be compared.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::{Comparator, Intrinsic, set_from};
    ///
    /// let numbers = set_from([1, 2], Intrinsic);
    /// let letters = set_from(['a', 'b'], Intrinsic);
    /// let product = numbers.cartesian_product(
    ///     &letters,
    ///     Comparator::new(|left: &(i32, char), right: &(i32, char)| left == right),
    /// );
    /// assert_eq!(product.to_vec(), vec![(1, 'a'), (1, 'b'), (2, 'a'), (2, 'b')]);
    /// ```
    pub fn cartesian_product<U, S, P>(&self, other: &S, equivalence: P) -> ComparableSet<(T, U), P>
    where
        U: Clone,
        S: SetLike<U> + ?Sized,
        P: Equivalence<(T, U)>,
    {
        let pairs: Vec<(T, U)> = {
            let store = self.store.borrow();
            other.with_elements(|elements| {
                let right: Vec<&U> = elements.collect();
                store
                    .iter()
                    .flat_map(|left| right.iter().map(move |&element| (left.clone(), element.clone())))
                    .collect()
            })
        };
        ComparableSet::from_elements(pairs, equivalence)
    }

    // =========================================================================
    // Predicate Queries
    // =========================================================================

    /// Returns `true` if every element of `self` has an equivalent in `other`
    /// (`self ⊆ other`).
    #[must_use]
    pub fn is_subset_of<S: SetLike<T> + ?Sized>(&self, other: &S) -> bool {
        self.intersection(other).len() == self.len()
    }

    /// Returns `true` if `self ⊆ other` and `other` has more elements than the
    /// intersection.
    ///
    /// `other` is measured by its raw [`SetLike::size`], so repeated values
    /// in a non-canonical operand such as a `Vec` count towards it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::{Intrinsic, set_from};
    ///
    /// let set = set_from([1, 2], Intrinsic);
    /// assert!(set.is_proper_subset_of(&set_from([1, 2, 3], Intrinsic)));
    /// assert!(!set.is_proper_subset_of(&set_from([2, 1], Intrinsic)));
    /// assert!(set.is_proper_subset_of(&vec![1, 2, 2]));
    /// ```
    #[must_use]
    pub fn is_proper_subset_of<S: SetLike<T> + ?Sized>(&self, other: &S) -> bool {
        let common = self.intersection(other).len();
        common == self.len() && common < other.size()
    }

    /// Returns `true` if `self` and `other` hold exactly the same elements
    /// under `self`'s strategy.
    #[must_use]
    pub fn equals<S: SetLike<T> + ?Sized>(&self, other: &S) -> bool {
        let common = self.intersection(other).len();
        common == self.len() && common == other.size()
    }

    /// Negation of [`equals`](Self::equals).
    #[must_use]
    pub fn not_equals<S: SetLike<T> + ?Sized>(&self, other: &S) -> bool {
        !self.equals(other)
    }

    // =========================================================================
    // Functional Transforms
    // =========================================================================

    /// Applies `transform` to every element in iteration order and builds a
    /// new set of the results under `equivalence`.
    ///
    /// `transform` receives the element, its position and this set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::{Intrinsic, set_from};
    ///
    /// let lengths = set_from(["one", "two", "three", "four"], Intrinsic)
    ///     .map(|word, _, _| word.len(), Intrinsic);
    /// assert_eq!(lengths.to_vec(), vec![3, 5, 4]);
    /// ```
    pub fn map<U, P, F>(&self, mut transform: F, equivalence: P) -> ComparableSet<U, P>
    where
        P: Equivalence<U>,
        F: FnMut(&T, usize, &Self) -> U,
    {
        let mapped: Vec<U> = self
            .to_vec()
            .iter()
            .enumerate()
            .map(|(index, value)| transform(value, index, self))
            .collect();
        ComparableSet::from_elements(mapped, equivalence)
    }

    /// Keeps the elements for which `predicate` holds, in iteration order.
    ///
    /// `predicate` receives the element, its position and this set.
    #[must_use]
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        let kept: Vec<T> = self
            .to_vec()
            .into_iter()
            .enumerate()
            .filter(|(index, value)| predicate(value, *index, self))
            .map(|(_, value)| value)
            .collect();
        self.derive(kept)
    }

    /// Folds the elements from left to right, seeded with the first element.
    ///
    /// `combine` receives the accumulator, the current element, its position
    /// (starting at 1) and this set.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyReductionError`] if the set is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use comparable_sets::{Intrinsic, set_from};
    ///
    /// let set = set_from(1..=10, Intrinsic);
    /// assert_eq!(set.reduce(|sum, value, _, _| sum + value), Ok(55));
    /// ```
    pub fn reduce<F>(&self, mut combine: F) -> Result<T, EmptyReductionError>
    where
        F: FnMut(T, &T, usize, &Self) -> T,
    {
        let mut elements = self.to_vec().into_iter().enumerate();
        let (_, first) = elements.next().ok_or(EmptyReductionError)?;
        Ok(elements.fold(first, |accumulator, (index, value)| {
            combine(accumulator, &value, index, self)
        }))
    }

    /// Folds the elements from left to right starting from `seed`.
    ///
    /// `combine` receives the accumulator, the current element, its position
    /// and this set.
    pub fn fold<B, F>(&self, seed: B, mut combine: F) -> B
    where
        F: FnMut(B, &T, usize, &Self) -> B,
    {
        self.to_vec()
            .iter()
            .enumerate()
            .fold(seed, |accumulator, (index, value)| {
                combine(accumulator, value, index, self)
            })
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// Iterator over clones of a set's elements, see [`ComparableSet::iter`].
pub struct Iter<'a, T> {
    store: Ref<'a, BackingStore<T>>,
    position: usize,
}

impl<T: Clone> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.store.as_slice().get(self.position)?.clone();
        self.position += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.store.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for Iter<'_, T> {}

impl<T: Clone> FusedIterator for Iter<'_, T> {}

// =============================================================================
// Capability Implementations
// =============================================================================

impl<T, E> SetLike<T> for ComparableSet<T, E> {
    #[inline]
    fn size(&self) -> usize {
        self.len()
    }

    fn with_elements<R>(&self, visit: impl FnOnce(&mut dyn Iterator<Item = &T>) -> R) -> R {
        let store = self.store.borrow();
        visit(&mut store.iter())
    }
}

impl<T: Clone, E: Equivalence<T>> MutableSet<T> for ComparableSet<T, E> {
    type Values<'a>
        = Iter<'a, T>
    where
        Self: 'a;

    fn has(&self, value: &T) -> bool {
        Self::has(self, value)
    }

    fn add(&mut self, value: T) -> &mut Self {
        Self::add(self, value)
    }

    fn delete(&mut self, value: &T) -> bool {
        Self::delete(self, value)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn values(&self) -> Self::Values<'_> {
        self.iter()
    }

    /// Visits a snapshot of the elements, so `callback` may mutate handles
    /// that share this store.
    fn for_each(&self, mut callback: impl FnMut(&T, &T, &Self)) {
        for value in self.to_vec() {
            callback(&value, &value, self);
        }
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T: Clone, E: Clone> Clone for ComparableSet<T, E> {
    fn clone(&self) -> Self {
        Self::from_store(self.store.borrow().clone(), self.equivalence.clone())
    }
}

impl<T, E: Default> Default for ComparableSet<T, E> {
    fn default() -> Self {
        Self::from_store(BackingStore::new(), E::default())
    }
}

impl<T, E: Equivalence<T> + Default> FromIterator<T> for ComparableSet<T, E> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_elements(iter, E::default())
    }
}

/// Adds every element in turn, skipping equivalent ones.
///
/// # Panics
///
/// Panics if the source iterator borrows a handle sharing this set's store,
/// as in `set.extend(&alias)` with an alias made by
/// [`ComparableSet::from_set`] and [`Construction::Borrow`]. Snapshot the
/// alias first with `set.extend(alias.to_vec())`.
impl<T, E: Equivalence<T>> Extend<T> for ComparableSet<T, E> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.add(element);
        }
    }
}

impl<T: Clone, E> IntoIterator for ComparableSet<T, E> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    /// Moves the elements out when this is the only handle on the store, and
    /// copies them otherwise.
    fn into_iter(self) -> Self::IntoIter {
        match Rc::try_unwrap(self.store) {
            Ok(cell) => cell.into_inner().into_vec().into_iter(),
            Err(shared) => {
                let elements = shared.borrow().as_slice().to_vec();
                elements.into_iter()
            }
        }
    }
}

impl<'a, T: Clone, E> IntoIterator for &'a ComparableSet<T, E> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone, E: Equivalence<T> + Clone> PartialEq for ComparableSet<T, E> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<T: Clone + Eq + Hash> Eq for ComparableSet<T, Intrinsic> {}

impl<T: fmt::Debug, E> fmt::Debug for ComparableSet<T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_set()
            .entries(self.store.borrow().iter())
            .finish()
    }
}

impl<T: fmt::Display, E> fmt::Display for ComparableSet<T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for element in self.store.borrow().iter() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize, E> serde::Serialize for ComparableSet<T, E> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let store = self.store.borrow();
        let mut seq = serializer.serialize_seq(Some(store.len()))?;
        for element in store.iter() {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct ComparableSetVisitor<T, E> {
    marker: std::marker::PhantomData<(T, E)>,
}

#[cfg(feature = "serde")]
impl<'de, T, E> serde::de::Visitor<'de> for ComparableSetVisitor<T, E>
where
    T: serde::Deserialize<'de>,
    E: Equivalence<T> + Default,
{
    type Value = ComparableSet<T, E>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut set = ComparableSet::default();
        while let Some(element) = seq.next_element()? {
            set.add(element);
        }
        Ok(set)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, E> serde::Deserialize<'de> for ComparableSet<T, E>
where
    T: serde::Deserialize<'de>,
    E: Equivalence<T> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(ComparableSetVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equivalence::Comparator;
    use rstest::rstest;

    #[rstest]
    fn test_display_empty_set() {
        let set: ComparableSet<i32> = ComparableSet::new();
        assert_eq!(format!("{set}"), "{}");
    }

    #[rstest]
    fn test_display_keeps_insertion_order() {
        let set = set_from([3, 1, 2], Intrinsic);
        assert_eq!(format!("{set}"), "{3, 1, 2}");
        assert_eq!(format!("{set:?}"), "{3, 1, 2}");
    }

    #[rstest]
    fn test_borrowed_construction_shares_mutations_both_ways() {
        let mut source = set_from([1, 2, 3], Intrinsic);
        let mut alias = ComparableSet::from_set(&source, Construction::Borrow);

        alias.add(4);
        assert!(source.has(&4));
        assert!(source.delete(&1));
        assert_eq!(alias.to_vec(), vec![2, 3, 4]);

        source.clear();
        assert!(alias.is_empty());
    }

    #[rstest]
    fn test_copy_is_the_default_construction() {
        let source = set_from([1, 2], Intrinsic);
        let copy = ComparableSet::from_set(&source, Construction::default());
        assert!(!copy.shares_store_with(&source));
    }

    #[rstest]
    fn test_clone_never_aliases() {
        let source = set_from([1, 2], Intrinsic);
        let mut cloned = source.clone();
        cloned.add(3);
        assert_eq!(source.len(), 2);
        assert_eq!(cloned.len(), 3);
    }

    #[rstest]
    fn test_derived_sets_own_their_store() {
        let source = set_from([1, 2, 3], Intrinsic);
        let filtered = source.filter(|_, _, _| true);
        assert!(!filtered.shares_store_with(&source));
        assert!(!source.union(&source).shares_store_with(&source));
    }

    #[rstest]
    fn test_into_iter_copies_when_store_is_shared() {
        let source = set_from([1, 2, 3], Intrinsic);
        let alias = ComparableSet::from_set(&source, Construction::Borrow);
        let drained: Vec<i32> = alias.into_iter().collect();
        assert_eq!(drained, vec![1, 2, 3]);
        assert_eq!(source.len(), 3);
    }

    #[rstest]
    fn test_filter_callback_may_mutate_an_alias() {
        let source = set_from([1, 2, 3], Intrinsic);
        let mut alias = ComparableSet::from_set(&source, Construction::Borrow);
        let evens = source.filter(|value, _, _| {
            alias.add(value * 10);
            value % 2 == 0
        });
        assert_eq!(evens.to_vec(), vec![2]);
        assert_eq!(source.to_vec(), vec![1, 2, 3, 10, 20, 30]);
    }

    #[rstest]
    fn test_comparator_set_delete_removes_equivalent_element() {
        let parity = Comparator::new(|left: &i32, right: &i32| left % 2 == right % 2);
        let mut set = set_from([1, 2], parity);
        assert!(set.delete(&3));
        assert_eq!(set.to_vec(), vec![2]);
        assert!(!set.delete(&5));
    }

    #[rstest]
    fn test_iter_reports_exact_size() {
        let set = set_from(["a", "b", "c"], Intrinsic);
        let mut iter = set.iter();
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.len(), 2);
    }
}
