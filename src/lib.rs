//! # comparable-sets
//!
//! Insertion-ordered sets with a pluggable equivalence relation and a full
//! set algebra.
//!
//! ## Overview
//!
//! [`ComparableSet`] is a unique-element collection that can be used
//! anywhere a plain mutable set is expected (see [`MutableSet`]), extended
//! with:
//!
//! - **Set Algebra**: union, intersection, complement, symmetric difference,
//!   cartesian product
//! - **Predicate Queries**: subset, proper subset, equality
//! - **Functional Transforms**: map, filter, reduce, fold
//! - **Combinations**: one-element-per-operand enumeration across many sets
//!
//! Elements are compared through an explicit [`Equivalence`] strategy:
//! [`Intrinsic`] equality, a caller-supplied [`Comparator`] predicate, or
//! equality of a projected key with [`ByKey`].
//!
//! ## Feature Flags
//!
//! - `fxhash`: fingerprint hashed strategies with `FxHasher`
//! - `ahash`: fingerprint hashed strategies with `AHasher` (wins over `fxhash`)
//! - `serde`: `Serialize`/`Deserialize` for sets
//!
//! ## Example
//!
//! ```rust
//! use comparable_sets::prelude::*;
//!
//! let set_a = set_from([1, 2, 3, 4], Intrinsic);
//! let set_b = set_from([3, 4, 5, 6, 7], Intrinsic);
//!
//! assert!(set_a.union(&set_b).equals(&set_b.union(&set_a)));
//! assert_eq!(set_a.complement(&set_b).to_vec(), vec![1, 2]);
//! assert!(set_a.intersection(&set_b).is_proper_subset_of(&set_a));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use comparable_sets::prelude::*;
/// ```
pub mod prelude {
    pub use crate::capability::{MutableSet, SetLike};
    pub use crate::combination::enumerate_combinations;
    pub use crate::equivalence::{ByKey, Comparator, Equivalence, Intrinsic};
    pub use crate::error::EmptyReductionError;
    pub use crate::set::{ComparableSet, Construction, empty_set, set_from};
}

pub mod capability;
pub mod combination;
pub mod equivalence;
pub mod error;
pub mod set;
mod store;

pub use capability::{MutableSet, SetLike};
pub use combination::enumerate_combinations;
pub use equivalence::{ByKey, Comparator, Equivalence, Intrinsic};
pub use error::EmptyReductionError;
pub use set::{ComparableSet, Construction, empty_set, set_from};
