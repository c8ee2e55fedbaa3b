//! Error types.
//!
//! Set operations are total with a single exception: folding an empty set
//! without a seed value has no result. That case is reported as
//! [`EmptyReductionError`].

use thiserror::Error;

/// Returned by [`ComparableSet::reduce`](crate::ComparableSet::reduce) when
/// the set is empty.
///
/// Use [`ComparableSet::fold`](crate::ComparableSet::fold) with an explicit
/// seed when an empty set is an expected input.
///
/// # Examples
///
/// ```rust
/// use comparable_sets::{ComparableSet, EmptyReductionError};
///
/// let empty: ComparableSet<i32> = ComparableSet::new();
/// let result = empty.reduce(|sum, value, _, _| sum + value);
/// assert_eq!(result, Err(EmptyReductionError));
/// assert_eq!(
///     EmptyReductionError.to_string(),
///     "cannot reduce an empty set without a seed value"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("cannot reduce an empty set without a seed value")]
pub struct EmptyReductionError;
