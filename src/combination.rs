//! Enumeration of combinations across several sets.

use smallvec::{SmallVec, smallvec};

use crate::capability::SetLike;
use crate::equivalence::Equivalence;
use crate::set::ComparableSet;

/// Enumerates every way of picking one element from each operand.
///
/// Combinations are produced in lexicographic order of operand positions:
/// the last operand varies fastest, the first slowest. Each combination is
/// built into a [`ComparableSet`] under `equivalence`, so elements repeated
/// within one combination collapse.
///
/// No operands, or any empty operand, yields no combinations.
///
/// # Examples
///
/// ```rust
/// use comparable_sets::{Intrinsic, enumerate_combinations, set_from};
///
/// let a = set_from(["a1"], Intrinsic);
/// let b = set_from(["b1", "b2"], Intrinsic);
/// let c = set_from(["c1", "c2"], Intrinsic);
///
/// let combinations: Vec<Vec<&str>> = enumerate_combinations(&[&a, &b, &c], Intrinsic)
///     .iter()
///     .map(|combination| combination.to_vec())
///     .collect();
/// assert_eq!(
///     combinations,
///     vec![
///         vec!["a1", "b1", "c1"],
///         vec!["a1", "b1", "c2"],
///         vec!["a1", "b2", "c1"],
///         vec!["a1", "b2", "c2"],
///     ]
/// );
/// ```
pub fn enumerate_combinations<T, S, E>(operands: &[S], equivalence: E) -> Vec<ComparableSet<T, E>>
where
    T: Clone,
    S: SetLike<T>,
    E: Equivalence<T> + Clone,
{
    let columns: Vec<Vec<T>> = operands
        .iter()
        .map(|operand| operand.with_elements(|elements| elements.cloned().collect()))
        .collect();
    if columns.is_empty() || columns.iter().any(Vec::is_empty) {
        return Vec::new();
    }

    let mut combinations = Vec::new();
    let mut cursor: SmallVec<[usize; 8]> = smallvec![0; columns.len()];
    loop {
        let combination = cursor
            .iter()
            .zip(&columns)
            .map(|(&position, column)| column[position].clone());
        combinations.push(ComparableSet::from_elements(combination, equivalence.clone()));

        // Advance like an odometer, starting from the last operand.
        let mut operand = columns.len();
        loop {
            if operand == 0 {
                return combinations;
            }
            operand -= 1;
            cursor[operand] += 1;
            if cursor[operand] < columns[operand].len() {
                break;
            }
            cursor[operand] = 0;
        }
    }
}
