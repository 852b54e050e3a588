//! Positional selection: leading and trailing elements, and lookup by
//! identity.
//!
//! Counts saturate at the sequence length, so asking for more elements
//! than exist returns the whole sequence rather than failing.

use crate::equality::Identical;

/// Returns the first element, or `None` for an empty sequence.
///
/// # Examples
/// ```
/// use u_collections::select::first;
/// assert_eq!(first(&[1, 2, 3]), Some(&1));
/// assert_eq!(first::<i32>(&[]), None);
/// ```
pub fn first<T>(seq: &[T]) -> Option<&T> {
    seq.first()
}

/// Returns the first `n` elements.
///
/// # Examples
/// ```
/// use u_collections::select::first_n;
/// assert_eq!(first_n(&[1, 2, 3], 2), &[1, 2]);
/// assert_eq!(first_n(&[1, 2, 3], 5), &[1, 2, 3]);
/// ```
pub fn first_n<T>(seq: &[T], n: usize) -> &[T] {
    &seq[..n.min(seq.len())]
}

/// Returns the last element, or `None` for an empty sequence.
pub fn last<T>(seq: &[T]) -> Option<&T> {
    seq.last()
}

/// Returns the last `n` elements, in their original order.
///
/// # Examples
/// ```
/// use u_collections::select::last_n;
/// assert_eq!(last_n(&[1, 2, 3, 4, 5], 2), &[4, 5]);
/// assert_eq!(last_n(&[1, 2, 3], 5), &[1, 2, 3]);
/// ```
pub fn last_n<T>(seq: &[T], n: usize) -> &[T] {
    &seq[seq.len().saturating_sub(n)..]
}

/// Returns the index of the first element identical to `target`.
///
/// # Examples
/// ```
/// use u_collections::select::index_of;
/// assert_eq!(index_of(&[10, 20, 30, 20], &20), Some(1));
/// assert_eq!(index_of(&[10, 20], &40), None);
/// ```
pub fn index_of<T: Identical>(seq: &[T], target: &T) -> Option<usize> {
    seq.iter().position(|x| x.identical(target))
}
