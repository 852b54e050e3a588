//! Key-derived stable sorting and ragged zipping.
//!
//! # Sorting
//!
//! [`sort_by`] and [`try_sort_by`] use decorate-sort-undecorate: the key
//! function runs exactly once per element, keys are checked for a defined
//! ordering, then the element indices are stably sorted by key. Elements
//! with equal keys keep their input order.
//!
//! Keys only need [`PartialOrd`], but every pair of keys must be ordered.
//! A key that is not comparable to itself (e.g. `f64::NAN`) or to the first
//! key fails before sorting. Two keys that turn out to be unordered while
//! sorting (a partial order such as the product order on pairs) fail after
//! it. Either way the result is [`Error::IncomparableKeys`], never an
//! undefined ordering. The input is never mutated and no partial result is
//! returned on error.

use std::cmp::Ordering;

use crate::error::Error;

/// Returns a copy of `seq` sorted ascending by `key`, stable on ties.
///
/// # Errors
/// [`Error::IncomparableKeys`] if two keys have no defined ordering.
///
/// # Complexity
/// Time: O(n log n) comparisons plus n key evaluations, Space: O(n)
///
/// # Examples
/// ```
/// use u_collections::ordering::sort_by;
/// let people = [("moe", 40), ("curly", 60), ("larry", 50)];
/// let by_age = sort_by(&people, |p| p.1).unwrap();
/// assert_eq!(by_age, vec![("moe", 40), ("larry", 50), ("curly", 60)]);
///
/// let by_len = sort_by(&["ccc", "a", "bb", "d"], |s| s.len()).unwrap();
/// assert_eq!(by_len, vec!["a", "d", "bb", "ccc"]);
/// ```
pub fn sort_by<T, K, F>(seq: &[T], mut key: F) -> Result<Vec<T>, Error>
where
    T: Clone,
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    try_sort_by(seq, |item| Ok::<K, Error>(key(item)))
}

/// [`sort_by`] with a fallible key function.
///
/// The first key error is returned as-is; the key function is not called
/// for the remaining elements.
///
/// # Errors
/// - Any error returned by `key`.
/// - [`Error::IncomparableKeys`] (converted into `E`) if two keys have no
///   defined ordering.
///
/// # Examples
/// ```
/// use u_collections::{error::Error, ordering::try_sort_by};
/// let raw = ["10", "9", "x"];
/// let parsed = try_sort_by(&raw, |s| {
///     s.parse::<i32>().map_err(|e| Error::InvalidArgument(e.to_string()))
/// });
/// assert!(parsed.is_err());
/// ```
pub fn try_sort_by<T, K, E, F>(seq: &[T], mut key: F) -> Result<Vec<T>, E>
where
    T: Clone,
    K: PartialOrd,
    E: From<Error>,
    F: FnMut(&T) -> Result<K, E>,
{
    let keys = seq.iter().map(&mut key).collect::<Result<Vec<K>, E>>()?;
    check_comparable(&keys)?;

    let mut order: Vec<usize> = (0..seq.len()).collect();
    let mut unordered = None;
    // slice::sort_by is stable
    order.sort_by(|&a, &b| {
        keys[a].partial_cmp(&keys[b]).unwrap_or_else(|| {
            if unordered.is_none() {
                unordered = Some((a.min(b), a.max(b)));
            }
            Ordering::Equal
        })
    });
    // The sort may never compare an unordered pair; the result is a valid
    // chain only if every neighbour is ordered.
    let unordered = unordered.or_else(|| {
        order
            .windows(2)
            .find(|w| {
                !matches!(
                    keys[w[0]].partial_cmp(&keys[w[1]]),
                    Some(Ordering::Less | Ordering::Equal)
                )
            })
            .map(|w| (w[0].min(w[1]), w[0].max(w[1])))
    });
    if let Some((left, right)) = unordered {
        return Err(Error::IncomparableKeys { left, right }.into());
    }
    Ok(order.into_iter().map(|i| seq[i].clone()).collect())
}

fn check_comparable<K: PartialOrd>(keys: &[K]) -> Result<(), Error> {
    let Some(first) = keys.first() else {
        return Ok(());
    };
    for (i, k) in keys.iter().enumerate() {
        if k.partial_cmp(k).is_none() {
            return Err(Error::IncomparableKeys { left: i, right: i });
        }
        if first.partial_cmp(k).is_none() {
            return Err(Error::IncomparableKeys { left: 0, right: i });
        }
    }
    Ok(())
}

/// Transposes ragged sequences into tuples of equal width.
///
/// Tuple `i` holds `seqs[j][i]` for every input `j`, or `None` where
/// `seqs[j]` is shorter than the longest input. The output length is the
/// length of the longest input.
///
/// # Examples
/// ```
/// use u_collections::ordering::zip;
/// let letters = ["a", "b", "c"];
/// let numbers = ["1", "2"];
/// assert_eq!(
///     zip(&[&letters[..], &numbers[..]]),
///     vec![
///         vec![Some("a"), Some("1")],
///         vec![Some("b"), Some("2")],
///         vec![Some("c"), None],
///     ]
/// );
/// ```
pub fn zip<T, S>(seqs: &[S]) -> Vec<Vec<Option<T>>>
where
    T: Clone,
    S: AsRef<[T]>,
{
    let longest = seqs.iter().map(|s| s.as_ref().len()).max().unwrap_or(0);
    (0..longest)
        .map(|i| seqs.iter().map(|s| s.as_ref().get(i).cloned()).collect())
        .collect()
}
