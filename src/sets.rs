//! Set algebra over ordered sequences.
//!
//! Every operation preserves the order of first occurrence in its primary
//! input and allocates a fresh output; inputs are never mutated.
//!
//! # Variants
//!
//! | Operation | Equality | Complexity |
//! |---|---|---|
//! | [`uniq`], [`intersection`], [`difference`] | [`Identical`] kernel | O(n·m) |
//! | [`uniq_by`], [`intersection_by`], [`difference_by`] | caller-supplied | O(n·m) |
//! | [`uniq_hashed`], [`intersection_hashed`], [`difference_hashed`] | `Eq + Hash` | O(n + m) expected |
//!
//! The hashed variants agree with the kernel variants for every type whose
//! `Eq` is exact-value equality (integers, strings, `char`, `bool`).

use std::collections::HashSet;
use std::hash::Hash;

use crate::equality::Identical;

/// Returns the first occurrence of every element, in input order.
///
/// # Complexity
/// Time: O(n²), Space: O(n)
///
/// # Examples
/// ```
/// use u_collections::sets::uniq;
/// assert_eq!(uniq(&[1, 2, 1, 3, 2]), vec![1, 2, 3]);
/// ```
pub fn uniq<T: Identical + Clone>(seq: &[T]) -> Vec<T> {
    uniq_by(seq, T::identical)
}

/// [`uniq`] with a caller-supplied equality.
///
/// # Examples
/// ```
/// use u_collections::sets::uniq_by;
/// let words = ["Apple", "apple", "Pear"];
/// let out = uniq_by(&words, |a, b| a.eq_ignore_ascii_case(b));
/// assert_eq!(out, vec!["Apple", "Pear"]);
/// ```
pub fn uniq_by<T, F>(seq: &[T], mut eq: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, &T) -> bool,
{
    let mut unique: Vec<T> = Vec::new();
    for item in seq {
        if !unique.iter().any(|seen| eq(seen, item)) {
            unique.push(item.clone());
        }
    }
    unique
}

/// [`uniq`] using a hash index.
///
/// # Complexity
/// Time: O(n) expected, Space: O(n)
pub fn uniq_hashed<T: Eq + Hash + Clone>(seq: &[T]) -> Vec<T> {
    let mut seen: HashSet<&T> = HashSet::with_capacity(seq.len());
    seq.iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

/// Returns the elements of the first sequence present in **all** sequences.
///
/// Output follows the order of `seqs[0]`; each value appears at most once
/// even if repeated in `seqs[0]`. A single sequence is returned as an
/// unchanged copy and zero sequences yield an empty result.
///
/// # Complexity
/// Time: O(n · Σmᵢ) where n = `seqs[0].len()`
///
/// # Examples
/// ```
/// use u_collections::sets::intersection;
/// let out = intersection(&[vec![1, 2, 3], vec![2, 3, 4], vec![3, 4, 5]]);
/// assert_eq!(out, vec![3]);
/// ```
pub fn intersection<T, S>(seqs: &[S]) -> Vec<T>
where
    T: Identical + Clone,
    S: AsRef<[T]>,
{
    intersection_by(seqs, T::identical)
}

/// [`intersection`] with a caller-supplied equality.
pub fn intersection_by<T, S, F>(seqs: &[S], mut eq: F) -> Vec<T>
where
    T: Clone,
    S: AsRef<[T]>,
    F: FnMut(&T, &T) -> bool,
{
    let Some((first, rest)) = seqs.split_first() else {
        return Vec::new();
    };
    let first = first.as_ref();
    if rest.is_empty() {
        return first.to_vec();
    }

    let mut result: Vec<T> = Vec::new();
    for item in first {
        if result.iter().any(|kept| eq(kept, item)) {
            continue;
        }
        let in_all = rest
            .iter()
            .all(|other| other.as_ref().iter().any(|x| eq(x, item)));
        if in_all {
            result.push(item.clone());
        }
    }
    result
}

/// [`intersection`] using hash indexes over the other sequences.
///
/// # Complexity
/// Time: O(n + Σmᵢ) expected
pub fn intersection_hashed<T, S>(seqs: &[S]) -> Vec<T>
where
    T: Eq + Hash + Clone,
    S: AsRef<[T]>,
{
    let Some((first, rest)) = seqs.split_first() else {
        return Vec::new();
    };
    let first = first.as_ref();
    if rest.is_empty() {
        return first.to_vec();
    }

    let indexes: Vec<HashSet<&T>> = rest
        .iter()
        .map(|other| other.as_ref().iter().collect())
        .collect();
    let mut emitted: HashSet<&T> = HashSet::new();
    first
        .iter()
        .filter(|item| indexes.iter().all(|index| index.contains(*item)))
        .filter(|item| emitted.insert(*item))
        .cloned()
        .collect()
}

/// Returns the elements of `seq` absent from every sequence in `others`.
///
/// Order and duplicates of `seq` are preserved. With no `others` the
/// result is an unchanged copy of `seq`.
///
/// # Complexity
/// Time: O(n · Σmᵢ)
///
/// # Examples
/// ```
/// use u_collections::sets::difference;
/// assert_eq!(difference(&[1, 2, 3, 4], &[vec![2, 4]]), vec![1, 3]);
/// assert_eq!(difference(&[1, 1, 2], &[vec![3], vec![2]]), vec![1, 1]);
/// ```
pub fn difference<T, S>(seq: &[T], others: &[S]) -> Vec<T>
where
    T: Identical + Clone,
    S: AsRef<[T]>,
{
    difference_by(seq, others, T::identical)
}

/// [`difference`] with a caller-supplied equality.
pub fn difference_by<T, S, F>(seq: &[T], others: &[S], mut eq: F) -> Vec<T>
where
    T: Clone,
    S: AsRef<[T]>,
    F: FnMut(&T, &T) -> bool,
{
    seq.iter()
        .filter(|item| {
            !others
                .iter()
                .any(|other| other.as_ref().iter().any(|x| eq(x, *item)))
        })
        .cloned()
        .collect()
}

/// [`difference`] using a single hash index over all of `others`.
///
/// # Complexity
/// Time: O(n + Σmᵢ) expected
pub fn difference_hashed<T, S>(seq: &[T], others: &[S]) -> Vec<T>
where
    T: Eq + Hash + Clone,
    S: AsRef<[T]>,
{
    let excluded: HashSet<&T> = others.iter().flat_map(|o| o.as_ref().iter()).collect();
    seq.iter()
        .filter(|item| !excluded.contains(*item))
        .cloned()
        .collect()
}
