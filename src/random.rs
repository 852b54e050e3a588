//! Shuffling with an explicit, seedable random source.
//!
//! [`shuffle`] returns a shuffled copy and leaves its input untouched,
//! like every other sequence operation in this crate;
//! [`shuffle_in_place`] permutes a mutable slice directly.
//!
//! # Reproducibility
//!
//! Pass an RNG from [`create_rng`] with a fixed seed to get the same
//! permutation on every run on the same platform.

use rand::Rng;

/// Creates a fast, seeded random number generator (`SmallRng`).
///
/// # Examples
/// ```
/// use u_collections::random::create_rng;
/// use rand::Rng;
/// let mut a = create_rng(7);
/// let mut b = create_rng(7);
/// assert_eq!(a.random::<u64>(), b.random::<u64>());
/// ```
pub fn create_rng(seed: u64) -> rand::rngs::SmallRng {
    use rand::SeedableRng;
    rand::rngs::SmallRng::seed_from_u64(seed)
}

/// Fisher-Yates (Durstenfeld) in-place shuffle.
///
/// Every permutation is equally likely. Iterates backwards, swapping each
/// position with a uniformly chosen position at or before it.
///
/// Reference: Knuth (1997), *TAOCP* Vol. 2, §3.4.2, Algorithm P.
///
/// # Complexity
/// Time: O(n), Space: O(1)
pub fn shuffle_in_place<T, R: Rng>(slice: &mut [T], rng: &mut R) {
    for i in (1..slice.len()).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

/// Returns a uniformly shuffled copy of `seq`.
///
/// # Examples
/// ```
/// use u_collections::random::{create_rng, shuffle};
/// let original = vec![1, 2, 3, 4, 5];
/// let mut shuffled = shuffle(&original, &mut create_rng(42));
/// assert_eq!(original, vec![1, 2, 3, 4, 5]); // untouched
/// shuffled.sort();
/// assert_eq!(shuffled, original);
/// ```
pub fn shuffle<T: Clone, R: Rng>(seq: &[T], rng: &mut R) -> Vec<T> {
    let mut out = seq.to_vec();
    shuffle_in_place(&mut out, rng);
    out
}
