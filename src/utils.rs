//! Utility functions shared by the lattice procedures.
//!
//! Clipping helpers, deterministic per-column random streams and sampling
//! without replacement.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Clip `value` into the closed interval `[lo, hi]`.
///
/// # Examples
///
/// ```
/// use spatial_lattice::utils::clip;
///
/// assert_eq!(clip(1.4, 0.0, 1.0), 1.0);
/// assert_eq!(clip(-0.2, 0.0, 1.0), 0.0);
/// assert_eq!(clip(0.3, 0.0, 1.0), 0.3);
/// ```
#[inline]
pub fn clip(value: f64, lo: f64, hi: f64) -> f64 {
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

/// Create the random stream owned by one column.
///
/// The stream depends only on `(seed, column)`, so per-column initialization
/// gives identical results whatever order columns are visited in.
///
/// # Examples
///
/// ```
/// use spatial_lattice::utils::column_rng;
/// use rand::Rng;
///
/// let a: f64 = column_rng(42, 3).gen();
/// let b: f64 = column_rng(42, 3).gen();
/// assert_eq!(a, b);
/// ```
pub fn column_rng(seed: u64, column: usize) -> StdRng {
    // splitmix64 finalizer over the (seed, column) pair
    let mut z = seed ^ (column as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    StdRng::seed_from_u64(z)
}

/// Shuffle a slice of indices in-place using Fisher-Yates.
///
/// Only the first `n` positions are drawn; if `n >= arr.len()` the whole
/// slice is shuffled.
pub fn partial_shuffle<R: Rng>(arr: &mut [usize], n: usize, rng: &mut R) {
    let len = arr.len();
    let n = n.min(len);
    for i in 0..n {
        let j = rng.gen_range(i..len);
        arr.swap(i, j);
    }
}

/// Draw `n` distinct elements uniformly at random from `candidates`.
///
/// The result is sorted ascending. When `n` exceeds the number of candidates
/// every candidate is returned.
///
/// # Examples
///
/// ```
/// use spatial_lattice::utils::sample_without_replacement;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let picked = sample_without_replacement(&[1, 3, 5, 7, 9], 3, &mut rng);
/// assert_eq!(picked.len(), 3);
/// ```
pub fn sample_without_replacement<R: Rng>(candidates: &[usize], n: usize, rng: &mut R) -> Vec<usize> {
    let mut pool = candidates.to_vec();
    let n = n.min(pool.len());
    partial_shuffle(&mut pool, n, rng);
    pool.truncate(n);
    pool.sort_unstable();
    pool
}
