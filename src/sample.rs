//! Seeded sample generators for tests and benchmarks.
//!
//! Every generator takes an explicit seed and draws from `StdRng`, so a failing
//! test or a benchmark run can be reproduced exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::traits::PackedInt;

/// `len` values uniform in `[0, 2^bits)`, truncated to `T`.
pub fn sample_standard<T: PackedInt>(seed: u64, len: usize, bits: u32) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mask = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
    (0..len).map(|_| T::narrow(rng.random::<u64>() & mask)).collect()
}

/// A non-decreasing sequence whose steps are uniform in `[delta_min, delta_max]`.
///
/// With `delta_min >= 1` the sequence is strictly increasing. Values wrap at
/// the width of `T`; keep `len * delta_max` inside it for a monotone result.
pub fn sample_increasing<T: PackedInt>(seed: u64, len: usize, delta_min: u64, delta_max: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut current = 0u64;
    (0..len)
        .map(|_| {
            current = current.wrapping_add(rng.random_range(delta_min..=delta_max));
            T::narrow(current)
        })
        .collect()
}

/// Small values (`< 2^bits`) with roughly `outlier_ratio` of them replaced by
/// values using the full width of `T`. The PFor exception path's workload.
pub fn sample_with_outliers<T: PackedInt>(seed: u64, len: usize, bits: u32, outlier_ratio: f64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mask = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
    let top = T::max_value().widen();
    (0..len)
        .map(|_| {
            if rng.random_bool(outlier_ratio) {
                T::narrow(top - rng.random_range(0..=top / 4))
            } else {
                T::narrow(rng.random::<u64>() & mask)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sample() {
        assert_eq!(sample_standard::<u32>(9, 50, 20), sample_standard::<u32>(9, 50, 20));
        assert!(sample_standard::<u32>(9, 50, 20).iter().all(|&v| v < (1 << 20)));
    }

    #[test]
    fn test_increasing_is_strict_with_positive_min_step() {
        let values = sample_increasing::<u64>(3, 1000, 1, 50);
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_outliers_present() {
        let values = sample_with_outliers::<u16>(5, 1000, 4, 0.05);
        let large = values.iter().filter(|&&v| v >= 16).count();
        assert!(large > 0 && large < 200);
    }
}
