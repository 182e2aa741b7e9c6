//! Small widely-used helpers (spec component L): bit-count helpers, a
//! reservoir sampler, and the format helpers the index and CLI use for
//! human-readable sizes.
//!
//! Grounded on `original_source/utilities/mathsupport.hpp`
//! (`gttl_required_bits`, `popcount_uint64_t`, `mega_bytes`) translated from
//! compile-time/builtin tricks into the equivalent `u64`/`u32` intrinsics the
//! standard library already exposes.

/// Number of bits required to represent `value` (0 for `value == 0`),
/// mirroring `gttl_required_bits`.
#[inline]
pub fn required_bits(value: u64) -> u32 {
    64 - value.leading_zeros()
}

/// Population count of a `u64`, mirroring `popcount_uint64_t`.
#[inline]
pub fn popcount(value: u64) -> u32 {
    value.count_ones()
}

/// Largest value representable in `bits` bits (saturates at `u64::MAX` for
/// `bits >= 64`), mirroring `gttl_bits2maxvalue`.
#[inline]
pub fn bits_to_max_value(bits: u32) -> u64 {
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

/// Bytes expressed in mebibytes, for statistics/log output.
#[inline]
pub fn mega_bytes(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Reservoir sampling (Algorithm R): selects `k` indices uniformly at random
/// out of `0..n` in a single pass, without materializing `0..n`. Used to
/// spot-check suffix array / LCP correctness on large inputs without paying
/// for an exhaustive property test.
pub fn reservoir_sample_indices(n: usize, k: usize, rng: &mut impl rand::Rng) -> Vec<usize> {
    if k == 0 || n == 0 {
        return Vec::new();
    }
    let k = k.min(n);
    let mut reservoir: Vec<usize> = (0..k).collect();
    for i in k..n {
        let j = rng.random_range(0..=i);
        if j < k {
            reservoir[j] = i;
        }
    }
    reservoir
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn required_bits_matches_log2_ceil() {
        assert_eq!(required_bits(0), 0);
        assert_eq!(required_bits(1), 1);
        assert_eq!(required_bits(2), 2);
        assert_eq!(required_bits(3), 2);
        assert_eq!(required_bits(4), 3);
        assert_eq!(required_bits(255), 8);
    }

    #[test]
    fn bits_to_max_value_matches_pow2_minus_one() {
        assert_eq!(bits_to_max_value(0), 0);
        assert_eq!(bits_to_max_value(4), 15);
        assert_eq!(bits_to_max_value(64), u64::MAX);
    }

    #[test]
    fn popcount_matches_naive_count() {
        assert_eq!(popcount(0b1011), 3);
        assert_eq!(popcount(u64::MAX), 64);
    }

    #[test]
    fn reservoir_sample_is_within_range_and_unique() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        let sample = reservoir_sample_indices(1000, 17, &mut rng);
        assert_eq!(sample.len(), 17);
        let mut sorted = sample.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), sample.len());
        assert!(sample.iter().all(|&i| i < 1000));
    }

    #[test]
    fn reservoir_sample_caps_at_n() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
        let sample = reservoir_sample_indices(3, 100, &mut rng);
        assert_eq!(sample.len(), 3);
    }
}
