//! This module contains the pure, stateless bit-width helpers shared by every
//! backend: minimal field widths for bit-packing and encoded lengths for the
//! variable-byte formats. None of these functions allocate or fail.

use crate::traits::PackedInt;

/// Number of bits needed to represent `x` (0 for 0).
#[inline]
pub fn bits_needed(x: u64) -> u8 {
    (64 - x.leading_zeros()) as u8
}

/// Width needed to represent every value in `values`.
///
/// OR-ing the values first gives the same answer as taking the max of the
/// individual widths, with one `leading_zeros` at the end.
#[inline]
pub fn max_bits<T: PackedInt>(values: &[T]) -> u8 {
    let merged = values.iter().fold(0u64, |acc, v| acc | v.widen());
    bits_needed(merged)
}

/// Histogram of per-element widths: `hist[b]` counts values needing exactly `b` bits.
pub fn bit_histogram(values: &[u64]) -> [usize; 65] {
    let mut hist = [0usize; 65];
    for &v in values {
        hist[bits_needed(v) as usize] += 1;
    }
    hist
}

/// Encoded VByte length of `x`: one byte per started 7-bit group, at least one.
#[inline]
pub fn vblen<T: PackedInt>(x: T) -> usize {
    let bits = bits_needed(x.widen()) as usize;
    bits.div_ceil(7).max(1)
}

/// Length in bytes of the VByte value starting at `input[0]`.
///
/// Only the continuation bits are inspected; the value itself is not decoded.
/// A value whose terminating byte lies past the end of `input` reports the
/// bytes that are present, which the caller's bounded read then rejects.
#[inline]
pub fn vbvlen(input: &[u8]) -> usize {
    match input.iter().position(|&b| b & 0x80 == 0) {
        Some(last) => last + 1,
        None => input.len(),
    }
}

/// Worst-case VByte length for one element of type `T`.
#[inline]
pub fn vbmax<T: PackedInt>() -> usize {
    (T::BITS as usize).div_ceil(7)
}

/// Byte length of a little-endian value of `x` with no leading zero bytes (min 1).
#[inline]
pub fn byte_len(x: u64) -> usize {
    (bits_needed(x) as usize).div_ceil(8).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_needed_edges() {
        assert_eq!(bits_needed(0), 0);
        assert_eq!(bits_needed(1), 1);
        assert_eq!(bits_needed(255), 8);
        assert_eq!(bits_needed(256), 9);
        assert_eq!(bits_needed(u64::MAX), 64);
    }

    #[test]
    fn test_max_bits_matches_widest_value() {
        assert_eq!(max_bits::<u32>(&[]), 0);
        assert_eq!(max_bits(&[1u32, 2, 3, 16]), 5);
        assert_eq!(max_bits(&[u16::MAX]), 16);
    }

    #[test]
    fn test_vblen_300_is_two_bytes() {
        assert_eq!(vblen(300u32), 2);
        assert_eq!(vblen(0u32), 1);
        assert_eq!(vblen(127u8), 1);
        assert_eq!(vblen(128u8), 2);
        assert_eq!(vblen(u64::MAX), 10);
    }

    #[test]
    fn test_vbvlen_reads_continuation_bits_only() {
        assert_eq!(vbvlen(&[0xAC, 0x02, 0x55]), 2);
        assert_eq!(vbvlen(&[0x05]), 1);
        assert_eq!(vbvlen(&[0x80, 0x80]), 2);
    }

    #[test]
    fn test_histogram_counts_exact_widths() {
        let hist = bit_histogram(&[0, 1, 1, 7, 8, 1 << 40]);
        assert_eq!(hist[0], 1);
        assert_eq!(hist[1], 2);
        assert_eq!(hist[3], 1);
        assert_eq!(hist[4], 1);
        assert_eq!(hist[41], 1);
    }
}
