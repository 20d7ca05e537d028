//! This module contains the pure, stateless kernels for Zig-zag delta encoding
//! and decoding.
//!
//! This technique is a Layer 3 (Bit-Width Reduction) transform. The delta
//! between neighbours is reinterpreted as a signed value of the element width
//! and mapped onto the unsigned range so that small magnitudes of either sign
//! stay small: 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ... The mapping is done in
//! 64-bit arithmetic and masked back to the element width, so one generic
//! implementation serves every width without `unsafe` transmutes.

use crate::traits::PackedInt;

//==================================================================================
// 1. Generic Core Logic (The "Engine")
//==================================================================================

#[inline]
fn width_mask<T: PackedInt>() -> u64 {
    u64::MAX >> (64 - T::BITS)
}

/// Maps a two's-complement delta of width `T::BITS` to its zig-zag code.
#[inline]
pub fn encode_val<T: PackedInt>(delta: T) -> T {
    let d = delta.widen();
    let sign = (d >> (T::BITS - 1)) & 1;
    let zz = (d << 1) ^ 0u64.wrapping_sub(sign);
    T::narrow(zz & width_mask::<T>())
}

/// Inverse of [`encode_val`].
#[inline]
pub fn decode_val<T: PackedInt>(code: T) -> T {
    let z = code.widen();
    let d = (z >> 1) ^ 0u64.wrapping_sub(z & 1);
    T::narrow(d & width_mask::<T>())
}

//==================================================================================
// 2. Block API (seeded, seed-returning)
//==================================================================================

/// `out[i] = zigzag(in[i] - prev)`. Returns the last input value.
pub fn encode_block<T: PackedInt>(input: &[T], output: &mut [T], mut prev: T) -> T {
    for (out, &value) in output.iter_mut().zip(input) {
        *out = encode_val(value.wrapping_sub(&prev));
        prev = value;
    }
    prev
}

/// Inverse of [`encode_block`], **in-place**.
pub fn decode_block_inplace<T: PackedInt>(data: &mut [T], mut prev: T) -> T {
    for value in data.iter_mut() {
        prev = prev.wrapping_add(&decode_val(*value));
        *value = prev;
    }
    prev
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zigzag_core_logic_u32() {
        assert_eq!(encode_val(0u32), 0);
        assert_eq!(encode_val(u32::MAX), 1); // -1
        assert_eq!(encode_val(1u32), 2);
        assert_eq!(encode_val(u32::MAX - 1), 3); // -2

        assert_eq!(decode_val(0u32), 0);
        assert_eq!(decode_val(1u32), u32::MAX);
        assert_eq!(decode_val(2u32), 1);
    }

    #[test]
    fn test_zigzag_extremes_all_widths() {
        assert_eq!(encode_val(i8::MIN as u8), u8::MAX);
        assert_eq!(encode_val(i8::MAX as u8), u8::MAX - 1);
        assert_eq!(decode_val(encode_val(i64::MIN as u64)), i64::MIN as u64);
        assert_eq!(decode_val(encode_val(0x8000u16)), 0x8000);
    }

    #[test]
    fn test_zigzag_delta_roundtrip_u16() {
        let original: Vec<u16> = vec![100, 95, 96, 90, 200, 0];
        let mut encoded = vec![0u16; original.len()];
        encode_block(&original, &mut encoded, 100);
        assert_eq!(&encoded[..4], &[0, 9, 2, 11]);

        decode_block_inplace(&mut encoded, 100);
        assert_eq!(encoded, original);
    }
}
