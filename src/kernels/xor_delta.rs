//! This module contains the pure, stateless, and performant kernels for performing
//! XOR delta encoding and decoding.
//!
//! This is a Layer 1 (Value Reduction) transform. It is particularly effective
//! for data whose neighbours share their high-order bit patterns (ids drawn from
//! one range, float bit patterns cast to integers), where it isolates the few
//! bits that actually flip.

use crate::traits::PackedInt;

/// Performs XOR delta encoding against the previous value, seeded with `prev`.
///
/// Returns the last input value, the seed for the next block.
pub fn encode_block<T: PackedInt>(input: &[T], output: &mut [T], mut prev: T) -> T {
    for (out, &value) in output.iter_mut().zip(input) {
        *out = value ^ prev;
        prev = value;
    }
    prev
}

/// Reconstructs the original data from an XOR delta stream **in-place**.
pub fn decode_block_inplace<T: PackedInt>(data: &mut [T], mut prev: T) -> T {
    // Iterate forwards to use the newly-decoded values for subsequent XORs.
    for value in data.iter_mut() {
        prev = *value ^ prev;
        *value = prev;
    }
    prev
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_delta_roundtrip_u32() {
        let original: Vec<u32> = vec![0b1100, 0b1101, 0b1001, 0b1011];
        let expected_encoded: Vec<u32> = vec![0b1100, 0b0001, 0b0100, 0b0010];

        let mut encoded = vec![0u32; original.len()];
        encode_block(&original, &mut encoded, 0);
        assert_eq!(encoded, expected_encoded);

        decode_block_inplace(&mut encoded, 0);
        assert_eq!(encoded, original);
    }

    #[test]
    fn test_xor_delta_seed_is_applied_to_first_value() {
        let original: Vec<u64> = vec![0xFFFF_0001, 0xFFFF_0003];
        let mut encoded = vec![0u64; 2];
        let last = encode_block(&original, &mut encoded, 0xFFFF_0000);
        assert_eq!(encoded, vec![0b01, 0b10]);
        assert_eq!(last, 0xFFFF_0003);

        decode_block_inplace(&mut encoded, 0xFFFF_0000);
        assert_eq!(encoded, original);
    }

    #[test]
    fn test_xor_delta_empty_slice() {
        let original: Vec<u32> = vec![];
        let mut encoded: Vec<u32> = vec![];
        assert_eq!(encode_block(&original, &mut encoded, 9), 9);
        assert_eq!(decode_block_inplace(&mut encoded, 9), 9);
    }
}
