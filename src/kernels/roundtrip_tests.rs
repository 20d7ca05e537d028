//! Cross-backend properties: every backend/transform/width combination must
//! round-trip, random access must agree with a full decode, and searches must
//! agree with a linear scan of the original values.

use super::access::RandomAccess;
use super::elias_fano::EliasFanoCodec;
use super::pfor::PforCodec;
use super::transform::Transform;
use super::turbobyte::TurboByteCodec;
use super::vbyte::VByteCodec;
use crate::error::IntPackError;
use crate::sample::{sample_increasing, sample_standard, sample_with_outliers};
use crate::traits::{IntegerCodec, PackedInt};
use crate::types::LaneWidth;

const TRANSFORMS: [Transform; 7] = [
    Transform::Identity,
    Transform::Delta,
    Transform::DeltaStrict,
    Transform::ZigZag,
    Transform::DoubleDelta,
    Transform::Xor,
    Transform::For,
];

const LANES: [LaneWidth; 3] = [LaneWidth::Scalar, LaneWidth::V128, LaneWidth::V256];

const LENGTHS: [usize; 6] = [0, 1, 5, 128, 129, 700];

//==================================================================================
// Helpers
//==================================================================================

fn assert_roundtrip<T, C>(codec: &C, original: &[T], start: T, label: &str)
where
    T: PackedInt,
    C: IntegerCodec<T>,
{
    let mut buf = vec![0u8; codec.max_compressed_len(original.len())];
    let written = codec.encode(original, &mut buf, start).unwrap();
    assert!(written <= buf.len(), "{}: wrote past the bound", label);

    let mut decoded = vec![T::zero(); original.len()];
    let consumed = codec.decode(&buf[..written], original.len(), &mut decoded, start).unwrap();
    assert_eq!(consumed, written, "{}: consumed != written", label);
    assert_eq!(decoded, original, "{}", label);
}

fn assert_access<T, C>(codec: &C, original: &[T], start: T, label: &str)
where
    T: PackedInt,
    C: IntegerCodec<T> + RandomAccess<T>,
{
    let n = original.len();
    let encoded = codec.encode_to_vec(original, start).unwrap();
    for (i, &v) in original.iter().enumerate() {
        assert_eq!(codec.get(&encoded, n, i, start).unwrap(), v, "{}: get({})", label, i);
    }
    assert!(matches!(
        codec.get(&encoded, n, n, start),
        Err(IntPackError::IndexOutOfBounds { .. })
    ));

    // Probe keys taken from the data plus one past the end.
    let probes = [0, n / 3, n / 2, n.saturating_sub(1)];
    for &from in &probes {
        for &at in &probes {
            if at >= n {
                continue;
            }
            let key = original[at];
            let expected_eq = (from..n).find(|&i| original[i] == key).unwrap_or(n);
            let expected_geq = (from..n).find(|&i| original[i] >= key).unwrap_or(n);
            assert_eq!(codec.geteq(&encoded, n, from, key, start).unwrap(), expected_eq, "{}: geteq", label);
            assert_eq!(codec.getgeq(&encoded, n, from, key, start).unwrap(), expected_geq, "{}: getgeq", label);
        }
    }
    assert_eq!(codec.getgeq(&encoded, n, n, T::zero(), start).unwrap(), n);
}

//==================================================================================
// Round-trip for every combination
//==================================================================================

fn pfor_all<T: PackedInt>(bits: u32) {
    for &len in &LENGTHS {
        let data = sample_with_outliers::<T>(len as u64, len, bits, 0.03);
        for transform in TRANSFORMS {
            for lane in LANES {
                let codec = PforCodec::new(lane).with_transform(transform);
                let label = format!("pfor {} {} u{} n={}", lane, transform, T::BITS, len);
                assert_roundtrip(&codec, &data, T::narrow(3), &label);
            }
        }
    }
}

fn vbyte_all<T: PackedInt>(bits: u32) {
    for &len in &LENGTHS {
        let data = sample_standard::<T>(len as u64 + 11, len, bits);
        for transform in TRANSFORMS {
            let codec = VByteCodec::new(transform);
            let label = format!("vbyte {} u{} n={}", transform, T::BITS, len);
            assert_roundtrip(&codec, &data, T::narrow(7), &label);
        }
    }
}

#[test]
fn test_pfor_roundtrip_every_width() {
    pfor_all::<u8>(5);
    pfor_all::<u16>(9);
    pfor_all::<u32>(17);
    pfor_all::<u64>(40);
}

#[test]
fn test_vbyte_roundtrip_every_width() {
    vbyte_all::<u8>(8);
    vbyte_all::<u16>(16);
    vbyte_all::<u32>(32);
    vbyte_all::<u64>(64);
}

#[test]
fn test_turbobyte_roundtrip_16_and_32() {
    for &len in &LENGTHS {
        let small = sample_standard::<u16>(len as u64, len, 16);
        let wide = sample_standard::<u32>(len as u64, len, 32);
        for transform in TRANSFORMS {
            for lane in LANES {
                let codec = TurboByteCodec::new(lane).with_transform(transform);
                assert_roundtrip(&codec, &small, 1u16, &format!("turbobyte {} {} u16 n={}", lane, transform, len));
                assert_roundtrip(&codec, &wide, 1u32, &format!("turbobyte {} {} u32 n={}", lane, transform, len));
            }
        }
    }
}

#[test]
fn test_elias_fano_roundtrip_32_and_64() {
    for &len in &LENGTHS {
        let loose = sample_increasing::<u32>(len as u64, len, 0, 40);
        let strict = sample_increasing::<u64>(len as u64, len, 1, 1 << 20);
        assert_roundtrip(&EliasFanoCodec::new(false), &loose, 0u32, &format!("ef n={}", len));
        assert_roundtrip(&EliasFanoCodec::new(true), &strict, 0u64, &format!("ef strict n={}", len));
    }
}

//==================================================================================
// Lane bit-exactness
//==================================================================================

#[test]
fn test_pfor_lanes_are_bit_exact() {
    let data = sample_with_outliers::<u32>(99, 2000, 11, 0.02);
    for transform in [Transform::Identity, Transform::ZigZag] {
        let reference = PforCodec::new(LaneWidth::Scalar)
            .with_block_size(256)
            .with_transform(transform)
            .encode_to_vec(&data, 0)
            .unwrap();
        for lane in LANES {
            let codec = PforCodec::new(lane).with_block_size(256).with_transform(transform);
            assert_eq!(codec.encode_to_vec(&data, 0).unwrap(), reference, "lane {}", lane);
            assert_eq!(codec.decode_to_vec(&reference, data.len(), 0u32).unwrap(), data);
        }
    }
}

//==================================================================================
// Random access and search
//==================================================================================

#[test]
fn test_access_agrees_with_decode() {
    let sorted = sample_increasing::<u32>(21, 600, 0, 9);
    let noisy = sample_with_outliers::<u32>(22, 600, 6, 0.02);

    for transform in TRANSFORMS {
        for lane in LANES {
            let pfor = PforCodec::new(lane).with_transform(transform);
            assert_access(&pfor, &sorted, 0u32, &format!("pfor {} {} sorted", lane, transform));
            assert_access(&pfor, &noisy, 0u32, &format!("pfor {} {} noisy", lane, transform));

            let turbo = TurboByteCodec::new(lane).with_transform(transform);
            assert_access(&turbo, &noisy, 0u32, &format!("turbobyte {} {}", lane, transform));
        }
        assert_access(&VByteCodec::new(transform), &noisy, 0u32, &format!("vbyte {}", transform));
    }

    assert_access(&EliasFanoCodec::new(false), &sorted, 0u32, "ef");
    let strict = sample_increasing::<u64>(23, 600, 1, 1000);
    assert_access(&EliasFanoCodec::new(true), &strict, 0u64, "ef strict");
}

#[test]
fn test_frame_of_reference_access_above_base() {
    const BASE: u32 = 3_000_000;
    let noisy: Vec<u32> = sample_with_outliers::<u32>(24, 500, 7, 0.02)
        .into_iter()
        .map(|v| BASE + if v < 128 { v } else { v >> 8 })
        .collect();
    let sorted: Vec<u32> = sample_increasing::<u32>(25, 500, 0, 5).into_iter().map(|v| BASE + v).collect();

    for lane in LANES {
        let pfor = PforCodec::new(lane).with_block_size(64).with_transform(Transform::For);
        let encoded = pfor.encode_to_vec(&noisy, BASE).unwrap();
        // Offsets fit far below the 32-bit frame the raw values would need.
        assert!(encoded.len() < noisy.len() * 3);
        assert_access(&pfor, &noisy, BASE, &format!("pfor for {}", lane));

        let turbo = TurboByteCodec::new(lane).with_transform(Transform::For);
        assert_access(&turbo, &noisy, BASE, &format!("turbobyte for {}", lane));
    }
    assert_access(&VByteCodec::new(Transform::For), &noisy, BASE, "vbyte for");
    assert_access(&EliasFanoCodec::new(false), &sorted, BASE, "ef above base");
}

//==================================================================================
// Exception boundary and degenerate sequences
//==================================================================================

#[test]
fn test_one_large_outlier_roundtrips() {
    for lane in LANES {
        let mut data: Vec<u64> = (0..256u64).map(|i| i % 16).collect();
        data[200] = u64::MAX;
        let codec = PforCodec::new(lane).with_block_size(256);
        let encoded = codec.encode_to_vec(&data, 0).unwrap();
        // 4-bit block plus one 64-bit exception, far below the 64-bit frame.
        assert_eq!(encoded[0] & 0x7F, 4);
        assert!(encoded.len() < 1 + 256 * 8 / 4);
        assert_eq!(codec.decode_to_vec(&encoded, 256, 0u64).unwrap(), data);
        assert_eq!(codec.get(&encoded, 256, 200, 0u64).unwrap(), u64::MAX);
    }
}

#[test]
fn test_elias_fano_dense_and_all_equal() {
    let dense: Vec<u64> = (0..1000).collect();
    let equal: Vec<u64> = vec![123_456_789; 1000];
    let codec = EliasFanoCodec::default();
    for data in [dense, equal] {
        assert_roundtrip(&codec, &data, 0u64, "ef degenerate");
        assert_access(&codec, &data, 0u64, "ef degenerate");
    }
}

//==================================================================================
// Fixed scenarios
//==================================================================================

#[test]
fn test_scenario_sorted_with_duplicates() {
    let data: Vec<u32> = vec![10, 10, 12, 12, 12, 20];
    let codec = PforCodec::default().with_block_size(6).with_transform(Transform::Delta);
    let encoded = codec.encode_to_vec(&data, 0).unwrap();
    assert_eq!(codec.decode_to_vec(&encoded, 6, 0u32).unwrap(), data);
    assert_eq!(codec.get(&encoded, 6, 3, 0u32).unwrap(), 12);
}

#[test]
fn test_scenario_vbyte_300() {
    let codec = VByteCodec::default();
    let encoded = codec.encode_to_vec(&[300u32], 0).unwrap();
    assert_eq!(encoded, vec![0xAC, 0x02]);
    assert_eq!(codec.decode_to_vec(&encoded, 1, 0u32).unwrap(), vec![300]);
}

//==================================================================================
// Buffer safety
//==================================================================================

#[test]
fn test_short_output_never_written_past() {
    let data = sample_standard::<u32>(5, 300, 32);
    let pfor = PforCodec::default();
    let full = pfor.encode_to_vec(&data, 0).unwrap();

    let mut buf = vec![0xEEu8; full.len() + 8];
    let capacity = full.len() - 1;
    let err = pfor.encode(&data, &mut buf[..capacity], 0).unwrap_err();
    assert!(matches!(err, IntPackError::OutputOverflow { .. }));
    assert!(buf[capacity..].iter().all(|&b| b == 0xEE));

    let vbyte = VByteCodec::default();
    let mut tiny = [0u8; 3];
    assert!(matches!(vbyte.encode(&data, &mut tiny, 0), Err(IntPackError::OutputOverflow { .. })));
}

#[test]
fn test_truncated_input_is_reported() {
    let data = sample_standard::<u16>(6, 200, 12);
    let truncated = |bytes: Vec<u8>| bytes[..bytes.len() / 2].to_vec();

    let pfor = PforCodec::default();
    let cut = truncated(pfor.encode_to_vec(&data, 0).unwrap());
    assert!(matches!(pfor.decode_to_vec(&cut, 200, 0u16), Err(IntPackError::TruncatedInput { .. })));

    let vbyte = VByteCodec::default();
    let cut = truncated(vbyte.encode_to_vec(&data, 0).unwrap());
    assert!(matches!(vbyte.decode_to_vec(&cut, 200, 0u16), Err(IntPackError::TruncatedInput { .. })));

    let turbo = TurboByteCodec::default();
    let cut = truncated(turbo.encode_to_vec(&data, 0).unwrap());
    assert!(matches!(turbo.decode_to_vec(&cut, 200, 0u16), Err(IntPackError::TruncatedInput { .. })));
}

#[test]
fn test_decode_into_short_slice() {
    let codec = VByteCodec::default();
    let encoded = codec.encode_to_vec(&[1u32, 2, 3], 0).unwrap();
    let mut out = [0u32; 2];
    assert_eq!(
        codec.decode(&encoded, 3, &mut out, 0).unwrap_err(),
        IntPackError::OutputTooShort { needed: 3, capacity: 2 }
    );
}
