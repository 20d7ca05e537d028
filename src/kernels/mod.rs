//! This module serves as the public API and dispatcher for the collection of all
//! pure, stateless codec kernels.
//!
//! It declares all kernel sub-modules and provides a single, unified `dispatch`
//! function for both encoding and decoding raw little-endian byte buffers. The
//! dispatcher is the entry point for callers that only know the element width
//! and codec at runtime: it takes a `CodecConfig` and an `ElementWidth` and
//! calls the appropriate generic codec implementation.

use crate::config::{Backend, CodecConfig};
use crate::error::IntPackError;
use crate::traits::{IntegerCodec, PackedInt};
use crate::types::ElementWidth;
use crate::utils::{bytes_to_typed_vec, typed_slice_to_bytes};

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Shared helpers
pub mod access;
pub mod bitwidth;

/// Layer 1: Value Reduction
pub mod delta;
pub mod transform;
pub mod xor_delta;

/// Layer 3: Bit-Width Reduction
pub mod bitpack;
pub mod lane;
pub mod zigzag;

/// Backends
pub mod elias_fano;
pub mod pfor;
pub mod turbobyte;
pub mod vbyte;

#[cfg(test)]
mod roundtrip_tests;

//==================================================================================
// 2. Generic Helpers
//==================================================================================

fn encode_bytes<T: PackedInt, C: IntegerCodec<T>>(
    codec: &C,
    input_bytes: &[u8],
    output_buf: &mut Vec<u8>,
    start: u64,
) -> Result<(), IntPackError> {
    let values = bytes_to_typed_vec::<T>(input_bytes)?;
    output_buf.clear();
    output_buf.resize(codec.max_compressed_len(values.len()), 0);
    let written = codec.encode(&values, output_buf, T::narrow(start))?;
    output_buf.truncate(written);
    Ok(())
}

fn decode_bytes<T: PackedInt, C: IntegerCodec<T>>(
    codec: &C,
    input_bytes: &[u8],
    output_buf: &mut Vec<u8>,
    num_values: usize,
    start: u64,
) -> Result<(), IntPackError> {
    let values = codec.decode_to_vec(input_bytes, num_values, T::narrow(start))?;
    typed_slice_to_bytes(&values, output_buf);
    Ok(())
}

fn unsupported(backend: Backend, width: ElementWidth) -> IntPackError {
    IntPackError::UnsupportedWidth {
        backend: backend.name(),
        bits: width.bits(),
    }
}

//==================================================================================
// 3. Public API (Unified Dispatchers)
//==================================================================================

/// The single, unified dispatcher for all ENCODE operations.
///
/// `input_bytes` holds little-endian elements of `width`; `start` is narrowed
/// to that width.
pub fn dispatch_encode(
    config: &CodecConfig,
    input_bytes: &[u8],
    output_buf: &mut Vec<u8>,
    width: ElementWidth,
    start: u64,
) -> Result<(), IntPackError> {
    config.validate()?;
    log::debug!("dispatch encode: backend={} width={} bytes={}", config.backend, width, input_bytes.len());

    match config.backend {
        Backend::Pfor => {
            let codec = config.pfor_codec();
            match width {
                ElementWidth::U8 => encode_bytes::<u8, _>(&codec, input_bytes, output_buf, start),
                ElementWidth::U16 => encode_bytes::<u16, _>(&codec, input_bytes, output_buf, start),
                ElementWidth::U32 => encode_bytes::<u32, _>(&codec, input_bytes, output_buf, start),
                ElementWidth::U64 => encode_bytes::<u64, _>(&codec, input_bytes, output_buf, start),
            }
        }
        Backend::VByte => {
            let codec = config.vbyte_codec();
            match width {
                ElementWidth::U8 => encode_bytes::<u8, _>(&codec, input_bytes, output_buf, start),
                ElementWidth::U16 => encode_bytes::<u16, _>(&codec, input_bytes, output_buf, start),
                ElementWidth::U32 => encode_bytes::<u32, _>(&codec, input_bytes, output_buf, start),
                ElementWidth::U64 => encode_bytes::<u64, _>(&codec, input_bytes, output_buf, start),
            }
        }
        Backend::TurboByte => {
            let codec = config.turbobyte_codec();
            match width {
                ElementWidth::U16 => encode_bytes::<u16, _>(&codec, input_bytes, output_buf, start),
                ElementWidth::U32 => encode_bytes::<u32, _>(&codec, input_bytes, output_buf, start),
                _ => Err(unsupported(config.backend, width)),
            }
        }
        Backend::EliasFano => {
            let codec = config.elias_fano_codec()?;
            match width {
                ElementWidth::U32 => encode_bytes::<u32, _>(&codec, input_bytes, output_buf, start),
                ElementWidth::U64 => encode_bytes::<u64, _>(&codec, input_bytes, output_buf, start),
                _ => Err(unsupported(config.backend, width)),
            }
        }
    }
}

/// The single, unified dispatcher for all DECODE operations.
///
/// `output_buf` receives `num_values` little-endian elements of `width`.
pub fn dispatch_decode(
    config: &CodecConfig,
    input_bytes: &[u8],
    output_buf: &mut Vec<u8>,
    width: ElementWidth,
    num_values: usize,
    start: u64,
) -> Result<(), IntPackError> {
    config.validate()?;
    log::debug!("dispatch decode: backend={} width={} n={}", config.backend, width, num_values);

    match config.backend {
        Backend::Pfor => {
            let codec = config.pfor_codec();
            match width {
                ElementWidth::U8 => decode_bytes::<u8, _>(&codec, input_bytes, output_buf, num_values, start),
                ElementWidth::U16 => decode_bytes::<u16, _>(&codec, input_bytes, output_buf, num_values, start),
                ElementWidth::U32 => decode_bytes::<u32, _>(&codec, input_bytes, output_buf, num_values, start),
                ElementWidth::U64 => decode_bytes::<u64, _>(&codec, input_bytes, output_buf, num_values, start),
            }
        }
        Backend::VByte => {
            let codec = config.vbyte_codec();
            match width {
                ElementWidth::U8 => decode_bytes::<u8, _>(&codec, input_bytes, output_buf, num_values, start),
                ElementWidth::U16 => decode_bytes::<u16, _>(&codec, input_bytes, output_buf, num_values, start),
                ElementWidth::U32 => decode_bytes::<u32, _>(&codec, input_bytes, output_buf, num_values, start),
                ElementWidth::U64 => decode_bytes::<u64, _>(&codec, input_bytes, output_buf, num_values, start),
            }
        }
        Backend::TurboByte => {
            let codec = config.turbobyte_codec();
            match width {
                ElementWidth::U16 => decode_bytes::<u16, _>(&codec, input_bytes, output_buf, num_values, start),
                ElementWidth::U32 => decode_bytes::<u32, _>(&codec, input_bytes, output_buf, num_values, start),
                _ => Err(unsupported(config.backend, width)),
            }
        }
        Backend::EliasFano => {
            let codec = config.elias_fano_codec()?;
            match width {
                ElementWidth::U32 => decode_bytes::<u32, _>(&codec, input_bytes, output_buf, num_values, start),
                ElementWidth::U64 => decode_bytes::<u64, _>(&codec, input_bytes, output_buf, num_values, start),
                _ => Err(unsupported(config.backend, width)),
            }
        }
    }
}

//==================================================================================
// 4. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::transform::Transform;

    fn to_bytes<T: PackedInt>(values: &[T]) -> Vec<u8> {
        let mut bytes = Vec::new();
        typed_slice_to_bytes(values, &mut bytes);
        bytes
    }

    #[test]
    fn test_dispatch_pfor_delta_u32() {
        let original: Vec<u32> = vec![100, 104, 104, 130, 131];
        let original_bytes = to_bytes(&original);
        let config = CodecConfig::new(Backend::Pfor, Transform::Delta);

        let mut compressed = Vec::new();
        dispatch_encode(&config, &original_bytes, &mut compressed, ElementWidth::U32, 100).unwrap();

        let mut decompressed = Vec::new();
        dispatch_decode(&config, &compressed, &mut decompressed, ElementWidth::U32, original.len(), 100).unwrap();
        assert_eq!(decompressed, original_bytes);
    }

    #[test]
    fn test_dispatch_every_supported_pair() {
        let original: Vec<u64> = (0..300u64).map(|i| i * 5 + (i % 4)).collect();
        for backend in [Backend::Pfor, Backend::VByte, Backend::TurboByte, Backend::EliasFano] {
            for width in [ElementWidth::U8, ElementWidth::U16, ElementWidth::U32, ElementWidth::U64] {
                let config = CodecConfig::new(backend, Transform::Delta);
                let bytes = match width {
                    ElementWidth::U8 => to_bytes(&original.iter().map(|&v| v as u8).collect::<Vec<_>>()),
                    ElementWidth::U16 => to_bytes(&original.iter().map(|&v| v as u16).collect::<Vec<_>>()),
                    ElementWidth::U32 => to_bytes(&original.iter().map(|&v| v as u32).collect::<Vec<_>>()),
                    ElementWidth::U64 => to_bytes(&original),
                };

                let mut compressed = Vec::new();
                let result = dispatch_encode(&config, &bytes, &mut compressed, width, 0);
                let supported = match backend {
                    Backend::TurboByte => matches!(width, ElementWidth::U16 | ElementWidth::U32),
                    Backend::EliasFano => matches!(width, ElementWidth::U32 | ElementWidth::U64),
                    _ => true,
                };
                if !supported {
                    assert!(matches!(result, Err(IntPackError::UnsupportedWidth { .. })));
                    continue;
                }
                result.unwrap();

                let mut decompressed = Vec::new();
                dispatch_decode(&config, &compressed, &mut decompressed, width, 300, 0).unwrap();
                assert_eq!(decompressed, bytes, "backend {} width {}", backend, width);
            }
        }
    }

    #[test]
    fn test_dispatch_rejects_ragged_input() {
        let config = CodecConfig::default();
        let mut out = Vec::new();
        let result = dispatch_encode(&config, &[1, 2, 3], &mut out, ElementWidth::U16, 0);
        assert!(matches!(result, Err(IntPackError::BufferMismatch(3, 2))));
    }

    #[test]
    fn test_dispatch_validates_config() {
        let config = CodecConfig::new(Backend::EliasFano, Transform::Xor);
        let mut out = Vec::new();
        let result = dispatch_encode(&config, &[0; 8], &mut out, ElementWidth::U32, 0);
        assert!(matches!(result, Err(IntPackError::InvalidConfig(_))));
    }
}
