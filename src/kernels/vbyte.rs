//! This module contains the VByte backend: LEB128-style variable-byte coding of
//! (transformed) integers.
//!
//! This technique is a Layer 3 (Bit-Width Reduction) transform, ideal for
//! streams where most values (or most deltas) are small. Each value is written
//! as 7-bit groups, least-significant group first, with the high bit of every
//! byte but the last set as a continuation flag: `300 -> [0xAC, 0x02]`.
//!
//! The stream has no block structure, so random access skips values one at a
//! time. With the identity transform a skip only looks at continuation bits;
//! any other transform has to decode every value before the target to carry
//! its running state. `VByteCursor` keeps that position and state between
//! calls so a sequence of searches over one buffer never rescans from zero.

use super::access::{check_index, RandomAccess, SearchMode};
use super::bitwidth::{vbmax, vbvlen};
use super::transform::{Transform, TransformState};
use crate::buffer::{ByteReader, ByteWriter};
use crate::error::IntPackError;
use crate::traits::{IntegerCodec, PackedInt};

/// Values transformed per scratch chunk during encode.
const ENCODE_CHUNK: usize = 256;

//==================================================================================
// 1. Single-Value Operations
//==================================================================================

/// Appends one VByte-coded value to `writer`.
pub fn write_one(writer: &mut ByteWriter<'_>, mut value: u64) -> Result<(), IntPackError> {
    let mut bytes = [0u8; 10];
    let mut len = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            bytes[len] = byte;
            len += 1;
            break;
        }
        bytes[len] = byte | 0x80;
        len += 1;
    }
    writer.put_slice(&bytes[..len])
}

/// Reads one VByte-coded value of type `T` from `reader`.
///
/// A value running longer than `ceil(T::BITS / 7)` bytes cannot have been
/// written for `T` and is reported as corrupt.
pub fn read_one<T: PackedInt>(reader: &mut ByteReader<'_>) -> Result<T, IntPackError> {
    let mut value = 0u64;
    for group in 0..vbmax::<T>() {
        let byte = reader.take_u8()?;
        value |= ((byte & 0x7F) as u64) << (7 * group);
        if byte & 0x80 == 0 {
            return Ok(T::narrow(value));
        }
    }
    Err(IntPackError::CorruptHeader(format!(
        "VByte value longer than {} bytes for a {}-bit element",
        vbmax::<T>(),
        T::BITS
    )))
}

/// Skips one VByte-coded value without decoding it.
#[inline]
pub fn skip_one(reader: &mut ByteReader<'_>) -> Result<(), IntPackError> {
    let len = vbvlen(reader.rest());
    if len == 0 {
        return Err(IntPackError::TruncatedInput { needed: 1, available: 0 });
    }
    reader.skip(len)
}

//==================================================================================
// 2. Codec
//==================================================================================

/// VByte backend. Supports every element width and every transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VByteCodec {
    transform: Transform,
}

impl VByteCodec {
    pub fn new(transform: Transform) -> Self {
        VByteCodec { transform }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// A resumable reader positioned before the first value.
    pub fn cursor<'a, T: PackedInt>(&self, input: &'a [u8], n: usize, start: T) -> VByteCursor<'a, T> {
        VByteCursor {
            reader: ByteReader::new(input),
            transform: self.transform,
            state: TransformState::seed(start),
            index: 0,
            n,
        }
    }
}

impl<T: PackedInt> IntegerCodec<T> for VByteCodec {
    fn max_compressed_len(&self, n: usize) -> usize {
        n * vbmax::<T>()
    }

    fn encode(&self, input: &[T], output: &mut [u8], start: T) -> Result<usize, IntPackError> {
        let mut writer = ByteWriter::new(output);
        let mut scratch = vec![T::zero(); ENCODE_CHUNK.min(input.len())];
        let mut state = TransformState::seed(start);

        for chunk in input.chunks(ENCODE_CHUNK) {
            let codes = &mut scratch[..chunk.len()];
            state = self.transform.forward(chunk, codes, state);
            for &code in codes.iter() {
                write_one(&mut writer, code.widen())?;
            }
        }

        log::debug!(
            "vbyte encode: n={} transform={} bytes={}",
            input.len(),
            self.transform,
            writer.position()
        );
        Ok(writer.position())
    }

    fn decode(&self, input: &[u8], n: usize, output: &mut [T], start: T) -> Result<usize, IntPackError> {
        if output.len() < n {
            return Err(IntPackError::OutputTooShort {
                needed: n,
                capacity: output.len(),
            });
        }
        let mut reader = ByteReader::new(input);
        let values = &mut output[..n];
        for slot in values.iter_mut() {
            *slot = read_one(&mut reader)?;
        }
        self.transform.inverse(values, TransformState::seed(start));
        Ok(reader.position())
    }
}

impl<T: PackedInt> RandomAccess<T> for VByteCodec {
    fn get(&self, input: &[u8], n: usize, index: usize, start: T) -> Result<T, IntPackError> {
        check_index(index, n)?;
        let mut cursor = self.cursor(input, n, start);
        cursor.advance_to(index)?;
        cursor
            .next_value()?
            .ok_or(IntPackError::IndexOutOfBounds { index, len: n })
    }

    fn search(
        &self,
        input: &[u8],
        n: usize,
        from_index: usize,
        key: T,
        start: T,
        mode: SearchMode,
    ) -> Result<usize, IntPackError> {
        if from_index >= n {
            return Ok(n);
        }
        let mut cursor = self.cursor(input, n, start);
        cursor.advance_to(from_index)?;
        cursor.seek(key, mode)
    }
}

//==================================================================================
// 3. Resumable Cursor
//==================================================================================

/// A position inside a VByte stream together with the transform state there.
///
/// `seek_eq` / `seek_geq` leave the cursor *on* the matching value, so calling
/// them again with the same key returns the same index, and a larger key
/// continues from there.
#[derive(Debug, Clone, Copy)]
pub struct VByteCursor<'a, T> {
    reader: ByteReader<'a>,
    transform: Transform,
    state: TransformState<T>,
    index: usize,
    n: usize,
}

impl<'a, T: PackedInt> VByteCursor<'a, T> {
    /// Index of the value the next read returns.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Bytes consumed from the buffer so far.
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Decodes the next value, or `None` once all `n` have been read.
    pub fn next_value(&mut self) -> Result<Option<T>, IntPackError> {
        if self.index >= self.n {
            return Ok(None);
        }
        let code = read_one::<T>(&mut self.reader)?;
        let value = self.transform.inverse_one(code, &mut self.state);
        self.index += 1;
        Ok(Some(value))
    }

    /// Moves forward to `index` (no-op when already past it).
    pub fn advance_to(&mut self, index: usize) -> Result<(), IntPackError> {
        let target = index.min(self.n);
        if self.transform.is_stateful() {
            while self.index < target {
                self.next_value()?;
            }
        } else {
            while self.index < target {
                skip_one(&mut self.reader)?;
                self.index += 1;
            }
        }
        Ok(())
    }

    pub fn seek_eq(&mut self, key: T) -> Result<usize, IntPackError> {
        self.seek(key, SearchMode::Equal)
    }

    pub fn seek_geq(&mut self, key: T) -> Result<usize, IntPackError> {
        self.seek(key, SearchMode::AtLeast)
    }

    fn seek(&mut self, key: T, mode: SearchMode) -> Result<usize, IntPackError> {
        loop {
            let before = *self;
            match self.next_value()? {
                None => return Ok(self.n),
                Some(value) if mode.matches(value, key) => {
                    *self = before;
                    return Ok(self.index);
                }
                Some(_) => {}
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

    #[test]
    fn test_300_encodes_as_ac_02() {
        let codec = VByteCodec::default();
        let encoded = codec.encode_to_vec(&[300u32], 0).unwrap();
        assert_eq!(encoded, vec![0xAC, 0x02]);
        assert_eq!(codec.decode_to_vec(&encoded, 1, 0u32).unwrap(), vec![300]);
    }

    #[test]
    fn test_roundtrip_u64_extremes() {
        let codec = VByteCodec::default();
        let original: Vec<u64> = vec![0, 1, 127, 128, u64::MAX, 1 << 63];
        let encoded = codec.encode_to_vec(&original, 0).unwrap();
        assert!(encoded.len() <= IntegerCodec::<u64>::max_compressed_len(&codec, original.len()));
        assert_eq!(codec.decode_to_vec(&encoded, original.len(), 0u64).unwrap(), original);
    }

    #[test]
    fn test_delta_shrinks_sorted_input() {
        let original: Vec<u32> = (0..100).map(|i| 1_000_000 + i * 3).collect();
        let plain = VByteCodec::default().encode_to_vec(&original, 0).unwrap();
        let codec = VByteCodec::new(Transform::Delta);
        let packed = codec.encode_to_vec(&original, 1_000_000).unwrap();
        assert_eq!(packed.len(), 100);
        assert!(packed.len() < plain.len());
        assert_eq!(codec.decode_to_vec(&packed, 100, 1_000_000u32).unwrap(), original);
    }

    #[test]
    fn test_encode_reports_overflow() {
        let codec = VByteCodec::default();
        let mut out = [0u8; 2];
        let err = codec.encode(&[1u32, 300], &mut out, 0).unwrap_err();
        assert_eq!(err, IntPackError::OutputOverflow { needed: 3, capacity: 2 });
    }

    #[test]
    fn test_decode_reports_truncation() {
        let codec = VByteCodec::default();
        let err = codec.decode_to_vec(&[0xAC], 1, 0u32).unwrap_err();
        assert!(matches!(err, IntPackError::TruncatedInput { .. }));
    }

    #[test]
    fn test_overlong_value_is_corrupt() {
        let codec = VByteCodec::default();
        let err = codec.decode_to_vec(&[0xFF, 0xFF, 0x01], 1, 0u8).unwrap_err();
        assert!(matches!(err, IntPackError::CorruptHeader(_)));
    }

    #[test]
    fn test_get_with_and_without_state() {
        let original: Vec<u16> = vec![5, 900, 3, 70, 70, 12000];
        for transform in [Transform::Identity, Transform::ZigZag, Transform::Xor] {
            let codec = VByteCodec::new(transform);
            let encoded = codec.encode_to_vec(&original, 4).unwrap();
            for (i, &v) in original.iter().enumerate() {
                assert_eq!(codec.get(&encoded, original.len(), i, 4u16).unwrap(), v);
            }
            assert!(matches!(
                codec.get(&encoded, original.len(), 6, 4u16),
                Err(IntPackError::IndexOutOfBounds { index: 6, len: 6 })
            ));
        }
    }

    #[test]
    fn test_cursor_resumes_searches() {
        let original: Vec<u32> = vec![2, 4, 4, 8, 16, 32];
        let codec = VByteCodec::new(Transform::Delta);
        let encoded = codec.encode_to_vec(&original, 0).unwrap();

        let mut cursor = codec.cursor(&encoded, original.len(), 0u32);
        assert_eq!(cursor.seek_geq(3).unwrap(), 1);
        assert_eq!(cursor.seek_geq(3).unwrap(), 1);
        assert_eq!(cursor.seek_eq(8).unwrap(), 3);
        assert_eq!(cursor.seek_geq(17).unwrap(), 5);
        assert_eq!(cursor.seek_geq(33).unwrap(), 6);
    }

    #[test]
    fn test_search_from_index_and_miss() {
        let original: Vec<u8> = vec![9, 1, 9, 3];
        let codec = VByteCodec::default();
        let encoded = codec.encode_to_vec(&original, 0).unwrap();
        assert_eq!(codec.geteq(&encoded, 4, 1, 9u8, 0).unwrap(), 2);
        assert_eq!(codec.geteq(&encoded, 4, 3, 9u8, 0).unwrap(), 4);
        assert_eq!(codec.getgeq(&encoded, 4, 0, 2u8, 0).unwrap(), 0);
        assert_eq!(codec.getgeq(&encoded, 4, 9, 0u8, 0).unwrap(), 4);
    }
}
