//! This module contains the TurboByte backend: group varint coding of 16- and
//! 32-bit integers.
//!
//! This technique is a Layer 3 (Bit-Width Reduction) transform. Values are
//! coded in groups of `G`. Each group starts with a descriptor of `G / 4`
//! bytes holding a 2-bit code per value (`byte length - 1`, value 0 in the low
//! bits of the first byte), followed by every value's little-endian bytes with
//! leading zero bytes dropped. The group size follows the lane width: 4 for the
//! scalar path, one register's worth of elements for the 128- and 256-bit
//! lanes. The final group keeps a full descriptor even when it holds fewer
//! than `G` values.
//!
//! Decoding a group computes every value's payload offset from the descriptor
//! up front and then gathers each value independently of the others.

use super::access::{check_index, scan_decoded, RandomAccess, SearchMode};
use super::bitwidth::byte_len;
use super::transform::{Transform, TransformState};
use crate::buffer::{ByteReader, ByteWriter};
use crate::error::IntPackError;
use crate::traits::{GroupVarintInt, IntegerCodec};
use crate::types::LaneWidth;

/// Largest group any lane width produces (256-bit lane, 16-bit elements).
const MAX_GROUP: usize = 16;

/// Payload bytes described by one descriptor byte (four 2-bit length codes).
const DESCRIPTOR_SPAN: [u8; 256] = build_span_table();

const fn build_span_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut d = 0;
    while d < 256 {
        let mut span = 0;
        let mut k = 0;
        while k < 4 {
            span += ((d >> (2 * k)) & 3) + 1;
            k += 1;
        }
        table[d] = span as u8;
        d += 1;
    }
    table
}

//==================================================================================
// 1. Codec
//==================================================================================

/// Group varint backend for `u16` / `u32`. Supports every transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurboByteCodec {
    lane: LaneWidth,
    transform: Transform,
}

impl TurboByteCodec {
    pub fn new(lane: LaneWidth) -> Self {
        TurboByteCodec {
            lane,
            transform: Transform::Identity,
        }
    }

    pub fn with_lane(mut self, lane: LaneWidth) -> Self {
        self.lane = lane;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn lane(&self) -> LaneWidth {
        self.lane
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Values per group for element type `T`.
    pub fn group_len<T: GroupVarintInt>(&self) -> usize {
        self.lane.group_len(std::mem::size_of::<T>())
    }

    /// Decodes the group of `m` values at the reader into `out[..m]` (still transformed).
    fn read_group<T: GroupVarintInt>(
        &self,
        reader: &mut ByteReader<'_>,
        m: usize,
        out: &mut [T],
    ) -> Result<(), IntPackError> {
        let g = self.group_len::<T>();
        let descriptor = reader.take(g / 4)?;

        let mut offsets = [0usize; MAX_GROUP + 1];
        for lane in 0..m {
            let code = (descriptor[lane / 4] >> (2 * (lane % 4))) & 3;
            offsets[lane + 1] = offsets[lane] + code as usize + 1;
        }
        let payload = reader.take(offsets[m])?;

        for (lane, slot) in out[..m].iter_mut().enumerate() {
            let mut word = [0u8; 8];
            let bytes = &payload[offsets[lane]..offsets[lane + 1]];
            word[..bytes.len()].copy_from_slice(bytes);
            *slot = T::narrow(u64::from_le_bytes(word));
        }
        Ok(())
    }

    /// Skips one full group by summing its descriptor spans.
    fn skip_group<T: GroupVarintInt>(&self, reader: &mut ByteReader<'_>) -> Result<(), IntPackError> {
        let descriptor = reader.take(self.group_len::<T>() / 4)?;
        let span: usize = descriptor.iter().map(|&d| DESCRIPTOR_SPAN[d as usize] as usize).sum();
        reader.skip(span)
    }
}

impl<T: GroupVarintInt> IntegerCodec<T> for TurboByteCodec {
    fn max_compressed_len(&self, n: usize) -> usize {
        let g = self.group_len::<T>();
        n.div_ceil(g) * (g / 4) + n * std::mem::size_of::<T>()
    }

    fn encode(&self, input: &[T], output: &mut [u8], start: T) -> Result<usize, IntPackError> {
        let g = self.group_len::<T>();
        let mut writer = ByteWriter::new(output);
        let mut state = TransformState::seed(start);
        let mut codes = [T::zero(); MAX_GROUP];

        for group in input.chunks(g) {
            let codes = &mut codes[..group.len()];
            state = self.transform.forward(group, codes, state);

            let descriptor = writer.reserve(g / 4)?;
            for (lane, &code) in codes.iter().enumerate() {
                let len = byte_len(code.widen());
                descriptor[lane / 4] |= ((len - 1) as u8) << (2 * (lane % 4));
            }
            for &code in codes.iter() {
                let len = byte_len(code.widen());
                writer.put_slice(&code.widen().to_le_bytes()[..len])?;
            }
        }

        log::debug!(
            "turbobyte encode: n={} group={} transform={} bytes={}",
            input.len(),
            g,
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
        let g = self.group_len::<T>();
        let mut reader = ByteReader::new(input);
        let mut state = TransformState::seed(start);
        for group in output[..n].chunks_mut(g) {
            let m = group.len();
            self.read_group(&mut reader, m, group)?;
            state = self.transform.inverse(group, state);
        }
        Ok(reader.position())
    }
}

impl<T: GroupVarintInt> RandomAccess<T> for TurboByteCodec {
    fn get(&self, input: &[u8], n: usize, index: usize, start: T) -> Result<T, IntPackError> {
        check_index(index, n)?;
        let g = self.group_len::<T>();
        let target = index / g;
        let mut reader = ByteReader::new(input);
        let mut state = TransformState::seed(start);
        let mut group = [T::zero(); MAX_GROUP];

        if self.transform.is_stateful() {
            for _ in 0..target {
                self.read_group(&mut reader, g, &mut group)?;
                state = self.transform.inverse(&mut group[..g], state);
            }
        } else {
            // Every group before the target is full.
            for _ in 0..target {
                self.skip_group::<T>(&mut reader)?;
            }
        }

        let m = (n - target * g).min(g);
        self.read_group(&mut reader, m, &mut group)?;
        self.transform.inverse(&mut group[..m], state);
        Ok(group[index % g])
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
        let g = self.group_len::<T>();
        let first = from_index / g;
        let mut reader = ByteReader::new(input);
        let mut state = TransformState::seed(start);
        let mut group = [T::zero(); MAX_GROUP];

        let mut g_index = 0;
        if !self.transform.is_stateful() {
            for _ in 0..first {
                self.skip_group::<T>(&mut reader)?;
            }
            g_index = first;
        }

        while g_index * g < n {
            let base = g_index * g;
            let m = (n - base).min(g);
            self.read_group(&mut reader, m, &mut group)?;
            state = self.transform.inverse(&mut group[..m], state);
            if g_index >= first {
                if let Some(found) = scan_decoded(&group[..m], base, from_index, key, mode) {
                    return Ok(found);
                }
            }
            g_index += 1;
        }
        Ok(n)
    }
}

//==================================================================================
// 2. Unit Tests
//==================================================================================
