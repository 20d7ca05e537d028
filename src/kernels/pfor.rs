//! This module contains the PFor (patched frame-of-reference) bit-packing
//! engine.
//!
//! This technique is a Layer 3 (Bit-Width Reduction) transform. The
//! (transformed) input is cut into blocks of `B` values. Each block is packed
//! at one width `w` chosen to minimise its encoded size; the few values that do
//! not fit in `w` bits ("exceptions") are stored again, in full, in a small
//! side-channel after the packed data and patched back over their truncated
//! slots on decode.
//!
//! Block layout:
//! ```text
//! header    u8       w | 0x80 when the block has exceptions
//! data      ceil(m*w/8) bytes, m fields of w bits (lane codec layout)
//! -- only when the header flag is set --
//! count     VByte    number of exceptions c (1..=m)
//! gap_bits  u8       width of the packed gaps
//! val_bits  u8       width of the packed exception values
//! gaps      ceil(c*gap_bits/8) bytes, pos[0], then pos[k] - pos[k-1] - 1
//! values    ceil(c*val_bits/8) bytes, the true values
//! ```
//! The lane width only changes how the `data` fields are packed and unpacked;
//! every lane reads and writes the same bytes.

use super::access::{check_index, scan_decoded, RandomAccess, SearchMode};
use super::bitpack::{check_width, field_mask, pack_fields, packed_len, read_field, unpack_fields};
use super::bitwidth::{bit_histogram, bits_needed, max_bits, vblen};
use super::lane::{pack_with, unpack_with};
use super::transform::{Transform, TransformState};
use super::vbyte;
use crate::buffer::{ByteReader, ByteWriter};
use crate::error::IntPackError;
use crate::traits::{IntegerCodec, PackedInt};
use crate::types::LaneWidth;

/// Default cap on the share of a block that may be stored as exceptions.
pub const DEFAULT_EXCEPTION_RATIO: f32 = 0.25;

const EXCEPTION_FLAG: u8 = 0x80;
const WIDTH_MASK: u8 = 0x7F;

//==================================================================================
// 1. Width Selection
//==================================================================================

/// The packing decision for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    pub width: u8,
    pub exceptions: usize,
    /// Encoded size of the block excluding its header byte (upper bound when
    /// there are exceptions, since the real gap width can only be smaller).
    pub bytes: usize,
}

fn exception_bytes(count: usize, gap_bits: u8, value_bits: u8) -> usize {
    vblen(count as u64) + 2 + packed_len(count, gap_bits) + packed_len(count, value_bits)
}

/// Chooses the width for one block of transformed values.
///
/// Every candidate `w` in `0..=mb` is costed in bytes, with `mb` the width
/// that fits every value. Candidates needing more than
/// `ceil(m * max_exception_ratio)` exceptions are skipped (`w = mb` needs none
/// and is always allowed). The cheapest candidate wins and ties go to the
/// smaller width, so the result never costs more than packing at `mb`.
pub fn plan_block(codes: &[u64], max_exception_ratio: f32) -> BlockPlan {
    let m = codes.len();
    let hist = bit_histogram(codes);
    let mb = max_bits(codes);
    let cap = (m as f32 * max_exception_ratio).ceil() as usize;
    let gap_bits = bits_needed(m.saturating_sub(1) as u64);

    let mut best = BlockPlan {
        width: mb,
        exceptions: 0,
        bytes: packed_len(m, mb),
    };
    let mut exceptions = 0;
    for w in (0..mb).rev() {
        // Values wider than `w`; only grows as `w` shrinks.
        exceptions += hist[w as usize + 1];
        if exceptions > cap {
            break;
        }
        let bytes = packed_len(m, w) + exception_bytes(exceptions, gap_bits, mb);
        if bytes <= best.bytes {
            best = BlockPlan { width: w, exceptions, bytes };
        }
    }
    best
}

//==================================================================================
// 2. Block Kernels
//==================================================================================

/// Reads and validates `(count, gap_bits, value_bits)` of an exception side-channel.
fn read_exception_header(reader: &mut ByteReader<'_>, m: usize) -> Result<(usize, u8, u8), IntPackError> {
    let count = vbyte::read_one::<u64>(reader)?;
    if count == 0 || count > m as u64 {
        return Err(IntPackError::CorruptHeader(format!(
            "{} exceptions in a block of {}",
            count, m
        )));
    }
    let gap_bits = reader.take_u8()?;
    let value_bits = reader.take_u8()?;
    check_width(gap_bits)?;
    check_width(value_bits)?;
    Ok((count as usize, gap_bits, value_bits))
}

/// Reads a block's exception side-channel as `(position, value)` patches.
fn read_exceptions(reader: &mut ByteReader<'_>, m: usize) -> Result<Vec<(usize, u64)>, IntPackError> {
    let (count, gap_bits, value_bits) = read_exception_header(reader, m)?;

    let mut gaps = vec![0u64; count];
    unpack_fields(reader.take(packed_len(count, gap_bits))?, gap_bits, &mut gaps)?;
    let mut values = vec![0u64; count];
    unpack_fields(reader.take(packed_len(count, value_bits))?, value_bits, &mut values)?;

    let mut patches = Vec::with_capacity(count);
    let mut pos = 0usize;
    for (k, (&gap, &value)) in gaps.iter().zip(&values).enumerate() {
        let next = usize::try_from(gap)
            .ok()
            .and_then(|gap| if k == 0 { Some(gap) } else { pos.checked_add(gap)?.checked_add(1) })
            .filter(|&next| next < m);
        pos = next.ok_or_else(|| {
            IntPackError::CorruptHeader(format!("exception {} lands outside a block of {}", k, m))
        })?;
        patches.push((pos, value));
    }
    Ok(patches)
}

/// Reads a block header, returning `(width, has_exceptions)`.
fn read_header(reader: &mut ByteReader<'_>, elem_bits: u32) -> Result<(u8, bool), IntPackError> {
    let header = reader.take_u8()?;
    let width = header & WIDTH_MASK;
    if width as u32 > elem_bits {
        return Err(IntPackError::CorruptHeader(format!(
            "block width {} exceeds the {}-bit element width",
            width, elem_bits
        )));
    }
    Ok((width, header & EXCEPTION_FLAG != 0))
}

impl PforCodec {
    fn encode_block(&self, codes: &[u64], writer: &mut ByteWriter<'_>) -> Result<BlockPlan, IntPackError> {
        let m = codes.len();
        let plan = plan_block(codes, self.max_exception_ratio);
        let w = plan.width;
        let header = if plan.exceptions > 0 { w | EXCEPTION_FLAG } else { w };
        writer.put_u8(header)?;
        pack_with(self.lane, codes, w, writer.reserve(packed_len(m, w))?)?;

        if plan.exceptions > 0 {
            let limit = field_mask(w);
            let mut gaps = Vec::with_capacity(plan.exceptions);
            let mut values = Vec::with_capacity(plan.exceptions);
            let mut next = 0usize;
            for (pos, &code) in codes.iter().enumerate() {
                if code > limit {
                    gaps.push((pos - next) as u64);
                    values.push(code);
                    next = pos + 1;
                }
            }
            let gap_bits = max_bits(&gaps);
            let value_bits = max_bits(&values);

            vbyte::write_one(writer, values.len() as u64)?;
            writer.put_u8(gap_bits)?;
            writer.put_u8(value_bits)?;
            pack_fields(&gaps, gap_bits, writer.reserve(packed_len(gaps.len(), gap_bits))?)?;
            pack_fields(&values, value_bits, writer.reserve(packed_len(values.len(), value_bits))?)?;
        }
        Ok(plan)
    }

    fn decode_block(&self, reader: &mut ByteReader<'_>, elem_bits: u32, out: &mut [u64]) -> Result<(), IntPackError> {
        let m = out.len();
        let (w, has_exceptions) = read_header(reader, elem_bits)?;
        unpack_with(self.lane, reader.take(packed_len(m, w))?, w, out)?;
        if has_exceptions {
            for (pos, value) in read_exceptions(reader, m)? {
                out[pos] = value;
            }
        }
        Ok(())
    }

    /// Advances past a block of `m` values without unpacking it.
    fn skip_block(&self, reader: &mut ByteReader<'_>, elem_bits: u32, m: usize) -> Result<(), IntPackError> {
        let (w, has_exceptions) = read_header(reader, elem_bits)?;
        reader.skip(packed_len(m, w))?;
        if has_exceptions {
            let (count, gap_bits, value_bits) = read_exception_header(reader, m)?;
            reader.skip(packed_len(count, gap_bits) + packed_len(count, value_bits))?;
        }
        Ok(())
    }

    /// Reads one (still transformed) value of a block of `m` without unpacking the rest.
    fn read_in_block(
        &self,
        reader: &mut ByteReader<'_>,
        elem_bits: u32,
        m: usize,
        offset: usize,
    ) -> Result<u64, IntPackError> {
        let (w, has_exceptions) = read_header(reader, elem_bits)?;
        let data = reader.take(packed_len(m, w))?;
        let truncated = read_field(data, w, offset)?;
        if has_exceptions {
            if let Some((_, value)) = read_exceptions(reader, m)?.into_iter().find(|&(pos, _)| pos == offset) {
                return Ok(value);
            }
        }
        Ok(truncated)
    }
}

//==================================================================================
// 3. Codec
//==================================================================================

/// PFor backend. Supports every element width, transform and lane width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PforCodec {
    lane: LaneWidth,
    block_size: usize,
    transform: Transform,
    max_exception_ratio: f32,
}

impl Default for PforCodec {
    fn default() -> Self {
        PforCodec::new(LaneWidth::Scalar)
    }
}

impl PforCodec {
    /// A codec using `lane` with that lane's default block size.
    pub fn new(lane: LaneWidth) -> Self {
        PforCodec {
            lane,
            block_size: lane.default_block_size(),
            transform: Transform::Identity,
            max_exception_ratio: DEFAULT_EXCEPTION_RATIO,
        }
    }

    /// Changes the lane codec; the block size is left as is.
    pub fn with_lane(mut self, lane: LaneWidth) -> Self {
        self.lane = lane;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Caps exceptions at `ceil(m * ratio)` per block; clamped to `[0, 1]`.
    pub fn with_exception_ratio(mut self, ratio: f32) -> Self {
        self.max_exception_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn lane(&self) -> LaneWidth {
        self.lane
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Decodes blocks `0..=last` in order, handing each decoded block and its
    /// first array index to `visit`. Stops early when `visit` returns `Some`.
    fn walk_blocks<T: PackedInt, R>(
        &self,
        input: &[u8],
        n: usize,
        start: T,
        first: usize,
        mut visit: impl FnMut(&[T], usize) -> Option<R>,
    ) -> Result<Option<R>, IntPackError> {
        let b = self.block_size;
        let mut reader = ByteReader::new(input);
        let mut state = TransformState::seed(start);
        let mut codes = vec![0u64; b.min(n)];
        let mut values = vec![T::zero(); b.min(n)];

        let mut block = 0;
        if !self.transform.is_stateful() {
            while block < first {
                self.skip_block(&mut reader, T::BITS, b)?;
                block += 1;
            }
        }
        while block * b < n {
            let base = block * b;
            let m = (n - base).min(b);
            self.decode_block(&mut reader, T::BITS, &mut codes[..m])?;
            for (v, &c) in values.iter_mut().zip(&codes[..m]) {
                *v = T::narrow(c);
            }
            state = self.transform.inverse(&mut values[..m], state);
            if block >= first {
                if let Some(found) = visit(&values[..m], base) {
                    return Ok(Some(found));
                }
            }
            block += 1;
        }
        Ok(None)
    }
}

impl<T: PackedInt> IntegerCodec<T> for PforCodec {
    fn max_compressed_len(&self, n: usize) -> usize {
        let b = self.block_size;
        let full = n / b;
        let rem = n % b;
        let mut len = full * (1 + packed_len(b, T::BITS as u8));
        if rem > 0 {
            len += 1 + packed_len(rem, T::BITS as u8);
        }
        len
    }

    fn encode(&self, input: &[T], output: &mut [u8], start: T) -> Result<usize, IntPackError> {
        let b = self.block_size;
        let mut writer = ByteWriter::new(output);
        let mut state = TransformState::seed(start);
        let mut transformed = vec![T::zero(); b.min(input.len())];
        let mut codes = vec![0u64; b.min(input.len())];
        let mut exception_total = 0usize;

        for (block, chunk) in input.chunks(b).enumerate() {
            let m = chunk.len();
            state = self.transform.forward(chunk, &mut transformed[..m], state);
            for (c, &t) in codes.iter_mut().zip(&transformed[..m]) {
                *c = t.widen();
            }
            let plan = self.encode_block(&codes[..m], &mut writer)?;
            exception_total += plan.exceptions;
            log::trace!(
                "pfor block {}: m={} width={} exceptions={}",
                block,
                m,
                plan.width,
                plan.exceptions
            );
        }

        log::debug!(
            "pfor encode: n={} blocks={} exceptions={} bytes={}",
            input.len(),
            input.len().div_ceil(b),
            exception_total,
            writer.position()
        );
        log_metric!(
            "event" = "pfor_encode",
            "n" = input.len(),
            "block_size" = b,
            "lane" = self.lane,
            "transform" = self.transform,
            "exceptions" = exception_total,
            "bytes" = writer.position()
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
        let b = self.block_size;
        let mut reader = ByteReader::new(input);
        let mut state = TransformState::seed(start);
        let mut codes = vec![0u64; b.min(n)];

        for chunk in output[..n].chunks_mut(b) {
            let m = chunk.len();
            self.decode_block(&mut reader, T::BITS, &mut codes[..m])?;
            for (v, &c) in chunk.iter_mut().zip(&codes[..m]) {
                *v = T::narrow(c);
            }
            state = self.transform.inverse(chunk, state);
        }
        Ok(reader.position())
    }
}

impl<T: PackedInt> RandomAccess<T> for PforCodec {
    /// Stateless transforms (identity, frame of reference) hop over block
    /// headers and read one field; the others decode every block up to the
    /// target to rebuild their seed.
    fn get(&self, input: &[u8], n: usize, index: usize, start: T) -> Result<T, IntPackError> {
        check_index(index, n)?;
        let b = self.block_size;
        let target = index / b;
        let offset = index % b;

        if self.transform.is_stateful() {
            let found = self.walk_blocks(input, n, start, target, |values: &[T], _| Some(values[offset]))?;
            return found.ok_or(IntPackError::IndexOutOfBounds { index, len: n });
        }

        let mut reader = ByteReader::new(input);
        for _ in 0..target {
            self.skip_block(&mut reader, T::BITS, b)?;
        }
        let m = (n - target * b).min(b);
        let code = self.read_in_block(&mut reader, T::BITS, m, offset)?;
        let mut state = TransformState::seed(start);
        Ok(self.transform.inverse_one(T::narrow(code), &mut state))
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
        let first = from_index / self.block_size;
        let found = self.walk_blocks(input, n, start, first, |values: &[T], base| {
            scan_decoded(values, base, from_index, key, mode)
        })?;
        Ok(found.unwrap_or(n))
    }
}

//==================================================================================
// 4. Unit Tests
//==================================================================================
