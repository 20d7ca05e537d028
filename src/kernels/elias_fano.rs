//! This module contains the Elias-Fano codec for monotone sequences of 32- and
//! 64-bit integers.
//!
//! The input is first rebased onto zero (`x[i] = v[i] - start`, or
//! `v[i] - start - (i + 1)` for the strict variant, which turns a strictly
//! increasing sequence into a non-decreasing one over a smaller universe).
//! With `u = max(x) + 1`, every `x[i]` is split at `L = floor(log2(u / n))`
//! bits (0 when `u <= n`): the low `L` bits are packed back to back, the high
//! part is written in unary into a bucket bitvector where element `i` sets bit
//! `(x[i] >> L) + i`.
//!
//! Layout:
//! ```text
//! low_bits    u8
//! high_max    VByte    x_max >> L; the bitvector holds n + high_max + 1 bits
//! samples     ceil(n/256) fields of bits_needed(n + high_max + 1) bits:
//!             the bitvector position of every 256th set bit
//! lows        ceil(n*L/8) bytes
//! upper       ceil((n + high_max + 1)/8) bytes
//! ```
//! The sample table turns `select1` into one table lookup plus a scan of at
//! most 255 set bits, which is what `get` costs.

use bitvec::prelude::*;

use super::access::{check_index, RandomAccess, SearchMode};
use super::bitpack::{field_mask, pack_fields, packed_len, read_field, MAX_WIDTH};
use super::bitwidth::{bits_needed, vbmax};
use super::delta::{rebase_monotone, restore_monotone_at};
use super::vbyte;
use crate::buffer::{ByteReader, ByteWriter};
use crate::error::IntPackError;
use crate::traits::{EliasFanoInt, IntegerCodec};

/// One `select1` sample per this many set bits.
pub const SELECT_SAMPLE_RATE: usize = 256;

#[inline]
fn shr(x: u64, bits: u8) -> u64 {
    if bits >= 64 {
        0
    } else {
        x >> bits
    }
}

#[inline]
fn shl(x: u64, bits: u8) -> u64 {
    if bits >= 64 {
        0
    } else {
        x << bits
    }
}

/// `L = floor(log2(u / n))` with `u = x_max + 1`, or 0 when `u <= n`.
pub fn low_bits_for(x_max: u64, n: usize) -> u8 {
    let universe = x_max as u128 + 1;
    let count = n.max(1) as u128;
    if universe <= count {
        return 0;
    }
    (127 - (universe / count).leading_zeros()) as u8
}

//==================================================================================
// 1. Parsed View
//==================================================================================

/// Borrowed, parsed form of an encoded sequence of `n` elements.
struct EliasFanoView<'a> {
    n: usize,
    low_bits: u8,
    high_max: u64,
    sample_bits: u8,
    samples: &'a [u8],
    lows: &'a [u8],
    upper: &'a BitSlice<u8, Lsb0>,
    consumed: usize,
}

impl<'a> EliasFanoView<'a> {
    fn parse(input: &'a [u8], n: usize) -> Result<Self, IntPackError> {
        let mut reader = ByteReader::new(input);
        let low_bits = reader.take_u8()?;
        if low_bits > MAX_WIDTH {
            return Err(IntPackError::CorruptHeader(format!("low bit width {}", low_bits)));
        }
        let high_max = vbyte::read_one::<u64>(&mut reader)?;
        let upper_len = (n as u64)
            .checked_add(high_max)
            .and_then(|len| len.checked_add(1))
            .filter(|&len| len <= (input.len() as u64).saturating_mul(8))
            .ok_or_else(|| IntPackError::CorruptHeader(format!("bucket count {} out of range", high_max)))?
            as usize;

        let sample_bits = bits_needed(upper_len as u64);
        let samples = reader.take(packed_len(n.div_ceil(SELECT_SAMPLE_RATE), sample_bits))?;
        let lows = reader.take(packed_len(n, low_bits))?;
        let upper = &reader.take(upper_len.div_ceil(8))?.view_bits::<Lsb0>()[..upper_len];

        Ok(EliasFanoView {
            n,
            low_bits,
            high_max,
            sample_bits,
            samples,
            lows,
            upper,
            consumed: reader.position(),
        })
    }

    /// Bitvector position of the `index`-th set bit.
    fn select1(&self, index: usize) -> Result<usize, IntPackError> {
        check_index(index, self.n)?;
        let sample = read_field(self.samples, self.sample_bits, index / SELECT_SAMPLE_RATE)? as usize;
        if sample > self.upper.len() {
            return Err(IntPackError::CorruptHeader(format!("select sample {} past the bitvector", sample)));
        }
        self.upper[sample..]
            .iter_ones()
            .nth(index % SELECT_SAMPLE_RATE)
            .map(|offset| sample + offset)
            .ok_or_else(|| IntPackError::CorruptHeader(format!("no set bit for element {}", index)))
    }

    /// Index of the first element whose high part is at least `bucket`.
    fn first_in_bucket(&self, bucket: u64) -> Result<usize, IntPackError> {
        if bucket == 0 {
            return Ok(0);
        }
        // The (bucket-1)-th zero closes bucket - 1; every set bit before it is an earlier element.
        let zero = self
            .upper
            .iter_zeros()
            .nth((bucket - 1) as usize)
            .ok_or_else(|| IntPackError::CorruptHeader(format!("bucket {} not terminated", bucket)))?;
        Ok(zero + 1 - bucket as usize)
    }

    /// Rebased value of element `index`, whose set bit sits at `pos`.
    fn rebased_at(&self, index: usize, pos: usize) -> Result<u64, IntPackError> {
        let high = pos
            .checked_sub(index)
            .ok_or_else(|| IntPackError::CorruptHeader(format!("element {} before its bucket", index)))?;
        let low = read_field(self.lows, self.low_bits, index)?;
        Ok(shl(high as u64, self.low_bits) | low)
    }
}

//==================================================================================
// 2. Codec
//==================================================================================

/// Elias-Fano backend for `u32` / `u64`.
///
/// `strict` selects the strictly-increasing variant. The input must be
/// non-decreasing (strictly increasing when `strict`) and no smaller than
/// `start`; that is not checked, and violating it produces wrong values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EliasFanoCodec {
    strict: bool,
}

impl EliasFanoCodec {
    pub fn new(strict: bool) -> Self {
        EliasFanoCodec { strict }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    fn restore<T: EliasFanoInt>(&self, x: u64, index: usize, start: T) -> T {
        restore_monotone_at(T::narrow(x), index, start, self.strict)
    }
}

impl<T: EliasFanoInt> IntegerCodec<T> for EliasFanoCodec {
    fn max_compressed_len(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        // high_max < 2n, so the bitvector never exceeds 3n bits.
        1 + vbmax::<u64>()
            + packed_len(n.div_ceil(SELECT_SAMPLE_RATE), 64)
            + packed_len(n, T::BITS as u8)
            + (3 * n + 1).div_ceil(8)
    }

    fn encode(&self, input: &[T], output: &mut [u8], start: T) -> Result<usize, IntPackError> {
        let n = input.len();
        if n == 0 {
            return Ok(0);
        }
        let mut rebased = vec![T::zero(); n];
        rebase_monotone(input, &mut rebased, start, self.strict);
        let xs: Vec<u64> = rebased.iter().map(|x| x.widen()).collect();

        // The max (not the last element) keeps every bucket inside the bitvector
        // even when the monotone contract is broken.
        let x_max = xs.iter().copied().max().unwrap_or(0);
        let low_bits = low_bits_for(x_max, n);
        let high_max = shr(x_max, low_bits);
        let upper_len = n + high_max as usize + 1;
        let sample_bits = bits_needed(upper_len as u64);

        let mask = field_mask(low_bits);
        let lows: Vec<u64> = xs.iter().map(|&x| x & mask).collect();
        let mut positions = Vec::with_capacity(n);
        let mut samples = Vec::with_capacity(n.div_ceil(SELECT_SAMPLE_RATE));
        for (i, &x) in xs.iter().enumerate() {
            let pos = shr(x, low_bits) as usize + i;
            if i % SELECT_SAMPLE_RATE == 0 {
                samples.push(pos as u64);
            }
            positions.push(pos);
        }
        // Out-of-order input can make a later element's bit land before a sample.
        samples.sort_unstable();

        let mut writer = ByteWriter::new(output);
        writer.put_u8(low_bits)?;
        vbyte::write_one(&mut writer, high_max)?;
        pack_fields(&samples, sample_bits, writer.reserve(packed_len(samples.len(), sample_bits))?)?;
        pack_fields(&lows, low_bits, writer.reserve(packed_len(n, low_bits))?)?;
        let upper = writer.reserve(upper_len.div_ceil(8))?.view_bits_mut::<Lsb0>();
        for pos in positions {
            upper.set(pos, true);
        }

        log::debug!(
            "elias-fano encode: n={} strict={} low_bits={} high_max={} bytes={}",
            n,
            self.strict,
            low_bits,
            high_max,
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
        if n == 0 {
            return Ok(0);
        }
        let view = EliasFanoView::parse(input, n)?;
        let mut filled = 0;
        for (i, (slot, pos)) in output[..n].iter_mut().zip(view.upper.iter_ones()).enumerate() {
            *slot = self.restore(view.rebased_at(i, pos)?, i, start);
            filled += 1;
        }
        if filled < n {
            return Err(IntPackError::CorruptHeader(format!(
                "bitvector holds {} elements, expected {}",
                filled, n
            )));
        }
        Ok(view.consumed)
    }
}

impl<T: EliasFanoInt> RandomAccess<T> for EliasFanoCodec {
    fn get(&self, input: &[u8], n: usize, index: usize, start: T) -> Result<T, IntPackError> {
        check_index(index, n)?;
        let view = EliasFanoView::parse(input, n)?;
        let pos = view.select1(index)?;
        Ok(self.restore(view.rebased_at(index, pos)?, index, start))
    }

    /// Successor search. The non-strict variant jumps straight to the key's
    /// bucket; the strict one scans from `from_index`.
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
        let view = EliasFanoView::parse(input, n)?;

        let mut first = from_index;
        if !self.strict && key > start {
            let bucket = shr(key.wrapping_sub(&start).widen(), view.low_bits);
            if bucket > view.high_max {
                return Ok(n);
            }
            first = first.max(view.first_in_bucket(bucket)?);
            if first >= n {
                return Ok(n);
            }
        }

        let origin = view.select1(first)?;
        for (offset, pos) in view.upper[origin..].iter_ones().enumerate() {
            let index = first + offset;
            if index >= n {
                break;
            }
            let value = self.restore(view.rebased_at(index, origin + pos)?, index, start);
            if value >= key {
                return Ok(if mode.matches(value, key) { index } else { n });
            }
        }
        Ok(n)
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
