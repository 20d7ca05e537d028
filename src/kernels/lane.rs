//! Lane codecs: the strategies used to move fixed-width fields in and out of
//! the packed bitstream.
//!
//! `ScalarLane` is the reference implementation (one field per step, via
//! `kernels::bitpack`). `Lane128` and `Lane256` process a register's worth of
//! fields per step: every field of the step is located from its own bit
//! offset, loaded through a 128-bit window and staged in a fixed-size lane
//! array, with no dependency between lanes. The byte layout is the same for all
//! three, which is what lets a buffer written with one lane width be decoded
//! with another.

use super::bitpack::{self, check_width, field_mask, packed_len};
use crate::error::IntPackError;
use crate::types::LaneWidth;

/// Pack/unpack of a block of width-`w` fields.
pub trait LaneCodec {
    fn pack(values: &[u64], width: u8, output: &mut [u8]) -> Result<(), IntPackError>;

    fn unpack(input: &[u8], width: u8, output: &mut [u64]) -> Result<(), IntPackError>;
}

/// One field at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarLane;

/// Four 32-bit lanes per step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lane128;

/// Eight 32-bit lanes per step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lane256;

impl LaneCodec for ScalarLane {
    fn pack(values: &[u64], width: u8, output: &mut [u8]) -> Result<(), IntPackError> {
        bitpack::pack_fields(values, width, output)
    }

    fn unpack(input: &[u8], width: u8, output: &mut [u64]) -> Result<(), IntPackError> {
        bitpack::unpack_fields(input, width, output)
    }
}

impl LaneCodec for Lane128 {
    fn pack(values: &[u64], width: u8, output: &mut [u8]) -> Result<(), IntPackError> {
        pack_wide::<4>(values, width, output)
    }

    fn unpack(input: &[u8], width: u8, output: &mut [u64]) -> Result<(), IntPackError> {
        unpack_wide::<4>(input, width, output)
    }
}

impl LaneCodec for Lane256 {
    fn pack(values: &[u64], width: u8, output: &mut [u8]) -> Result<(), IntPackError> {
        pack_wide::<8>(values, width, output)
    }

    fn unpack(input: &[u8], width: u8, output: &mut [u64]) -> Result<(), IntPackError> {
        unpack_wide::<8>(input, width, output)
    }
}

//==================================================================================
// 1. Runtime Dispatch
//==================================================================================

/// Packs with the lane codec selected by `lane`.
pub fn pack_with(lane: LaneWidth, values: &[u64], width: u8, output: &mut [u8]) -> Result<(), IntPackError> {
    match lane {
        LaneWidth::Scalar => ScalarLane::pack(values, width, output),
        LaneWidth::V128 => Lane128::pack(values, width, output),
        LaneWidth::V256 => Lane256::pack(values, width, output),
    }
}

/// Unpacks with the lane codec selected by `lane`.
pub fn unpack_with(lane: LaneWidth, input: &[u8], width: u8, output: &mut [u64]) -> Result<(), IntPackError> {
    match lane {
        LaneWidth::Scalar => ScalarLane::unpack(input, width, output),
        LaneWidth::V128 => Lane128::unpack(input, width, output),
        LaneWidth::V256 => Lane256::unpack(input, width, output),
    }
}

//==================================================================================
// 2. Wide (multi-lane) Implementation
//==================================================================================

/// Loads the field starting at stream bit `bit_pos`.
///
/// A field is at most 64 bits and starts at most 7 bits into its first byte,
/// so it always fits in a 16-byte window.
#[inline]
fn load_lane(input: &[u8], bit_pos: usize, mask: u64) -> u64 {
    let byte = bit_pos / 8;
    let shift = bit_pos % 8;
    let mut window = [0u8; 16];
    let avail = (input.len() - byte).min(16);
    window[..avail].copy_from_slice(&input[byte..byte + avail]);
    ((u128::from_le_bytes(window) >> shift) as u64) & mask
}

/// ORs the field `value` into the stream at bit `bit_pos`.
#[inline]
fn store_lane(output: &mut [u8], bit_pos: usize, width: usize, value: u64) {
    let byte = bit_pos / 8;
    let shift = bit_pos % 8;
    let window = (value as u128) << shift;
    let span = (shift + width).div_ceil(8);
    for (k, dst) in output[byte..byte + span].iter_mut().enumerate() {
        *dst |= (window >> (8 * k)) as u8;
    }
}

fn pack_wide<const L: usize>(values: &[u64], width: u8, output: &mut [u8]) -> Result<(), IntPackError> {
    check_width(width)?;
    let len = packed_len(values.len(), width);
    if output.len() < len {
        return Err(IntPackError::OutputOverflow {
            needed: len,
            capacity: output.len(),
        });
    }
    let region = &mut output[..len];
    region.fill(0);
    if width == 0 {
        return Ok(());
    }

    let w = width as usize;
    let mask = field_mask(width);
    for (step, chunk) in values.chunks(L).enumerate() {
        let mut register = [0u64; L];
        for (lane, &value) in register.iter_mut().zip(chunk) {
            *lane = value & mask;
        }
        let base = step * L;
        for (lane, &value) in register[..chunk.len()].iter().enumerate() {
            store_lane(region, (base + lane) * w, w, value);
        }
    }
    Ok(())
}

fn unpack_wide<const L: usize>(input: &[u8], width: u8, output: &mut [u64]) -> Result<(), IntPackError> {
    check_width(width)?;
    let len = packed_len(output.len(), width);
    if input.len() < len {
        return Err(IntPackError::TruncatedInput {
            needed: len,
            available: input.len(),
        });
    }
    if width == 0 {
        output.fill(0);
        return Ok(());
    }

    let w = width as usize;
    let mask = field_mask(width);
    let stream = &input[..len];
    for (step, chunk) in output.chunks_mut(L).enumerate() {
        let base = step * L;
        let mut register = [0u64; L];
        for (lane, slot) in register[..chunk.len()].iter_mut().enumerate() {
            *slot = load_lane(stream, (base + lane) * w, mask);
        }
        chunk.copy_from_slice(&register[..chunk.len()]);
    }
    Ok(())
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
