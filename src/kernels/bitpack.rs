//! This module contains the pure, stateless kernels for fixed-width field
//! packing and unpacking.
//!
//! This technique is a Layer 3 (Bit-Width Reduction) transform. Fields are laid
//! out back to back in one little-endian bitstream: field `i` of width `w`
//! occupies stream bits `[i*w, (i+1)*w)`, where stream bit `k` is bit `k % 8`
//! of byte `k / 8`. Values wider than `w` are truncated mod `2^w`; callers
//! that need them intact (PFor exceptions) patch them back afterwards.
//!
//! This is the scalar reference layout. The lane codecs in `kernels::lane`
//! produce and consume exactly the same bytes.

use bitvec::prelude::*;

use crate::error::IntPackError;

/// Largest supported field width.
pub const MAX_WIDTH: u8 = 64;

//==================================================================================
// 1. Sizing Helpers
//==================================================================================

/// Bytes needed to hold `count` fields of `width` bits.
#[inline]
pub fn packed_len(count: usize, width: u8) -> usize {
    (count * width as usize).div_ceil(8)
}

#[inline]
pub(crate) fn field_mask(width: u8) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

pub(crate) fn check_width(width: u8) -> Result<(), IntPackError> {
    if width > MAX_WIDTH {
        return Err(IntPackError::CorruptHeader(format!(
            "field width {} exceeds {} bits",
            width, MAX_WIDTH
        )));
    }
    Ok(())
}

//==================================================================================
// 2. Generic Core Logic (The "Engine")
//==================================================================================

/// Packs `values` at `width` bits each into the front of `output`.
///
/// Exactly `packed_len(values.len(), width)` bytes are written; the rest of
/// `output` is untouched.
pub fn pack_fields(values: &[u64], width: u8, output: &mut [u8]) -> Result<(), IntPackError> {
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
    let bits = region.view_bits_mut::<Lsb0>();
    for (i, &value) in values.iter().enumerate() {
        bits[i * w..(i + 1) * w].store_le::<u64>(value & mask);
    }
    Ok(())
}

/// Unpacks `output.len()` fields of `width` bits from the front of `input`.
pub fn unpack_fields(input: &[u8], width: u8, output: &mut [u64]) -> Result<(), IntPackError> {
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
    let bits = input[..len].view_bits::<Lsb0>();
    for (i, out) in output.iter_mut().enumerate() {
        *out = bits[i * w..(i + 1) * w].load_le::<u64>();
    }
    Ok(())
}

/// Reads the single field at `index` without unpacking its neighbours.
pub fn read_field(input: &[u8], width: u8, index: usize) -> Result<u64, IntPackError> {
    check_width(width)?;
    if width == 0 {
        return Ok(0);
    }
    let w = width as usize;
    let end_bit = (index + 1) * w;
    let needed = end_bit.div_ceil(8);
    if input.len() < needed {
        return Err(IntPackError::TruncatedInput {
            needed,
            available: input.len(),
        });
    }
    Ok(input.view_bits::<Lsb0>()[index * w..end_bit].load_le::<u64>())
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
