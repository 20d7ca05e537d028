//! This module provides the shared, low-level helpers for moving between raw
//! little-endian byte buffers and typed slices.
//!
//! The byte-level dispatcher receives `&[u8]` of unknown alignment, so the
//! cast path is `bytemuck::try_cast_slice` with a copying fallback for
//! misaligned input. Nothing here uses `unsafe`.

use crate::error::IntPackError;
use crate::traits::PackedInt;

//==================================================================================
// 1. Core Utility Functions
//==================================================================================

/// Reinterprets a byte slice as a typed slice without copying.
///
/// # Errors
/// `BufferMismatch` when the length is not a multiple of `size_of::<T>()`,
/// `PodCast` when the bytes are not suitably aligned for `T`.
pub fn safe_bytes_to_typed_slice<T: bytemuck::Pod>(bytes: &[u8]) -> Result<&[T], IntPackError> {
    let size = std::mem::size_of::<T>();
    if bytes.len() % size != 0 {
        return Err(IntPackError::BufferMismatch(bytes.len(), size));
    }
    Ok(bytemuck::try_cast_slice(bytes)?)
}

/// Copies little-endian bytes into an owned typed vector, whatever their alignment.
pub fn bytes_to_typed_vec<T: PackedInt>(bytes: &[u8]) -> Result<Vec<T>, IntPackError> {
    match safe_bytes_to_typed_slice::<T>(bytes) {
        Ok(slice) => Ok(slice.iter().map(|v| T::from_le(*v)).collect()),
        Err(IntPackError::PodCast(_)) => {
            let mut out = vec![T::zero(); bytes.len() / std::mem::size_of::<T>()];
            bytemuck::cast_slice_mut::<T, u8>(&mut out).copy_from_slice(bytes);
            for v in out.iter_mut() {
                *v = T::from_le(*v);
            }
            Ok(out)
        }
        Err(e) => Err(e),
    }
}

/// Serializes a typed slice as little-endian bytes into `out` (cleared first).
pub fn typed_slice_to_bytes<T: PackedInt>(data: &[T], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(std::mem::size_of_val(data));
    for v in data {
        out.extend_from_slice(bytemuck::bytes_of(&v.to_le()));
    }
}
