// In: src/error.rs

//! This module defines the single, unified error type for the entire intpack library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Note what is *not* here: passing a different `n`, element width or `start`
//! at decode than was used at encode is a caller contract violation and yields
//! silently wrong values, not an error. The variants below cover the conditions
//! that would otherwise touch memory outside a buffer.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntPackError {
    // =========================================================================
    // === Buffer Capacity Errors (the only fatal class)
    // =========================================================================
    /// The caller-provided output byte buffer cannot hold the encoded data.
    #[error("Output buffer overflow: need at least {needed} bytes, capacity is {capacity}")]
    OutputOverflow { needed: usize, capacity: usize },

    /// The caller-provided output slice has fewer than `n` slots.
    #[error("Decode target too short: need {needed} values, slice holds {capacity}")]
    OutputTooShort { needed: usize, capacity: usize },

    /// The compressed input ended before the decoder was done with it.
    #[error("Truncated input: need {needed} more bytes, only {available} available")]
    TruncatedInput { needed: usize, available: usize },

    // =========================================================================
    // === Semantic Errors
    // =========================================================================
    #[error("Index {index} is out of bounds for a sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("The {backend} codec does not support {bits}-bit elements")]
    UnsupportedWidth { backend: &'static str, bits: u32 },

    #[error("Corrupt block header: {0}")]
    CorruptHeader(String),

    #[error("Invalid codec configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // === Byte <-> Typed Slice Conversion
    // =========================================================================
    #[error("Buffer length mismatch: {0} bytes is not a multiple of {1}")]
    BufferMismatch(usize, usize),

    /// An error from a safe byte-casting operation failing.
    #[error("Byte slice casting error: {0}")]
    PodCast(String), // bytemuck::PodCastError doesn't impl Error on every version, so no #[from].

    // =========================================================================
    // === External Error Wrappers
    // =========================================================================
    /// An error from the Serde JSON library, raised while parsing a `CodecConfig`.
    #[error("Serde JSON error: {0}")]
    SerdeJson(String),
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<bytemuck::PodCastError> for IntPackError {
    fn from(err: bytemuck::PodCastError) -> Self {
        IntPackError::PodCast(format!("{:?}", err))
    }
}

impl From<serde_json::Error> for IntPackError {
    fn from(err: serde_json::Error) -> Self {
        IntPackError::SerdeJson(err.to_string())
    }
}
