//! This module defines shared traits used across the different codec kernels.
//!
//! `PackedInt` collapses the per-width function families (`*8`, `*16`, `*32`,
//! `*64`) into one generic parameter. `GroupVarintInt` and `EliasFanoInt`
//! narrow that set for the backends that only support some widths, so a
//! request for e.g. a 64-bit TurboByte stream fails to compile instead of at
//! runtime.

use std::fmt::Debug;

use num_traits::{PrimInt, Unsigned, WrappingAdd, WrappingSub};

use crate::error::IntPackError;

/// An unsigned fixed-width element that every codec in this crate can handle.
pub trait PackedInt:
    PrimInt + Unsigned + WrappingAdd + WrappingSub + bytemuck::Pod + Default + Debug + Send + Sync + 'static
{
    /// Width of the element in bits (8, 16, 32 or 64).
    const BITS: u32;

    /// Zero-extends the value to 64 bits.
    fn widen(self) -> u64;

    /// Truncates a 64-bit value to this width (mod 2^BITS).
    fn narrow(value: u64) -> Self;
}

macro_rules! impl_packed_int {
    ($($t:ty),+) => {
        $(
            impl PackedInt for $t {
                const BITS: u32 = <$t>::BITS;

                #[inline]
                fn widen(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn narrow(value: u64) -> Self {
                    value as $t
                }
            }
        )+
    };
}

impl_packed_int!(u8, u16, u32, u64);

/// Element widths supported by the TurboByte group-varint backend (16 and 32 bits).
pub trait GroupVarintInt: PackedInt {}
impl GroupVarintInt for u16 {}
impl GroupVarintInt for u32 {}

/// Element widths supported by the Elias-Fano backend (32 and 64 bits).
pub trait EliasFanoInt: PackedInt {}
impl EliasFanoInt for u32 {}
impl EliasFanoInt for u64 {}

/// The symmetric encode/decode contract shared by every backend.
///
/// `n`, the element width and `start` are never stored in the compressed
/// bytes; decode must be called with the values used at encode.
pub trait IntegerCodec<T: PackedInt> {
    /// Worst-case number of bytes `encode` can write for `n` elements.
    fn max_compressed_len(&self, n: usize) -> usize;

    /// Encodes `input` into `output`, returning the number of bytes written.
    fn encode(&self, input: &[T], output: &mut [u8], start: T) -> Result<usize, IntPackError>;

    /// Decodes `n` values into `output[..n]`, returning the number of input bytes consumed.
    fn decode(&self, input: &[u8], n: usize, output: &mut [T], start: T) -> Result<usize, IntPackError>;

    /// Allocating convenience wrapper around [`IntegerCodec::encode`].
    fn encode_to_vec(&self, input: &[T], start: T) -> Result<Vec<u8>, IntPackError> {
        let mut buf = vec![0u8; self.max_compressed_len(input.len())];
        let written = self.encode(input, &mut buf, start)?;
        buf.truncate(written);
        Ok(buf)
    }

    /// Allocating convenience wrapper around [`IntegerCodec::decode`].
    fn decode_to_vec(&self, input: &[u8], n: usize, start: T) -> Result<Vec<T>, IntPackError> {
        let mut out = vec![T::zero(); n];
        self.decode(input, n, &mut out, start)?;
        Ok(out)
    }
}
