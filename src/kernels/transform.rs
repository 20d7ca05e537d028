//! The transform stage: the reversible pre-processing every backend runs
//! before packing and after unpacking.
//!
//! A `Transform` is a pure function of the values and a `TransformState`
//! seed. Backends process one block at a time and thread the returned state
//! into the next block, so the transform is defined over the whole array even
//! though no block ever sees its neighbours.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{delta, xor_delta, zigzag};
use crate::traits::PackedInt;

/// One of the reversible numeric transforms.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Values are packed as-is.
    #[default]
    Identity,
    /// `v[i] - v[i-1]`; for non-decreasing data (sorted with duplicates).
    Delta,
    /// `v[i] - v[i-1] - 1`; for strictly increasing data (sorted, unique).
    DeltaStrict,
    /// Zig-zag of `v[i] - v[i-1]`; for unsorted data with small steps of either sign.
    #[serde(rename = "zigzag")]
    ZigZag,
    /// Delta of delta; for near-linear series such as regular timestamps.
    DoubleDelta,
    /// `v[i] ^ v[i-1]`; for data sharing high-order bit patterns.
    Xor,
    /// `v[i] - start`; frame of reference for values clustered above a known base.
    For,
}

impl Transform {
    /// Stable numeric id, usable as a tag in caller-side lookup tables.
    pub fn id(&self) -> u8 {
        match self {
            Self::Identity => 0,
            Self::Delta => 1,
            Self::DeltaStrict => 2,
            Self::ZigZag => 3,
            Self::DoubleDelta => 4,
            Self::Xor => 5,
            Self::For => 6,
        }
    }

    /// `true` when decoding value `i` needs every value before it.
    pub fn is_stateful(&self) -> bool {
        !matches!(self, Self::Identity | Self::For)
    }

    /// Transforms `input` into `output` (same length), continuing from `state`.
    pub fn forward<T: PackedInt>(&self, input: &[T], output: &mut [T], state: TransformState<T>) -> TransformState<T> {
        debug_assert_eq!(input.len(), output.len());
        match self {
            Self::Identity => {
                output.copy_from_slice(input);
                state
            }
            Self::Delta => state.with_prev(delta::encode_block(input, output, state.prev, T::zero())),
            Self::DeltaStrict => state.with_prev(delta::encode_block(input, output, state.prev, T::one())),
            Self::ZigZag => state.with_prev(zigzag::encode_block(input, output, state.prev)),
            Self::DoubleDelta => {
                let (prev, prev_delta) = delta::encode_double_block(input, output, state.prev, state.prev_delta);
                TransformState { prev, prev_delta }
            }
            Self::Xor => state.with_prev(xor_delta::encode_block(input, output, state.prev)),
            Self::For => {
                delta::encode_for_block(input, output, state.prev);
                state
            }
        }
    }

    /// Reverses [`Transform::forward`] **in-place**, continuing from `state`.
    pub fn inverse<T: PackedInt>(&self, data: &mut [T], state: TransformState<T>) -> TransformState<T> {
        match self {
            Self::Identity => state,
            Self::Delta => state.with_prev(delta::decode_block_inplace(data, state.prev, T::zero())),
            Self::DeltaStrict => state.with_prev(delta::decode_block_inplace(data, state.prev, T::one())),
            Self::ZigZag => state.with_prev(zigzag::decode_block_inplace(data, state.prev)),
            Self::DoubleDelta => {
                let (prev, prev_delta) = delta::decode_double_block_inplace(data, state.prev, state.prev_delta);
                TransformState { prev, prev_delta }
            }
            Self::Xor => state.with_prev(xor_delta::decode_block_inplace(data, state.prev)),
            Self::For => {
                delta::decode_for_block_inplace(data, state.prev);
                state
            }
        }
    }

    /// Single-value form of [`Transform::inverse`], for streaming decoders.
    #[inline]
    pub fn inverse_one<T: PackedInt>(&self, code: T, state: &mut TransformState<T>) -> T {
        let mut one = [code];
        *state = self.inverse(&mut one, *state);
        one[0]
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::Delta => "delta",
            Self::DeltaStrict => "delta_strict",
            Self::ZigZag => "zigzag",
            Self::DoubleDelta => "double_delta",
            Self::Xor => "xor",
            Self::For => "for",
        };
        f.write_str(name)
    }
}

/// The running seed carried from one block to the next.
///
/// `prev` is the last original value (the caller's `start` before the first
/// block, and for frame-of-reference the base throughout); `prev_delta` is
/// only used by double-delta and starts at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformState<T> {
    pub prev: T,
    pub prev_delta: T,
}

impl<T: PackedInt> TransformState<T> {
    pub fn seed(start: T) -> Self {
        TransformState {
            prev: start,
            prev_delta: T::zero(),
        }
    }

    #[inline]
    fn with_prev(self, prev: T) -> Self {
        TransformState { prev, ..self }
    }
}
