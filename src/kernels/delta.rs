//! This module contains the pure, stateless kernels for delta encoding and
//! decoding: plain delta, strict ("delta-1") delta, delta-of-delta,
//! frame-of-reference, and the index-biased rebasing used ahead of Elias-Fano.
//!
//! This is a Layer 1 (Value Reduction) transform. Every kernel takes the seed
//! it starts from and returns the seed the *next* block must start from, so a
//! caller can run them block by block and still get the transform of the
//! whole array. All arithmetic wraps modulo the element width: a decreasing
//! input is legal, it just stops being small.

use crate::traits::PackedInt;

//==================================================================================
// 1. Delta / Strict Delta
//==================================================================================

/// `out[i] = in[i] - prev - bias`, with `prev` the previous input (or the seed).
///
/// `bias` is 0 for plain delta and 1 for strictly increasing input.
/// Returns the last input value, the seed for the following block.
pub fn encode_block<T: PackedInt>(input: &[T], output: &mut [T], mut prev: T, bias: T) -> T {
    for (out, &value) in output.iter_mut().zip(input) {
        *out = value.wrapping_sub(&prev).wrapping_sub(&bias);
        prev = value;
    }
    prev
}

/// Prefix sum **in-place**: the inverse of [`encode_block`].
pub fn decode_block_inplace<T: PackedInt>(data: &mut [T], mut prev: T, bias: T) -> T {
    for value in data.iter_mut() {
        prev = prev.wrapping_add(&*value).wrapping_add(&bias);
        *value = prev;
    }
    prev
}

//==================================================================================
// 2. Delta of Delta
//==================================================================================

/// `out[i] = (in[i] - in[i-1]) - (in[i-1] - in[i-2])`, seeded with `(prev, prev_delta)`.
///
/// Returns the updated `(prev, prev_delta)` pair.
pub fn encode_double_block<T: PackedInt>(
    input: &[T],
    output: &mut [T],
    mut prev: T,
    mut prev_delta: T,
) -> (T, T) {
    for (out, &value) in output.iter_mut().zip(input) {
        let delta = value.wrapping_sub(&prev);
        *out = delta.wrapping_sub(&prev_delta);
        prev = value;
        prev_delta = delta;
    }
    (prev, prev_delta)
}

/// Double prefix sum **in-place**: the inverse of [`encode_double_block`].
pub fn decode_double_block_inplace<T: PackedInt>(
    data: &mut [T],
    mut prev: T,
    mut prev_delta: T,
) -> (T, T) {
    for value in data.iter_mut() {
        prev_delta = prev_delta.wrapping_add(&*value);
        prev = prev.wrapping_add(&prev_delta);
        *value = prev;
    }
    (prev, prev_delta)
}

//==================================================================================
// 3. Frame of Reference
//==================================================================================

/// `out[i] = in[i] - base` for every element; no value depends on its neighbours.
pub fn encode_for_block<T: PackedInt>(input: &[T], output: &mut [T], base: T) {
    for (out, &value) in output.iter_mut().zip(input) {
        *out = value.wrapping_sub(&base);
    }
}

/// Adds `base` back **in-place**: the inverse of [`encode_for_block`].
pub fn decode_for_block_inplace<T: PackedInt>(data: &mut [T], base: T) {
    for value in data.iter_mut() {
        *value = value.wrapping_add(&base);
    }
}

//==================================================================================
// 4. Monotone Rebasing (Elias-Fano pre-stage)
//==================================================================================

/// Rebases a monotone sequence onto zero: `x[i] = v[i] - start`, or
/// `v[i] - start - (i + 1)` when `strict`.
///
/// For strictly increasing input the strict form turns the sequence into a
/// non-decreasing one with a smaller universe. Whether the input really is
/// monotone is the caller's contract; this function does not check it.
pub fn rebase_monotone<T: PackedInt>(input: &[T], output: &mut [T], start: T, strict: bool) {
    for (i, (out, &value)) in output.iter_mut().zip(input).enumerate() {
        let base = value.wrapping_sub(&start);
        *out = if strict {
            base.wrapping_sub(&T::narrow(i as u64 + 1))
        } else {
            base
        };
    }
}

/// Inverse of [`rebase_monotone`] for the element at position `index`.
#[inline]
pub fn restore_monotone_at<T: PackedInt>(x: T, index: usize, start: T, strict: bool) -> T {
    let value = x.wrapping_add(&start);
    if strict {
        value.wrapping_add(&T::narrow(index as u64 + 1))
    } else {
        value
    }
}

//==================================================================================
// 4. Unit Tests
//==================================================================================
