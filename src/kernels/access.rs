//! Random access and forward search over compressed buffers.
//!
//! Every backend answers the same three questions about the array it encoded
//! without decoding all of it: the value at a position, the first position at
//! or after `from_index` holding a given key, and the first position at or
//! after `from_index` holding a value `>=` the key. A search that finds
//! nothing returns `n`.

use crate::error::IntPackError;
use crate::traits::PackedInt;

/// What a forward search is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// `value == key`
    Equal,
    /// `value >= key`
    AtLeast,
}

impl SearchMode {
    #[inline]
    pub fn matches<T: PackedInt>(self, value: T, key: T) -> bool {
        match self {
            SearchMode::Equal => value == key,
            SearchMode::AtLeast => value >= key,
        }
    }
}

pub trait RandomAccess<T: PackedInt> {
    /// Value at `index`; `IndexOutOfBounds` when `index >= n`.
    fn get(&self, input: &[u8], n: usize, index: usize, start: T) -> Result<T, IntPackError>;

    /// First `i >= from_index` satisfying `mode` against `key`, or `n`.
    fn search(
        &self,
        input: &[u8],
        n: usize,
        from_index: usize,
        key: T,
        start: T,
        mode: SearchMode,
    ) -> Result<usize, IntPackError>;

    fn geteq(&self, input: &[u8], n: usize, from_index: usize, key: T, start: T) -> Result<usize, IntPackError> {
        self.search(input, n, from_index, key, start, SearchMode::Equal)
    }

    fn getgeq(&self, input: &[u8], n: usize, from_index: usize, key: T, start: T) -> Result<usize, IntPackError> {
        self.search(input, n, from_index, key, start, SearchMode::AtLeast)
    }
}

#[inline]
pub(crate) fn check_index(index: usize, n: usize) -> Result<(), IntPackError> {
    if index >= n {
        return Err(IntPackError::IndexOutOfBounds { index, len: n });
    }
    Ok(())
}

/// Scans a decoded run of values that begins at array position `base`.
///
/// Returns the array position of the first match at or after `from_index`.
pub(crate) fn scan_decoded<T: PackedInt>(
    values: &[T],
    base: usize,
    from_index: usize,
    key: T,
    mode: SearchMode,
) -> Option<usize> {
    let skip = from_index.saturating_sub(base);
    values
        .iter()
        .skip(skip)
        .position(|&v| mode.matches(v, key))
        .map(|offset| base + skip + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_decoded_respects_base_and_from() {
        let block: Vec<u32> = vec![4, 9, 9, 15];
        // Block holds array positions 100..104.
        assert_eq!(scan_decoded(&block, 100, 0, 9, SearchMode::Equal), Some(101));
        assert_eq!(scan_decoded(&block, 100, 102, 9, SearchMode::Equal), Some(102));
        assert_eq!(scan_decoded(&block, 100, 103, 9, SearchMode::Equal), None);
        assert_eq!(scan_decoded(&block, 100, 0, 10, SearchMode::AtLeast), Some(103));
    }

    #[test]
    fn test_check_index() {
        assert!(check_index(2, 3).is_ok());
        assert_eq!(
            check_index(3, 3).unwrap_err(),
            IntPackError::IndexOutOfBounds { index: 3, len: 3 }
        );
    }
}
