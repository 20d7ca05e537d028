//! The canonical runtime representation of an element width.

use crate::error::IntPackError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the unsigned integers in an `IntegerArray`.
///
/// This enum replaces string type descriptors ("UInt32", ...) at the byte-level
/// API so that a typo is a compile error rather than a runtime one.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ElementWidth {
    U8,
    U16,
    U32,
    U64,
}

impl ElementWidth {
    /// Maps a bit count (8/16/32/64) to its width tag.
    pub fn from_bits(bits: u32) -> Result<Self, IntPackError> {
        match bits {
            8 => Ok(Self::U8),
            16 => Ok(Self::U16),
            32 => Ok(Self::U32),
            64 => Ok(Self::U64),
            other => Err(IntPackError::InvalidConfig(format!(
                "element width must be 8, 16, 32 or 64 bits, got {}",
                other
            ))),
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
            Self::U64 => 64,
        }
    }

    /// Size of one element in bytes.
    pub fn byte_size(&self) -> usize {
        (self.bits() / 8) as usize
    }
}

impl fmt::Display for ElementWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.bits())
    }
}
