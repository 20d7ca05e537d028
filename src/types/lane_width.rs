//! The lane strategy used to pack and unpack fixed-width fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the parallel unit used to unpack fields.
///
/// The lane width never changes the bitstream format of a PFor block. It picks
/// how many fields one unpack step produces and the default block size.
/// TurboByte additionally derives its group length from it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LaneWidth {
    /// One field at a time. Always available.
    #[default]
    Scalar,
    /// A 128-bit register's worth of fields per step.
    V128,
    /// A 256-bit register's worth of fields per step.
    V256,
}

impl LaneWidth {
    /// Default PFor block length for this lane width.
    pub fn default_block_size(&self) -> usize {
        match self {
            Self::Scalar | Self::V128 => 128,
            Self::V256 => 256,
        }
    }

    /// Number of values sharing one TurboByte descriptor for `elem_bytes`-wide elements.
    pub fn group_len(&self, elem_bytes: usize) -> usize {
        match self {
            Self::Scalar => 4,
            Self::V128 => 16 / elem_bytes,
            Self::V256 => 32 / elem_bytes,
        }
    }
}

impl fmt::Display for LaneWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::V128 => write!(f, "128v"),
            Self::V256 => write!(f, "256v"),
        }
    }
}
