// In: src/config.rs

//! The single source of truth for codec configuration.
//!
//! A `CodecConfig` names a backend, the transform that runs in front of it and
//! the backend's tuning knobs. It is plain data: it can be built in code,
//! deserialized from JSON, and handed to `kernels::dispatch_encode` /
//! `kernels::dispatch_decode`. Every field has a default, so `{}` is a valid
//! configuration (PFor, identity, scalar lanes).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::IntPackError;
use crate::kernels::elias_fano::EliasFanoCodec;
use crate::kernels::pfor::{PforCodec, DEFAULT_EXCEPTION_RATIO};
use crate::kernels::transform::Transform;
use crate::kernels::turbobyte::TurboByteCodec;
use crate::kernels::vbyte::VByteCodec;
use crate::types::LaneWidth;

//==================================================================================
// I. Core Configuration Enums & Structs
//==================================================================================

/// The packing backend.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// **Default:** block bit-packing with exceptions. Every width.
    #[default]
    Pfor,
    /// Variable-byte, one value at a time. Every width.
    #[serde(rename = "vbyte")]
    VByte,
    /// Group varint. 16- and 32-bit elements only.
    #[serde(rename = "turbobyte")]
    TurboByte,
    /// Monotone sequences. 32- and 64-bit elements only.
    EliasFano,
}

impl Backend {
    /// The serialized name, also used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pfor => "pfor",
            Self::VByte => "vbyte",
            Self::TurboByte => "turbobyte",
            Self::EliasFano => "elias_fano",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How freely PFor may move values into the exception side-channel.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ExceptionPolicy {
    /// At most `ceil(m * max_exception_ratio)` exceptions per block of `m`.
    #[serde(default = "default_exception_ratio")]
    pub max_exception_ratio: f32,
}

impl Default for ExceptionPolicy {
    fn default() -> Self {
        ExceptionPolicy {
            max_exception_ratio: default_exception_ratio(),
        }
    }
}

fn default_exception_ratio() -> f32 {
    DEFAULT_EXCEPTION_RATIO
}

//==================================================================================
// II. The Unified CodecConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    #[serde(default)]
    pub backend: Backend,

    /// For Elias-Fano only `identity` / `delta` / `for` (non-strict) and
    /// `delta_strict` (strict variant) are meaningful.
    #[serde(default)]
    pub transform: Transform,

    #[serde(default)]
    pub lane: LaneWidth,

    /// PFor block length; `None` uses the lane's default (128, or 256 for `v256`).
    #[serde(default)]
    pub block_size: Option<usize>,

    #[serde(default)]
    pub exception: ExceptionPolicy,
}

impl CodecConfig {
    pub fn new(backend: Backend, transform: Transform) -> Self {
        CodecConfig {
            backend,
            transform,
            ..Default::default()
        }
    }

    pub fn with_lane(mut self, lane: LaneWidth) -> Self {
        self.lane = lane;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = Some(block_size);
        self
    }

    pub fn with_exception_ratio(mut self, ratio: f32) -> Self {
        self.exception.max_exception_ratio = ratio;
        self
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, IntPackError> {
        let config: CodecConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, IntPackError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), IntPackError> {
        if self.block_size == Some(0) {
            return Err(IntPackError::InvalidConfig("block_size must be at least 1".to_string()));
        }
        let ratio = self.exception.max_exception_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(IntPackError::InvalidConfig(format!(
                "max_exception_ratio must be within [0, 1], got {}",
                ratio
            )));
        }
        if self.backend == Backend::EliasFano {
            self.elias_fano_strict()?;
        }
        Ok(())
    }

    /// Whether the Elias-Fano backend runs its strict variant under this transform.
    fn elias_fano_strict(&self) -> Result<bool, IntPackError> {
        match self.transform {
            Transform::Identity | Transform::Delta | Transform::For => Ok(false),
            Transform::DeltaStrict => Ok(true),
            other => Err(IntPackError::InvalidConfig(format!(
                "the elias_fano backend cannot run the {} transform",
                other
            ))),
        }
    }

    //==============================================================================
    // Codec construction
    //==============================================================================

    pub fn pfor_codec(&self) -> PforCodec {
        let codec = PforCodec::new(self.lane)
            .with_transform(self.transform)
            .with_exception_ratio(self.exception.max_exception_ratio);
        match self.block_size {
            Some(block_size) => codec.with_block_size(block_size),
            None => codec,
        }
    }

    pub fn vbyte_codec(&self) -> VByteCodec {
        VByteCodec::new(self.transform)
    }

    pub fn turbobyte_codec(&self) -> TurboByteCodec {
        TurboByteCodec::new(self.lane).with_transform(self.transform)
    }

    pub fn elias_fano_codec(&self) -> Result<EliasFanoCodec, IntPackError> {
        Ok(EliasFanoCodec::new(self.elias_fano_strict()?))
    }
}

//==================================================================================
// III. Unit Tests
//==================================================================================
