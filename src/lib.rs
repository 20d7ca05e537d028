//! This file is the root of the `intpack` crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`kernels`, `types`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the public surface: the codec structs, the `IntegerCodec`
//!     and `RandomAccess` traits, the runtime type tags, the configuration and
//!     the byte-level dispatchers.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod buffer;
pub mod config;
pub mod error;
pub mod kernels;
pub mod sample;
pub mod traits;
pub mod types;
pub mod utils;

#[doc(hidden)]
pub use log as __log;

//==================================================================================
// 2. Public API
//==================================================================================
pub use config::{Backend, CodecConfig, ExceptionPolicy};
pub use error::IntPackError;
pub use kernels::access::{RandomAccess, SearchMode};
pub use kernels::elias_fano::EliasFanoCodec;
pub use kernels::pfor::PforCodec;
pub use kernels::transform::{Transform, TransformState};
pub use kernels::turbobyte::TurboByteCodec;
pub use kernels::vbyte::{VByteCodec, VByteCursor};
pub use kernels::{dispatch_decode, dispatch_encode};
pub use observability::init_logging;
pub use traits::{EliasFanoInt, GroupVarintInt, IntegerCodec, PackedInt};
pub use types::{ElementWidth, LaneWidth};
