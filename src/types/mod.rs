//! This module defines the core, strongly-typed runtime tags used throughout
//! intpack.
//!
//! Generic code carries the element width as a type parameter (`T: PackedInt`).
//! The enums here exist for the places where the width or lane strategy is only
//! known at runtime: the byte-level dispatcher and the serialized `CodecConfig`.

pub mod element_width;
pub mod lane_width;

// Re-export the main type(s) for easier access.
pub use element_width::ElementWidth;
pub use lane_width::LaneWidth;
