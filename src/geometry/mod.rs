//! Rectangular geometric transforms over [`PixelBuffer`](crate::PixelBuffer).
//!
//! The module is split the same way throughout:
//! - a **mode enum** describing one configuration choice (mutually exclusive
//!   variants, so "both given" or "neither given" cannot be expressed), and
//! - a **pure calculation function** for the region/dimension math, unit
//!   testable without touching pixels, followed by the pixel operation.
//!
//! Centering arithmetic uses floor division for offsets on both axes and
//! `round()` for ratio-derived dimensions, so results are deterministic and
//! match on every axis.

pub mod crop;
pub mod extend;
pub mod resize;

pub use crop::{CropMode, crop};
pub use extend::{ExtendMode, FillColor, extend};
pub use resize::{ResizeMode, resize};
