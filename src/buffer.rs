//! The canonical decoded image: interleaved RGBA8, row-major, no padding.
//!
//! Every transform and every codec works on [`PixelBuffer`]. Buffers are
//! immutable value objects: each stage produces a fresh one and consumes its
//! input by reference, so concurrent pipeline invocations never share state.

use crate::error::{Error, Result};
use crate::format::Format;

/// A decoded image: `width * height * 4` bytes of RGBA, top-left origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    /// The format this buffer was decoded from, or `None` when it was built
    /// directly from raw samples.
    pub source: Option<Format>,
}

impl PixelBuffer {
    /// Create a buffer from raw RGBA bytes.
    ///
    /// The only validation is the length invariant: `data.len()` must equal
    /// `width * height * 4`. Degenerate zero-dimension buffers are legal
    /// inert values.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(Error::Validation {
                field: "data",
                message: format!(
                    "expected {expected} bytes ({width}x{height}x4), got {}",
                    data.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            source: None,
        })
    }

    /// Tag the buffer with the format it was decoded from.
    pub fn with_source(mut self, format: Format) -> Self {
        self.source = Some(format);
        self
    }

    /// Drop the alpha channel, yielding interleaved RGB bytes.
    pub fn to_rgb(&self) -> Vec<u8> {
        self.data
            .chunks_exact(4)
            .flat_map(|px| &px[..3])
            .copied()
            .collect()
    }
}
