//! Codec adapters — one per supported format.
//!
//! | Format | Decode | Encode |
//! |---|---|---|
//! | JPEG | `image` | `image::codecs::jpeg::JpegEncoder` (RGB, alpha dropped) |
//! | PNG | `image` | `image::codecs::png::PngEncoder` + `oxipng` recompression |
//! | WebP | `image` (pure Rust) | `webp` (libwebp, lossy) |
//! | AVIF | `avif-parse` + `rav1d` | `image::codecs::avif::AvifEncoder` (rav1e) |
//! | JXL | `jpegxl-rs` | `jpegxl-rs` |
//! | QOI | `rapid-qoi` | `rapid-qoi` |
//!
//! Quality is only meaningful for the lossy encoders; PNG maps it to an
//! oxipng effort preset and QOI ignores it. Range validation of the quality
//! value is the pipeline's job, not the codec's.

pub mod avif;
pub mod jpeg;
pub mod jxl;
pub mod png;
pub mod qoi;
pub mod webp;

use crate::buffer::PixelBuffer;
use crate::error::Result;
use crate::format::Format;

/// Options for encoding an image.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    /// Quality value in the range 0..=100.
    pub quality: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { quality: 80 }
    }
}

/// Trait implemented by each codec adapter.
pub trait Codec: Sync {
    /// The format handled by this codec.
    fn format(&self) -> Format;

    /// Decode encoded bytes into an RGBA [`PixelBuffer`]. Malformed or
    /// truncated input is a decode error.
    fn decode(&self, data: &[u8]) -> Result<PixelBuffer>;

    /// Encode a buffer into the codec's container format.
    fn encode(&self, image: &PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>>;
}

/// Return the codec for the given format.
pub fn codec_for(format: Format) -> &'static dyn Codec {
    match format {
        Format::Jpeg => &jpeg::JpegCodec,
        Format::Png => &png::PngCodec,
        Format::WebP => &webp::WebPCodec,
        Format::Avif => &avif::AvifCodec,
        Format::Jxl => &jxl::JxlCodec,
        Format::Qoi => &qoi::QoiCodec,
    }
}

/// Gradient test image used by every codec's unit tests.
#[cfg(test)]
pub(crate) fn gradient_image(width: u32, height: u32) -> PixelBuffer {
    let mut data = vec![0u8; width as usize * height as usize * 4];
    for y in 0..height {
        for x in 0..width {
            let i = ((y * width + x) * 4) as usize;
            data[i] = (x * 255 / width.max(1)) as u8;
            data[i + 1] = (y * 255 / height.max(1)) as u8;
            data[i + 2] = 128;
            data[i + 3] = 255;
        }
    }
    PixelBuffer::new(width, height, data).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_options_default_quality() {
        assert_eq!(EncodeOptions::default().quality, 80);
    }

    #[test]
    fn dispatch_matches_format() {
        for format in [
            Format::Jpeg,
            Format::Png,
            Format::WebP,
            Format::Avif,
            Format::Jxl,
            Format::Qoi,
        ] {
            assert_eq!(codec_for(format).format(), format);
        }
    }

    #[test]
    fn every_decoder_rejects_zeroed_input() {
        for format in [
            Format::Jpeg,
            Format::Png,
            Format::WebP,
            Format::Avif,
            Format::Jxl,
            Format::Qoi,
        ] {
            let result = codec_for(format).decode(&[0, 0, 0, 0]);
            assert!(result.is_err(), "{format:?} accepted 4 zero bytes");
        }
    }
}
