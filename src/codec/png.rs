//! PNG adapter: `image` for decoding, `image` + `oxipng` for encoding.
//!
//! PNG is lossless, so quality never changes pixels. It instead selects how
//! much effort oxipng spends recompressing the raw encoder output: low
//! quality requests the slow, thorough presets.

use std::io::Cursor;

use image::ImageEncoder;
use image::codecs::png::PngEncoder;

use super::{Codec, EncodeOptions};
use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};
use crate::format::Format;

pub struct PngCodec;

/// Map a 0-100 quality to an oxipng optimization preset (1 = fast, 6 = max).
fn oxipng_preset(quality: u8) -> u8 {
    match quality {
        90..=100 => 1,
        70..=89 => 2,
        50..=69 => 3,
        30..=49 => 4,
        _ => 6,
    }
}

impl Codec for PngCodec {
    fn format(&self) -> Format {
        Format::Png
    }

    fn decode(&self, data: &[u8]) -> Result<PixelBuffer> {
        let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)
            .map_err(|e| Error::Decode(format!("png decode: {e}")))?;

        let rgba = img.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        PixelBuffer::new(width, height, rgba.into_raw())
    }

    fn encode(&self, image: &PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>> {
        let mut raw = Cursor::new(Vec::new());
        PngEncoder::new(&mut raw)
            .write_image(
                &image.data,
                image.width,
                image.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| Error::Encode(format!("png encode: {e}")))?;

        let opts = oxipng::Options::from_preset(oxipng_preset(options.quality));
        oxipng::optimize_from_memory(&raw.into_inner(), &opts)
            .map_err(|e| Error::Encode(format!("oxipng: {e}")))
    }
}
