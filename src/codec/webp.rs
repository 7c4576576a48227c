//! WebP adapter: `image` crate decoding (pure Rust), libwebp encoding.
//!
//! The `image` crate only writes lossless WebP, so lossy encoding with a
//! quality knob goes through the `webp` crate instead.

use super::{Codec, EncodeOptions};
use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};
use crate::format::Format;

pub struct WebPCodec;

impl Codec for WebPCodec {
    fn format(&self) -> Format {
        Format::WebP
    }

    fn decode(&self, data: &[u8]) -> Result<PixelBuffer> {
        let img = image::load_from_memory_with_format(data, image::ImageFormat::WebP)
            .map_err(|e| Error::Decode(format!("webp decode: {e}")))?;

        let rgba = img.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        PixelBuffer::new(width, height, rgba.into_raw())
    }

    fn encode(&self, image: &PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>> {
        let encoder = webp::Encoder::from_rgba(&image.data, image.width, image.height);
        let encoded = encoder.encode(options.quality as f32);
        Ok(encoded.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::gradient_image;

    #[test]
    fn roundtrip_preserves_dimensions_and_magic() {
        let codec = WebPCodec;
        let original = gradient_image(64, 48);

        let encoded = codec
            .encode(&original, &EncodeOptions { quality: 90 })
            .expect("encode failed");
        assert_eq!(&encoded[..4], b"RIFF", "missing RIFF header");
        assert_eq!(&encoded[8..12], b"WEBP", "missing WEBP fourcc");

        let decoded = codec.decode(&encoded).expect("decode failed");
        assert_eq!(decoded.width, original.width);
        assert_eq!(decoded.height, original.height);
    }

    #[test]
    fn lower_quality_is_smaller() {
        let codec = WebPCodec;
        let image = gradient_image(128, 96);

        let high = codec
            .encode(&image, &EncodeOptions { quality: 95 })
            .unwrap();
        let low = codec
            .encode(&image, &EncodeOptions { quality: 20 })
            .unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(WebPCodec.decode(b"RIFFxxxxNOPE").is_err());
    }
}
