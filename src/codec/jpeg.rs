//! JPEG adapter backed by the `image` crate.

use std::io::Cursor;

use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;

use super::{Codec, EncodeOptions};
use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};
use crate::format::Format;

pub struct JpegCodec;

impl Codec for JpegCodec {
    fn format(&self) -> Format {
        Format::Jpeg
    }

    fn decode(&self, data: &[u8]) -> Result<PixelBuffer> {
        let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
            .map_err(|e| Error::Decode(format!("jpeg decode: {e}")))?;

        let rgba = img.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        PixelBuffer::new(width, height, rgba.into_raw())
    }

    fn encode(&self, image: &PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>> {
        // JPEG has no alpha channel; encode the RGB samples.
        let rgb = image.to_rgb();

        let mut out = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut out, options.quality)
            .write_image(
                &rgb,
                image.width,
                image.height,
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| Error::Encode(format!("jpeg encode: {e}")))?;

        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::gradient_image;

    #[test]
    fn roundtrip_preserves_dimensions_and_magic() {
        let codec = JpegCodec;
        let original = gradient_image(64, 48);

        let encoded = codec
            .encode(&original, &EncodeOptions { quality: 90 })
            .expect("encode failed");
        assert_eq!(&encoded[..3], &[0xFF, 0xD8, 0xFF], "missing JPEG magic");

        let decoded = codec.decode(&encoded).expect("decode failed");
        assert_eq!(decoded.width, original.width);
        assert_eq!(decoded.height, original.height);
        assert_eq!(decoded.data.len(), original.data.len());
    }

    #[test]
    fn lower_quality_is_smaller() {
        let codec = JpegCodec;
        let image = gradient_image(128, 96);

        let high = codec
            .encode(&image, &EncodeOptions { quality: 95 })
            .unwrap();
        let low = codec
            .encode(&image, &EncodeOptions { quality: 30 })
            .unwrap();
        assert!(
            low.len() < high.len(),
            "q30 ({}) should be smaller than q95 ({})",
            low.len(),
            high.len()
        );
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(JpegCodec.decode(b"not a jpeg").is_err());
    }
}
