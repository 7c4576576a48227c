//! JPEG XL adapter backed by jpegxl-rs (libjxl, vendored build).
//!
//! libjxl expresses lossy quality as a Butteraugli distance, so the 0-100
//! quality scale is mapped through libjxl's own quality→distance curve.
//! Quality 100 switches to lossless mode.

use jpegxl_rs::decode::PixelFormat;
use jpegxl_rs::encode::{EncoderFrame, EncoderResult, EncoderSpeed};
use jpegxl_rs::{Endianness, decoder_builder, encoder_builder};

use super::{Codec, EncodeOptions};
use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};
use crate::format::Format;

pub struct JxlCodec;

/// libjxl's `JxlEncoderDistanceFromQuality` curve.
fn distance_from_quality(quality: u8) -> f32 {
    let q = quality as f32;
    if quality >= 100 {
        0.0
    } else if quality >= 30 {
        0.1 + (100.0 - q) * 0.09
    } else {
        53.0 / 3000.0 * q * q - 23.0 / 20.0 * q + 25.0
    }
}

impl Codec for JxlCodec {
    fn format(&self) -> Format {
        Format::Jxl
    }

    fn decode(&self, data: &[u8]) -> Result<PixelBuffer> {
        let decoder = decoder_builder()
            .pixel_format(PixelFormat {
                num_channels: 4,
                endianness: Endianness::Native,
                align: 0,
            })
            .build()
            .map_err(|e| Error::Decode(format!("jxl decoder init: {e}")))?;

        let (metadata, pixels) = decoder
            .decode_with::<u8>(data)
            .map_err(|e| Error::Decode(format!("jxl decode: {e}")))?;

        PixelBuffer::new(metadata.width, metadata.height, pixels)
    }

    fn encode(&self, image: &PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>> {
        let lossless = options.quality >= 100;
        let mut encoder = encoder_builder()
            .speed(EncoderSpeed::Squirrel)
            .quality(distance_from_quality(options.quality))
            .lossless(lossless)
            .uses_original_profile(lossless)
            .has_alpha(true)
            .build()
            .map_err(|e| Error::Encode(format!("jxl encoder init: {e}")))?;

        let frame = EncoderFrame::new(image.data.as_slice()).num_channels(4);
        let result: EncoderResult<u8> = encoder
            .encode_frame(&frame, image.width, image.height)
            .map_err(|e| Error::Encode(format!("jxl encode: {e}")))?;

        Ok(result.data)
    }
}
