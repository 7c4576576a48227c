//! QOI adapter backed by rapid-qoi. Lossless format — quality is ignored.

use rapid_qoi::{Colors, Qoi};

use super::{Codec, EncodeOptions};
use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};
use crate::format::Format;

pub struct QoiCodec;

impl Codec for QoiCodec {
    fn format(&self) -> Format {
        Format::Qoi
    }

    fn decode(&self, data: &[u8]) -> Result<PixelBuffer> {
        let (header, pixels) =
            Qoi::decode_alloc(data).map_err(|e| Error::Decode(format!("qoi decode: {e}")))?;

        // QOI streams may carry RGB; widen to RGBA.
        let rgba = if header.colors.has_alpha() {
            pixels
        } else {
            pixels
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], 255])
                .collect()
        };

        PixelBuffer::new(header.width, header.height, rgba)
    }

    fn encode(&self, image: &PixelBuffer, _options: &EncodeOptions) -> Result<Vec<u8>> {
        let qoi = Qoi {
            width: image.width,
            height: image.height,
            colors: Colors::SrgbLinA,
        };

        qoi.encode_alloc(&image.data)
            .map_err(|e| Error::Encode(format!("qoi encode: {e}")))
    }
}
