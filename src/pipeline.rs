//! Pipeline orchestration: decode → crop → resize → extend → encode.
//!
//! All validation happens before any pixel work, so a failed call never
//! leaves partially-applied transforms. The transform order is fixed
//! (crop, then resize, then extend), which lets a caller crop to an aspect
//! ratio, downscale, and pad to a final canvas in a single conversion.

use std::fs;
use std::path::{Path, PathBuf};

use crate::buffer::PixelBuffer;
use crate::codec::{EncodeOptions, codec_for};
use crate::error::{Error, Result};
use crate::format::Format;
use crate::geometry::{CropMode, ExtendMode, FillColor, ResizeMode, crop, extend, resize};

/// Options for a conversion.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Target output format.
    pub format: Format,
    /// Encoding quality (0..=100).
    pub quality: u8,
    /// Optional crop, applied first.
    pub crop: Option<CropMode>,
    /// Optional resize, applied after crop.
    pub resize: Option<ResizeMode>,
    /// Optional extend, applied last.
    pub extend: Option<ExtendMode>,
    /// Fill for pixels added by extend.
    pub fill: FillColor,
}

impl PipelineOptions {
    /// Plain conversion to `format` at `quality`, no transforms.
    pub fn new(format: Format, quality: u8) -> Self {
        Self {
            format,
            quality,
            crop: None,
            resize: None,
            extend: None,
            fill: FillColor::Transparent,
        }
    }
}

/// An encoded image: a format tag plus opaque bytes.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub format: Format,
    pub data: Vec<u8>,
}

impl EncodedImage {
    /// Write the encoded bytes to a file, creating or fully overwriting it.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.data)?;
        Ok(())
    }
}

fn validate_quality(quality: u8) -> Result<()> {
    if quality > 100 {
        return Err(Error::Validation {
            field: "quality",
            message: format!("{quality} is outside 0-100"),
        });
    }
    Ok(())
}

/// Convert an image to the target format, applying the optional transforms.
pub fn convert(image: &PixelBuffer, options: &PipelineOptions) -> Result<EncodedImage> {
    validate_quality(options.quality)?;
    if !options.format.can_encode() {
        return Err(Error::EncodingNotSupported(options.format));
    }

    let image = match &options.crop {
        Some(mode) => crop(image, mode)?,
        None => image.clone(),
    };

    let image = match &options.resize {
        Some(mode) => resize(&image, mode)?,
        None => image,
    };

    let image = match &options.extend {
        Some(mode) => extend(&image, mode, &options.fill)?,
        None => image,
    };

    let data = codec_for(options.format).encode(
        &image,
        &EncodeOptions {
            quality: options.quality,
        },
    )?;

    Ok(EncodedImage {
        format: options.format,
        data,
    })
}

/// Sniff the format from magic bytes and decode. The returned buffer is
/// tagged with its source format.
pub fn decode(data: &[u8]) -> Result<PixelBuffer> {
    let format = Format::from_bytes(data)
        .ok_or_else(|| Error::UnknownFormat("unrecognized magic bytes".to_string()))?;
    let image = codec_for(format).decode(data)?;
    Ok(image.with_source(format))
}

/// Read a file, detect its format, and decode it.
///
/// Detection prefers magic bytes and falls back to the path extension for
/// formats whose signature is not recognized in the data.
pub fn decode_file(path: &Path) -> Result<PixelBuffer> {
    let data = fs::read(path)?;
    let format = Format::from_bytes(&data)
        .or_else(|| Format::from_path(path))
        .ok_or_else(|| Error::UnknownFormat(path.display().to_string()))?;
    let image = codec_for(format).decode(&data)?;
    Ok(image.with_source(format))
}

/// Decode and re-encode in the same (auto-detected) format at a new quality.
/// No geometric transform is applied.
pub fn optimize(data: &[u8], quality: u8) -> Result<EncodedImage> {
    validate_quality(quality)?;

    let image = decode(data)?;
    // decode always tags the source format
    let format = image.source.ok_or_else(|| {
        Error::UnknownFormat("decoded buffer is missing its source format".to_string())
    })?;

    if !format.can_encode() {
        return Err(Error::EncodingNotSupported(format));
    }

    let encoded = codec_for(format).encode(&image, &EncodeOptions { quality })?;
    Ok(EncodedImage {
        format,
        data: encoded,
    })
}

/// [`optimize`] over a file on disk. A missing path surfaces as the
/// underlying not-found I/O error.
pub fn optimize_file(path: &Path, quality: u8) -> Result<EncodedImage> {
    validate_quality(quality)?;

    let image = decode_file(path)?;
    let format = image.source.ok_or_else(|| {
        Error::UnknownFormat("decoded buffer is missing its source format".to_string())
    })?;

    if !format.can_encode() {
        return Err(Error::EncodingNotSupported(format));
    }

    let encoded = codec_for(format).encode(&image, &EncodeOptions { quality })?;
    Ok(EncodedImage {
        format,
        data: encoded,
    })
}

/// Derive an output path for a converted image.
///
/// - `None`: the input path with the new format's extension.
/// - A directory: the input's file stem inside it, with the new extension.
/// - Anything else: used as-is.
pub fn output_path(input: &Path, format: Format, output: Option<&Path>) -> PathBuf {
    let new_ext = format.extension();

    match output {
        None => input.with_extension(new_ext),
        Some(out) if out.is_dir() => {
            let stem = input.file_stem().unwrap_or_default();
            out.join(stem).with_extension(new_ext)
        }
        Some(out) => out.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_image(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::new(width, height, vec![128; width as usize * height as usize * 4]).unwrap()
    }

    #[test]
    fn quality_above_100_is_a_validation_error() {
        let result = convert(&flat_image(4, 4), &PipelineOptions::new(Format::Png, 101));
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "quality",
                ..
            })
        ));
    }

    #[test]
    fn quality_is_validated_before_transforms_run() {
        // the crop is out of range, but quality fails first
        let mut options = PipelineOptions::new(Format::Png, 200);
        options.crop = Some(CropMode::Region {
            x: 100,
            y: 0,
            width: 10,
            height: 10,
        });
        let result = convert(&flat_image(4, 4), &options);
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "quality",
                ..
            })
        ));
    }

    #[test]
    fn optimize_validates_quality() {
        assert!(matches!(
            optimize(&[0x89, 0x50], 101),
            Err(Error::Validation {
                field: "quality",
                ..
            })
        ));
    }

    #[test]
    fn decode_unknown_bytes_is_unknown_format() {
        assert!(matches!(
            decode(&[0, 0, 0, 0]),
            Err(Error::UnknownFormat(_))
        ));
    }

    #[test]
    fn output_path_swaps_extension() {
        assert_eq!(
            output_path(Path::new("/tmp/photo.jpg"), Format::WebP, None),
            PathBuf::from("/tmp/photo.webp")
        );
    }

    #[test]
    fn output_path_explicit_file_wins() {
        assert_eq!(
            output_path(
                Path::new("/tmp/photo.jpg"),
                Format::Png,
                Some(Path::new("/out/result.png"))
            ),
            PathBuf::from("/out/result.png")
        );
    }

    #[test]
    fn output_path_into_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = output_path(Path::new("/tmp/photo.jpg"), Format::Qoi, Some(dir.path()));
        assert_eq!(result, dir.path().join("photo.qoi"));
    }

    #[test]
    fn optimize_file_missing_path_is_not_found() {
        let result = optimize_file(Path::new("/nonexistent/image.png"), 80);
        match result {
            Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected not-found I/O error, got {other:?}"),
        }
    }
}
