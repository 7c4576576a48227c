//! Extend: grow the canvas around a centered image, filling new pixels.
//!
//! Extend never discards pixels — a target smaller than the source is an
//! error, and a computed canvas equal to the source returns the input data
//! byte-identical (no copy drift, no recompression artifacts).

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

/// Fill color for the padded canvas region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillColor {
    /// Fully transparent (RGBA 0,0,0,0).
    Transparent,
    /// A solid RGBA color.
    Solid([u8; 4]),
}

impl FillColor {
    /// Solid color from RGB; alpha defaults to opaque.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Solid([r, g, b, 255])
    }

    /// Build a fill from a slice of channel values: 3 entries (RGB, alpha
    /// defaults to 255) or 4 (RGBA). Any other arity is an invalid-fill
    /// validation error.
    pub fn from_channels(channels: &[u8]) -> Result<Self> {
        match *channels {
            [r, g, b] => Ok(Self::Solid([r, g, b, 255])),
            [r, g, b, a] => Ok(Self::Solid([r, g, b, a])),
            _ => Err(Error::Validation {
                field: "fill",
                message: format!("expected 3 or 4 channel values, got {}", channels.len()),
            }),
        }
    }

    /// Parse a fill from a string: `transparent`, or a hex color
    /// (`#RRGGBB`, `RRGGBB`, `#RRGGBBAA`).
    pub fn parse(value: &str) -> Result<Self> {
        if value.eq_ignore_ascii_case("transparent") {
            return Ok(Self::Transparent);
        }

        let hex = value.strip_prefix('#').unwrap_or(value);
        let invalid = || Error::Validation {
            field: "fill",
            message: format!("{value:?} is not 'transparent' or a hex color"),
        };

        if hex.len() != 6 && hex.len() != 8 {
            return Err(invalid());
        }
        let mut channels = [0u8; 4];
        channels[3] = 255;
        for (i, chunk) in hex.as_bytes().chunks_exact(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| invalid())?;
            channels[i] = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
        }
        Ok(Self::Solid(channels))
    }

    /// The fill as an RGBA quadruplet.
    pub fn as_rgba(&self) -> [u8; 4] {
        match *self {
            FillColor::Transparent => [0, 0, 0, 0],
            FillColor::Solid(c) => c,
        }
    }
}

/// How to extend (pad) an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendMode {
    /// The smallest enclosing canvas with the given ratio that contains the
    /// source without cropping (e.g. 1:1).
    AspectRatio { width: u32, height: u32 },
    /// An exact canvas size; must be at least the source size on both axes.
    Size { width: u32, height: u32 },
}

/// Compute the canvas dimensions and the offset of the original image.
///
/// Returns `(canvas_w, canvas_h, offset_x, offset_y)`.
pub fn calculate_canvas(img_w: u32, img_h: u32, mode: &ExtendMode) -> Result<(u32, u32, u32, u32)> {
    match *mode {
        ExtendMode::AspectRatio {
            width: rw,
            height: rh,
        } => {
            if rw == 0 || rh == 0 {
                return Err(Error::Extend("aspect ratio must be non-zero".to_string()));
            }

            let target_ratio = rw as f64 / rh as f64;
            let img_ratio = img_w as f64 / img_h as f64;

            let (canvas_w, canvas_h) = if img_ratio < target_ratio {
                // image narrower than target: widen
                let h = img_h;
                let w = (h as f64 * target_ratio).round() as u32;
                (w, h)
            } else {
                // image wider than or equal to target: heighten
                let w = img_w;
                let h = (w as f64 / target_ratio).round() as u32;
                (w, h)
            };

            Ok((canvas_w, canvas_h, (canvas_w - img_w) / 2, (canvas_h - img_h) / 2))
        }
        ExtendMode::Size { width, height } => {
            if width == 0 || height == 0 {
                return Err(Error::Extend(
                    "extend dimensions must be non-zero".to_string(),
                ));
            }
            if width < img_w || height < img_h {
                return Err(Error::Extend(format!(
                    "target size ({width}x{height}) is smaller than image ({img_w}x{img_h})"
                )));
            }

            Ok((width, height, (width - img_w) / 2, (height - img_h) / 2))
        }
    }
}

/// Extend an image by padding around it with the fill color.
pub fn extend(image: &PixelBuffer, mode: &ExtendMode, fill: &FillColor) -> Result<PixelBuffer> {
    let (canvas_w, canvas_h, off_x, off_y) = calculate_canvas(image.width, image.height, mode)?;

    // canvas matches the source: byte-identical no-op
    if canvas_w == image.width && canvas_h == image.height {
        return Ok(image.clone());
    }

    let bytes_per_pixel = 4usize;
    let canvas_stride = canvas_w as usize * bytes_per_pixel;
    let src_stride = image.width as usize * bytes_per_pixel;

    let fill_rgba = fill.as_rgba();
    let mut data = vec![0u8; canvas_h as usize * canvas_stride];
    for pixel in data.chunks_exact_mut(bytes_per_pixel) {
        pixel.copy_from_slice(&fill_rgba);
    }

    for row in 0..image.height as usize {
        let src_offset = row * src_stride;
        let dst_offset = (off_y as usize + row) * canvas_stride + off_x as usize * bytes_per_pixel;
        data[dst_offset..dst_offset + src_stride]
            .copy_from_slice(&image.data[src_offset..src_offset + src_stride]);
    }

    PixelBuffer::new(canvas_w, canvas_h, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_square_on_landscape() {
        let canvas = calculate_canvas(
            200,
            100,
            &ExtendMode::AspectRatio {
                width: 1,
                height: 1,
            },
        )
        .unwrap();
        assert_eq!(canvas, (200, 200, 0, 50));
    }

    #[test]
    fn aspect_square_on_portrait() {
        let canvas = calculate_canvas(
            100,
            200,
            &ExtendMode::AspectRatio {
                width: 1,
                height: 1,
            },
        )
        .unwrap();
        assert_eq!(canvas, (200, 200, 50, 0));
    }

    #[test]
    fn aspect_16_9_on_square() {
        let canvas = calculate_canvas(
            100,
            100,
            &ExtendMode::AspectRatio {
                width: 16,
                height: 9,
            },
        )
        .unwrap();
        assert_eq!(canvas, (178, 100, 39, 0));
    }

    #[test]
    fn aspect_9_16_on_square() {
        let canvas = calculate_canvas(
            100,
            100,
            &ExtendMode::AspectRatio {
                width: 9,
                height: 16,
            },
        )
        .unwrap();
        assert_eq!(canvas, (100, 178, 0, 39));
    }

    #[test]
    fn aspect_matching_image_is_identity() {
        let canvas = calculate_canvas(
            200,
            100,
            &ExtendMode::AspectRatio {
                width: 2,
                height: 1,
            },
        )
        .unwrap();
        assert_eq!(canvas, (200, 100, 0, 0));
    }

    #[test]
    fn aspect_zero_ratio_errors() {
        assert!(
            calculate_canvas(
                200,
                100,
                &ExtendMode::AspectRatio {
                    width: 0,
                    height: 1
                }
            )
            .is_err()
        );
    }

    #[test]
    fn size_centers_with_floor_offsets() {
        let canvas = calculate_canvas(
            800,
            600,
            &ExtendMode::Size {
                width: 1000,
                height: 1000,
            },
        )
        .unwrap();
        assert_eq!(canvas, (1000, 1000, 100, 200));
    }

    #[test]
    fn size_equal_to_image_is_identity() {
        let canvas = calculate_canvas(
            800,
            600,
            &ExtendMode::Size {
                width: 800,
                height: 600,
            },
        )
        .unwrap();
        assert_eq!(canvas, (800, 600, 0, 0));
    }

    #[test]
    fn size_smaller_than_image_errors() {
        // either axis below the source size fails
        for (width, height) in [(5, 5), (5, 8), (10, 7)] {
            let result = calculate_canvas(10, 8, &ExtendMode::Size { width, height });
            assert!(
                matches!(result, Err(Error::Extend(_))),
                "({width},{height}) should fail"
            );
        }
    }

    #[test]
    fn size_zero_errors() {
        assert!(
            calculate_canvas(
                800,
                600,
                &ExtendMode::Size {
                    width: 0,
                    height: 0
                }
            )
            .is_err()
        );
    }

    #[test]
    fn fill_parse_transparent() {
        assert_eq!(
            FillColor::parse("transparent").unwrap(),
            FillColor::Transparent
        );
        assert_eq!(
            FillColor::parse("TRANSPARENT").unwrap(),
            FillColor::Transparent
        );
    }

    #[test]
    fn fill_parse_hex() {
        assert_eq!(
            FillColor::parse("#FFFFFF").unwrap().as_rgba(),
            [255, 255, 255, 255]
        );
        assert_eq!(
            FillColor::parse("804020").unwrap().as_rgba(),
            [128, 64, 32, 255]
        );
        assert_eq!(
            FillColor::parse("#804020C8").unwrap().as_rgba(),
            [128, 64, 32, 200]
        );
    }

    #[test]
    fn fill_parse_invalid() {
        for bad in ["red", "#FFF", "#GGGGGG", ""] {
            assert!(
                matches!(
                    FillColor::parse(bad),
                    Err(Error::Validation { field: "fill", .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn fill_from_channels_arity() {
        assert_eq!(
            FillColor::from_channels(&[255, 0, 0]).unwrap().as_rgba(),
            [255, 0, 0, 255]
        );
        assert_eq!(
            FillColor::from_channels(&[128, 64, 32, 200])
                .unwrap()
                .as_rgba(),
            [128, 64, 32, 200]
        );
        assert!(FillColor::from_channels(&[255, 0]).is_err());
        assert!(FillColor::from_channels(&[1, 2, 3, 4, 5]).is_err());
    }

    fn flat_image(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::new(width, height, vec![128; width as usize * height as usize * 4]).unwrap()
    }

    #[test]
    fn extend_pads_with_solid_color() {
        let extended = extend(
            &flat_image(2, 2),
            &ExtendMode::Size {
                width: 4,
                height: 4,
            },
            &FillColor::from_rgb(255, 0, 0),
        )
        .unwrap();
        assert_eq!(&extended.data[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn extend_pads_with_transparent() {
        let extended = extend(
            &flat_image(2, 2),
            &ExtendMode::Size {
                width: 4,
                height: 4,
            },
            &FillColor::Transparent,
        )
        .unwrap();
        assert_eq!(&extended.data[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn extend_preserves_source_pixels_at_offset() {
        // 2x1 image with two distinct pixels, centered in 4x3 at (1, 1)
        let image = PixelBuffer::new(2, 1, vec![10, 20, 30, 255, 40, 50, 60, 255]).unwrap();
        let extended = extend(
            &image,
            &ExtendMode::Size {
                width: 4,
                height: 3,
            },
            &FillColor::Transparent,
        )
        .unwrap();

        let stride = 4 * 4;
        let first = stride + 4;
        assert_eq!(&extended.data[first..first + 4], &[10, 20, 30, 255]);
        assert_eq!(&extended.data[first + 4..first + 8], &[40, 50, 60, 255]);
    }

    #[test]
    fn extend_noop_returns_identical_data() {
        let image = flat_image(10, 10);
        let extended = extend(
            &image,
            &ExtendMode::AspectRatio {
                width: 1,
                height: 1,
            },
            &FillColor::from_rgb(255, 255, 255),
        )
        .unwrap();
        assert_eq!(extended.width, 10);
        assert_eq!(extended.height, 10);
        assert_eq!(extended.data, image.data);
    }
}
