//! Crop: extract a sub-rectangle, by explicit region or centered aspect ratio.

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

/// How to crop an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CropMode {
    /// Extract a specific region: `x`, `y` offset plus width × height.
    Region {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// The largest centered rectangle with the given ratio that fits inside
    /// the source (e.g. 16:9).
    AspectRatio { width: u32, height: u32 },
}

/// Compute the crop rectangle `(x, y, width, height)` for an image size.
pub fn calculate_crop_region(
    img_w: u32,
    img_h: u32,
    mode: &CropMode,
) -> Result<(u32, u32, u32, u32)> {
    match *mode {
        CropMode::Region {
            x,
            y,
            width,
            height,
        } => {
            if width == 0 || height == 0 {
                return Err(Error::Crop("crop dimensions must be non-zero".to_string()));
            }
            let right = x.checked_add(width);
            let bottom = y.checked_add(height);
            if right.is_none_or(|r| r > img_w) || bottom.is_none_or(|b| b > img_h) {
                return Err(Error::Crop(format!(
                    "region ({x},{y},{width},{height}) exceeds image bounds ({img_w}x{img_h})"
                )));
            }
            Ok((x, y, width, height))
        }
        CropMode::AspectRatio {
            width: rw,
            height: rh,
        } => {
            if rw == 0 || rh == 0 {
                return Err(Error::Crop("aspect ratio must be non-zero".to_string()));
            }
            let target_ratio = rw as f64 / rh as f64;
            let img_ratio = img_w as f64 / img_h as f64;

            // Pin the limiting axis, derive the other with round().
            let (crop_w, crop_h) = if img_ratio > target_ratio {
                let h = img_h;
                let w = (h as f64 * target_ratio).round() as u32;
                (w, h)
            } else {
                let w = img_w;
                let h = (w as f64 / target_ratio).round() as u32;
                (w, h)
            };

            // Floor division keeps the crop centered with symmetric truncation.
            let x = (img_w - crop_w) / 2;
            let y = (img_h - crop_h) / 2;

            Ok((x, y, crop_w, crop_h))
        }
    }
}

/// Crop an image according to the given mode.
pub fn crop(image: &PixelBuffer, mode: &CropMode) -> Result<PixelBuffer> {
    let (x, y, width, height) = calculate_crop_region(image.width, image.height, mode)?;

    if (x, y, width, height) == (0, 0, image.width, image.height) {
        return Ok(image.clone());
    }

    let bytes_per_pixel = 4usize;
    let src_stride = image.width as usize * bytes_per_pixel;
    let row_len = width as usize * bytes_per_pixel;

    let mut data = Vec::with_capacity(height as usize * row_len);
    for row in 0..height as usize {
        let start = (y as usize + row) * src_stride + x as usize * bytes_per_pixel;
        data.extend_from_slice(&image.data[start..start + row_len]);
    }

    PixelBuffer::new(width, height, data)
}
