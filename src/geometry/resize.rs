//! Resize with Lanczos3 resampling over premultiplied alpha.
//!
//! Target dimensions are always computed here (f64 ratio, `round()`), then
//! handed to `resize_exact`, so the documented dimension math is what the
//! caller gets regardless of the filter's own rounding. Samples are
//! premultiplied before filtering and un-premultiplied after, which keeps
//! fully transparent pixels from bleeding color into opaque neighbors.

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

/// How to resize an image. Exactly one sizing mode per operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ResizeMode {
    /// Set width, derive height preserving aspect ratio.
    Width(u32),
    /// Set height, derive width preserving aspect ratio.
    Height(u32),
    /// Exact dimensions, ignoring aspect ratio.
    Exact(u32, u32),
    /// Largest size with both dimensions within the bounds, preserving
    /// aspect ratio. Never upscales.
    Fit(u32, u32),
    /// Multiply both dimensions by a factor (e.g. 0.5 = half size).
    Scale(f64),
}

/// Compute the target dimensions for a resize operation.
pub fn calculate_dimensions(orig_w: u32, orig_h: u32, mode: &ResizeMode) -> Result<(u32, u32)> {
    let (w, h) = match *mode {
        ResizeMode::Width(target_w) => {
            let ratio = target_w as f64 / orig_w as f64;
            (target_w, (orig_h as f64 * ratio).round() as u32)
        }
        ResizeMode::Height(target_h) => {
            let ratio = target_h as f64 / orig_h as f64;
            ((orig_w as f64 * ratio).round() as u32, target_h)
        }
        ResizeMode::Exact(w, h) => (w, h),
        ResizeMode::Fit(max_w, max_h) => {
            let ratio_w = max_w as f64 / orig_w as f64;
            let ratio_h = max_h as f64 / orig_h as f64;
            // fit never upscales
            let ratio = ratio_w.min(ratio_h).min(1.0);
            (
                (orig_w as f64 * ratio).round() as u32,
                (orig_h as f64 * ratio).round() as u32,
            )
        }
        ResizeMode::Scale(factor) => {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(Error::Resize(format!(
                    "scale factor must be positive, got {factor}"
                )));
            }
            (
                (orig_w as f64 * factor).round().max(1.0) as u32,
                (orig_h as f64 * factor).round().max(1.0) as u32,
            )
        }
    };

    if w == 0 || h == 0 {
        return Err(Error::Resize(format!(
            "calculated dimensions are zero: {w}x{h}"
        )));
    }

    Ok((w, h))
}

/// Resize an image according to the given mode.
pub fn resize(image: &PixelBuffer, mode: &ResizeMode) -> Result<PixelBuffer> {
    let (target_w, target_h) = calculate_dimensions(image.width, image.height, mode)?;

    if target_w == image.width && target_h == image.height {
        return Ok(image.clone());
    }

    let mut samples = image.data.clone();
    premultiply(&mut samples);

    let rgba = RgbaImage::from_raw(image.width, image.height, samples).ok_or_else(|| {
        Error::Resize(format!(
            "failed to build {}x{} sample buffer",
            image.width, image.height
        ))
    })?;

    let resized =
        DynamicImage::ImageRgba8(rgba).resize_exact(target_w, target_h, FilterType::Lanczos3);

    let mut output = resized.into_rgba8().into_raw();
    unpremultiply(&mut output);

    PixelBuffer::new(target_w, target_h, output)
}

fn premultiply(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
}

fn unpremultiply(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
