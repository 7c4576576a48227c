//! AVIF adapter.
//!
//! Encoding uses the `image` crate's `AvifEncoder` (rav1e, speed 6). The
//! `image` crate's `"avif"` feature only enables that encoder — decoding
//! would need `"avif-native"` and the C library dav1d. Decoding here instead
//! goes through `avif-parse` (container) and `rav1d` (pure Rust port of
//! dav1d): the primary item is decoded to RGB via BT.601, and the alpha
//! auxiliary item, when present, is decoded with a second AV1 pass and
//! merged into the alpha channel.

use std::io::Cursor;
use std::ptr::NonNull;

use image::ImageEncoder;
use image::codecs::avif::AvifEncoder;

use super::{Codec, EncodeOptions};
use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};
use crate::format::Format;

pub struct AvifCodec;

impl Codec for AvifCodec {
    fn format(&self) -> Format {
        Format::Avif
    }

    fn decode(&self, data: &[u8]) -> Result<PixelBuffer> {
        let avif = avif_parse::read_avif(&mut Cursor::new(data))
            .map_err(|e| Error::Decode(format!("avif container: {e:?}")))?;

        let color = decode_av1(&avif.primary_item)?;

        let alpha = match avif.alpha_item.as_deref() {
            Some(item) => {
                let plane = decode_av1(item)?;
                if plane.width != color.width || plane.height != color.height {
                    return Err(Error::Decode(format!(
                        "avif alpha plane is {}x{}, color is {}x{}",
                        plane.width, plane.height, color.width, color.height
                    )));
                }
                // Monochrome decode replicates the sample across R, G, B.
                Some(plane.rgb.iter().step_by(3).copied().collect::<Vec<u8>>())
            }
            None => None,
        };

        let pixels = color.width as usize * color.height as usize;
        let mut rgba = Vec::with_capacity(pixels * 4);
        for i in 0..pixels {
            rgba.extend_from_slice(&color.rgb[i * 3..i * 3 + 3]);
            rgba.push(alpha.as_ref().map_or(255, |a| a[i]));
        }

        if avif.premultiplied_alpha {
            unpremultiply(&mut rgba);
        }

        PixelBuffer::new(color.width, color.height, rgba)
    }

    fn encode(&self, image: &PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        AvifEncoder::new_with_speed_quality(&mut out, 6, options.quality)
            .write_image(
                &image.data,
                image.width,
                image.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| Error::Encode(format!("avif encode: {e}")))?;

        Ok(out.into_inner())
    }
}

fn unpremultiply(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// One decoded AV1 frame, converted to interleaved RGB8.
struct DecodedFrame {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

/// Decode a raw AV1 payload (a single still frame) with rav1d.
fn decode_av1(av1: &[u8]) -> Result<DecodedFrame> {
    use rav1d::include::dav1d::data::Dav1dData;
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::include::dav1d::headers::{
        DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
        DAV1D_PIXEL_LAYOUT_I444,
    };
    use rav1d::include::dav1d::picture::Dav1dPicture;

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    unsafe {
        rav1d::src::lib::dav1d_default_settings(NonNull::new(settings.as_mut_ptr()).unwrap())
    };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc =
        unsafe { rav1d::src::lib::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(Error::Decode(format!("rav1d open failed ({})", rc.0)));
    }

    let mut data = Dav1dData::default();
    let buf_ptr = unsafe { rav1d::src::lib::dav1d_data_create(NonNull::new(&mut data), av1.len()) };
    if buf_ptr.is_null() {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(Error::Decode("rav1d data_create failed".into()));
    }
    unsafe { std::ptr::copy_nonoverlapping(av1.as_ptr(), buf_ptr, av1.len()) };

    let rc = unsafe { rav1d::src::lib::dav1d_send_data(ctx, NonNull::new(&mut data)) };
    if rc.0 != 0 {
        unsafe {
            rav1d::src::lib::dav1d_data_unref(NonNull::new(&mut data));
            rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
        }
        return Err(Error::Decode(format!("rav1d send_data failed ({})", rc.0)));
    }

    let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
    let rc = unsafe { rav1d::src::lib::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
    if rc.0 != 0 {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(Error::Decode(format!("rav1d get_picture failed ({})", rc.0)));
    }

    let width = pic.p.w as u32;
    let height = pic.p.h as u32;
    let bpc = pic.p.bpc as u32;
    let layout = pic.p.layout;
    let y_stride = pic.stride[0];
    let uv_stride = pic.stride[1];
    let y_ptr = pic.data[0].unwrap().as_ptr() as *const u8;

    let rgb = if layout == DAV1D_PIXEL_LAYOUT_I400 {
        YuvView {
            y_ptr,
            u_ptr: y_ptr,
            v_ptr: y_ptr,
            y_stride,
            uv_stride: 0,
            width,
            height,
            bpc,
            ss_x: false,
            ss_y: false,
            monochrome: true,
        }
        .to_rgb()
    } else {
        let u_ptr = pic.data[1].unwrap().as_ptr() as *const u8;
        let v_ptr = pic.data[2].unwrap().as_ptr() as *const u8;
        let (ss_x, ss_y) = match layout {
            DAV1D_PIXEL_LAYOUT_I420 => (true, true),
            DAV1D_PIXEL_LAYOUT_I422 => (true, false),
            DAV1D_PIXEL_LAYOUT_I444 => (false, false),
            _ => {
                unsafe {
                    rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic));
                    rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
                }
                return Err(Error::Decode(format!(
                    "unsupported AVIF pixel layout: {layout}"
                )));
            }
        };
        YuvView {
            y_ptr,
            u_ptr,
            v_ptr,
            y_stride,
            uv_stride,
            width,
            height,
            bpc,
            ss_x,
            ss_y,
            monochrome: false,
        }
        .to_rgb()
    };

    unsafe {
        rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic));
        rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
    }

    Ok(DecodedFrame { width, height, rgb })
}

/// Borrowed YUV plane pointers from a rav1d picture, ready for conversion.
struct YuvView {
    y_ptr: *const u8,
    u_ptr: *const u8,
    v_ptr: *const u8,
    y_stride: isize,
    uv_stride: isize,
    width: u32,
    height: u32,
    bpc: u32,
    /// Chroma subsampling: horizontal, vertical (I420 = true, true).
    ss_x: bool,
    ss_y: bool,
    monochrome: bool,
}

impl YuvView {
    /// Convert to interleaved RGB8 using BT.601 coefficients, scaling
    /// 10/12-bit samples down to 8 bits.
    fn to_rgb(&self) -> Vec<u8> {
        let max_val = ((1u32 << self.bpc) - 1) as f32;
        let center = (1u32 << (self.bpc - 1)) as f32;
        let scale = 255.0 / max_val;

        let mut rgb = vec![0u8; self.width as usize * self.height as usize * 3];

        for row in 0..self.height {
            for col in 0..self.width {
                let y_val = read_sample(self.y_ptr, self.y_stride, col, row, self.bpc);

                let (r, g, b) = if self.monochrome {
                    let v = (y_val * scale).clamp(0.0, 255.0);
                    (v, v, v)
                } else {
                    let u_col = if self.ss_x { col / 2 } else { col };
                    let u_row = if self.ss_y { row / 2 } else { row };
                    let cb = read_sample(self.u_ptr, self.uv_stride, u_col, u_row, self.bpc)
                        - center;
                    let cr = read_sample(self.v_ptr, self.uv_stride, u_col, u_row, self.bpc)
                        - center;

                    (
                        ((y_val + 1.402 * cr) * scale).clamp(0.0, 255.0),
                        ((y_val - 0.344136 * cb - 0.714136 * cr) * scale).clamp(0.0, 255.0),
                        ((y_val + 1.772 * cb) * scale).clamp(0.0, 255.0),
                    )
                };

                let idx = ((row * self.width + col) * 3) as usize;
                rgb[idx] = r as u8;
                rgb[idx + 1] = g as u8;
                rgb[idx + 2] = b as u8;
            }
        }

        rgb
    }
}

/// Read one sample from a plane, handling 8-bit and 16-bit storage.
#[inline]
fn read_sample(ptr: *const u8, stride: isize, x: u32, y: u32, bpc: u32) -> f32 {
    if bpc <= 8 {
        (unsafe { *ptr.offset(y as isize * stride + x as isize) }) as f32
    } else {
        // 10-bit and 12-bit samples are stored as u16
        let byte_offset = y as isize * stride + x as isize * 2;
        (unsafe { *(ptr.offset(byte_offset) as *const u16) }) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::gradient_image;

    #[test]
    fn encode_produces_ftyp_container() {
        let codec = AvifCodec;
        let image = gradient_image(64, 48);

        let encoded = codec
            .encode(&image, &EncodeOptions { quality: 80 })
            .expect("encode failed");
        assert!(encoded.len() >= 12);
        assert_eq!(&encoded[4..8], b"ftyp", "missing ftyp box");
    }

    #[test]
    fn roundtrip_preserves_dimensions() {
        let codec = AvifCodec;
        let original = gradient_image(64, 48);

        let encoded = codec
            .encode(&original, &EncodeOptions { quality: 80 })
            .expect("encode failed");
        let decoded = codec.decode(&encoded).expect("decode failed");

        assert_eq!(decoded.width, original.width);
        assert_eq!(decoded.height, original.height);
        assert_eq!(decoded.data.len(), original.data.len());
    }

    #[test]
    fn roundtrip_preserves_alpha_channel() {
        let codec = AvifCodec;

        // horizontal alpha ramp over a constant color
        let (width, height) = (64u32, 8u32);
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _row in 0..height {
            for col in 0..width {
                data.extend_from_slice(&[200, 40, 90]);
                data.push((col * 255 / (width - 1)) as u8);
            }
        }
        let original = PixelBuffer::new(width, height, data).unwrap();

        let encoded = codec
            .encode(&original, &EncodeOptions { quality: 90 })
            .expect("encode failed");
        let decoded = codec.decode(&encoded).expect("decode failed");
        assert_eq!(decoded.width, original.width);
        assert_eq!(decoded.height, original.height);

        // the alpha plane is lossy too; each sample must track the ramp
        for (i, (orig, got)) in original
            .data
            .iter()
            .skip(3)
            .step_by(4)
            .zip(decoded.data.iter().skip(3).step_by(4))
            .enumerate()
        {
            let diff = (*orig as i16 - *got as i16).abs();
            assert!(diff <= 40, "alpha at pixel {i}: expected ~{orig}, got {got}");
        }
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(AvifCodec.decode(b"definitely not avif").is_err());
    }
}
