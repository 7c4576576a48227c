//! # Repix
//!
//! A pure-Rust image conversion engine: decode any supported format into a
//! canonical RGBA8 buffer, apply geometric transforms, and re-encode at a
//! chosen quality.
//!
//! # Architecture: Decode → Transform → Encode
//!
//! Every operation flows through the same three stages:
//!
//! ```text
//! 1. Decode     bytes        →  PixelBuffer   (format-specific → canonical RGBA8)
//! 2. Transform  PixelBuffer  →  PixelBuffer   (crop, resize, extend — in that order)
//! 3. Encode     PixelBuffer  →  bytes         (canonical RGBA8 → target format)
//! ```
//!
//! The canonical buffer is always 8-bit RGBA, which keeps every transform
//! format-agnostic: crop, resize, and extend never know or care what format
//! the pixels came from or where they are headed. The cost is that >8-bit
//! sources are reduced on decode; see [`buffer`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`format`] | The closed set of supported formats, name/extension/magic-byte resolution |
//! | [`buffer`] | [`PixelBuffer`] — the canonical RGBA8 image all stages operate on |
//! | [`codec`] | Per-format decode/encode behind the [`Codec`] trait |
//! | [`geometry`] | Pure dimension math plus the crop/resize/extend transforms |
//! | [`pipeline`] | Orchestration: [`convert`], [`optimize`], file I/O, output paths |
//! | [`error`] | The crate-wide [`Error`] type |
//!
//! # Design Decisions
//!
//! ## Pure-Rust Codecs Where They Exist
//!
//! JPEG, PNG, WebP decoding, and QOI all run on pure-Rust crates (`image`,
//! `oxipng`, `rapid-qoi`); AV1 decoding uses `rav1d`, a Rust port of dav1d.
//! Only WebP encoding (libwebp) and JPEG XL (libjxl, built from vendored
//! source) bind to C — there is no mature Rust encoder for either.
//!
//! ## Calculation/Application Split
//!
//! Each geometric transform separates its dimension math (a pure function on
//! integers, exhaustively unit-tested) from the pixel work that applies it.
//! Cropping a 4K image and cropping a 10×8 test fixture exercise the exact
//! same arithmetic.
//!
//! ## Fixed Transform Order
//!
//! [`convert`] always applies crop, then resize, then extend. A caller who
//! wants a different order chains the transform functions directly; the
//! pipeline stays predictable for the common "crop to ratio, shrink, pad"
//! flow.

pub mod buffer;
pub mod codec;
pub mod error;
pub mod format;
pub mod geometry;
pub mod pipeline;

pub use buffer::PixelBuffer;
pub use codec::{Codec, EncodeOptions, codec_for};
pub use error::{Error, Result};
pub use format::Format;
pub use geometry::{CropMode, ExtendMode, FillColor, ResizeMode, crop, extend, resize};
pub use pipeline::{
    EncodedImage, PipelineOptions, convert, decode, decode_file, optimize, optimize_file,
    output_path,
};
