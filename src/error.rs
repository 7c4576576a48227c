//! Error type shared by every stage of the engine.
//!
//! Validation happens eagerly: a [`Error::Validation`] or transform error is
//! returned before any decoding or pixel work, so a failed call never leaves
//! partially-applied transforms behind. Decode and I/O errors surface from
//! the codec or filesystem boundary unchanged — the operations are local and
//! deterministic, so there is nothing to retry.

use crate::format::Format;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller-supplied parameter failed validation. `field` names the
    /// offending parameter (e.g. `quality`, `fill`, `data`).
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("unknown format: {0}")]
    UnknownFormat(String),

    #[error("encoding not supported for {0:?}")]
    EncodingNotSupported(Format),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("crop error: {0}")]
    Crop(String),

    #[error("resize error: {0}")]
    Resize(String),

    #[error("extend error: {0}")]
    Extend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
