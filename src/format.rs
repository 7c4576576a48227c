//! Container format identification.
//!
//! [`Format`] is a closed enumeration: the supported set is small and fixed,
//! so dispatch is an exhaustive match rather than open-ended registration,
//! and [`Format::from_path`] / [`Format::from_bytes`] stay total functions.
//!
//! Byte signatures follow the real-world magic numbers other tools sniff:
//! PNG's 8-byte signature, JPEG `FF D8 FF`, WebP's `RIFF????WEBP`, the
//! `ftyp` box brand for AVIF, both JXL framings, and QOI's `qoif`.

use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Jpeg,
    Png,
    WebP,
    Avif,
    Jxl,
    Qoi,
}

/// Extension / name table, lowercase. First entry per format is canonical.
const NAME_TABLE: &[(&str, Format)] = &[
    ("jpg", Format::Jpeg),
    ("jpeg", Format::Jpeg),
    ("png", Format::Png),
    ("webp", Format::WebP),
    ("avif", Format::Avif),
    ("jxl", Format::Jxl),
    ("qoi", Format::Qoi),
];

impl Format {
    /// Detect the format from a file-name extension (case-insensitive).
    /// Never touches file contents.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        NAME_TABLE
            .iter()
            .find(|(name, _)| *name == ext)
            .map(|&(_, format)| format)
    }

    /// Detect the format from the leading bytes of encoded data.
    ///
    /// Each signature is checked with its own length guard; a prefix shorter
    /// than a signature is a no-match, not an error.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF] {
            return Some(Self::Jpeg);
        }
        if data.len() >= 8 && data[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            return Some(Self::Png);
        }
        if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }
        if data.len() >= 12 && &data[4..8] == b"ftyp" {
            let brand = &data[8..12];
            if brand.starts_with(b"avif") || brand.starts_with(b"avis") {
                return Some(Self::Avif);
            }
        }
        // JXL bare codestream
        if data.len() >= 2 && data[..2] == [0xFF, 0x0A] {
            return Some(Self::Jxl);
        }
        // JXL container: 12-byte signature box
        if data.len() >= 8 && data[..4] == [0x00, 0x00, 0x00, 0x0C] && &data[4..8] == b"JXL " {
            return Some(Self::Jxl);
        }
        if data.len() >= 4 && &data[..4] == b"qoif" {
            return Some(Self::Qoi);
        }
        None
    }

    /// Resolve a format from a name string (case-insensitive, `jpg`/`jpeg`
    /// both accepted). Unrecognized names are an [`Error::UnknownFormat`].
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        NAME_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == lower)
            .map(|&(_, format)| format)
            .ok_or_else(|| Error::UnknownFormat(name.to_string()))
    }

    /// Canonical lowercase file extension (`jpg` for JPEG).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Avif => "avif",
            Self::Jxl => "jxl",
            Self::Qoi => "qoi",
        }
    }

    /// Whether this format has an encoder.
    ///
    /// Currently true for the whole set; the flag stays so a future
    /// decode-only format can be added without changing the pipeline.
    pub fn can_encode(self) -> bool {
        match self {
            Self::Jpeg | Self::Png | Self::WebP | Self::Avif | Self::Jxl | Self::Qoi => true,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}
