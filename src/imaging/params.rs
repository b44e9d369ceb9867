//! Parameter types for conversion operations.
//!
//! These structs describe *what* to convert, not *how*. They are the
//! interface between the [`converter`](crate::converter) (which validates the
//! request and derives paths) and a [`backend`](super::backend) (which does
//! the pixel work). Keeping them separate lets tests swap in a mock backend
//! without touching orchestration logic.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy WebP quality (1–100, default 85). Clamped on construction.
//! - [`MaxWidth`] — Width bound for downscaling (0–10000, 0 = no resize). Clamped on construction.
//! - [`SourceFormat`] — The two accepted source formats, parsed from a MIME string.
//! - [`ConversionParams`] — Everything a backend needs for one file.

use image::ImageFormat;
use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy WebP encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 100;

    pub fn new(value: i64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Quality as the `f32` factor libwebp expects.
    pub fn as_factor(self) -> f32 {
        self.0 as f32
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Upper bound on output width in pixels. Zero disables resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaxWidth(u32);

impl MaxWidth {
    pub const LIMIT: i64 = 10_000;

    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, Self::LIMIT) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_disabled(self) -> bool {
        self.0 == 0
    }
}

/// Source formats the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
}

impl SourceFormat {
    /// Parse an exact MIME string. Anything but `image/jpeg` and `image/png`
    /// is not convertible.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// The `image` format whose decoder reads this source.
    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }

    /// PNG sources may carry transparency that resizing must keep.
    pub fn may_have_alpha(self) -> bool {
        matches!(self, Self::Png)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Parameters for converting one file.
///
/// `output` is where the backend writes its bytes. The converter points it at
/// a staging file and moves the result into place after verification.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub format: SourceFormat,
    pub max_width: MaxWidth,
    pub quality: Quality,
}
