//! The conversion policy handed to every conversion call.
//!
//! A [`ConversionPolicy`] is built once at the boundary (from the settings
//! file, CLI flags, or a host integration) and passed explicitly into
//! [`ImageConverter::convert`](crate::converter::ImageConverter::convert).
//! Numeric inputs are clamped on construction and never rejected, so a policy
//! value is always valid.

use crate::imaging::{MaxWidth, Quality};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionPolicy {
    enabled: bool,
    replace_original: bool,
    quality: Quality,
    max_width: MaxWidth,
}

impl ConversionPolicy {
    /// Build a policy, clamping quality to 1–100 and max width to 0–10000.
    pub fn new(enabled: bool, replace_original: bool, quality: i64, max_width: i64) -> Self {
        Self {
            enabled,
            replace_original,
            quality: Quality::new(quality),
            max_width: MaxWidth::new(max_width),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn replace_original(&self) -> bool {
        self.replace_original
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn max_width(&self) -> MaxWidth {
        self.max_width
    }

    /// Same policy with conversion switched off.
    pub fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }
}

impl Default for ConversionPolicy {
    /// Enabled, keep originals, quality 85, at most 1920px wide.
    fn default() -> Self {
        Self::new(true, false, 85, 1920)
    }
}
