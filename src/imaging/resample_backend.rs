//! Full-featured conversion backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode | `image::ImageReader` with content-sniffed format |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → WebP | `webp::Encoder` (libwebp, lossy) |
//!
//! The decoder trusts the file's bytes rather than the caller's MIME string,
//! so a PNG uploaded as `image/jpeg` still converts correctly. Resampling runs
//! on the decoded colour type, keeping the alpha channel of RGBA and LA
//! sources intact.

use super::backend::{BackendError, ConversionBackend, Dimensions, decode_limits, write_webp};
use super::calculations::{WEBP_MAX_DIMENSION, calculate_resize_dimensions, fits_webp_limits};
use super::params::ConversionParams;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use tracing::debug;

/// Preferred backend: sniffing decoder, Lanczos3, libwebp.
pub struct ResampleBackend;

impl ResampleBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResampleBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image, detecting its format from content.
fn load_image(params: &ConversionParams) -> Result<DynamicImage, BackendError> {
    let mut reader = ImageReader::open(&params.source)?.with_guessed_format()?;
    reader.limits(decode_limits());
    reader.decode().map_err(|e| {
        BackendError::Decode(format!("{}: {}", params.source.display(), e))
    })
}

/// Reduce any decoded colour type to the 8-bit RGB/RGBA layouts libwebp takes.
fn to_webp_layout(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => img,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.into_rgba8()),
        other => DynamicImage::ImageRgb8(other.into_rgb8()),
    }
}

impl ConversionBackend for ResampleBackend {
    fn name(&self) -> &'static str {
        "resample"
    }

    fn is_available(&self) -> bool {
        ImageFormat::Jpeg.reading_enabled() && ImageFormat::Png.reading_enabled()
    }

    fn convert(&self, params: &ConversionParams) -> Result<Dimensions, BackendError> {
        let img = to_webp_layout(load_image(params)?);

        let img = match calculate_resize_dimensions(img.dimensions(), params.max_width) {
            Some((width, height)) => {
                debug!(
                    source = %params.source.display(),
                    from_width = img.width(),
                    to_width = width,
                    to_height = height,
                    "resizing"
                );
                img.resize_exact(width, height, FilterType::Lanczos3)
            }
            None => img,
        };

        if !fits_webp_limits(img.dimensions()) {
            return Err(BackendError::ProcessingFailed(format!(
                "{}x{} exceeds the WebP limit of {WEBP_MAX_DIMENSION}px",
                img.width(),
                img.height()
            )));
        }

        let encoder =
            webp::Encoder::from_image(&img).map_err(|e| BackendError::Encode(e.to_string()))?;
        write_webp(encoder, params)?;

        Ok(img.dimensions().into())
    }
}
