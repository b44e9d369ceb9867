//! Minimal conversion backend.
//!
//! Decodes with the JPEG or PNG decoder chosen by the caller's MIME type,
//! downscales with a basic triangle filter and hands the pixels straight to
//! libwebp. No format sniffing, no high-order resampling.
//!
//! ## Transparency
//!
//! PNG sources are expanded to RGBA (palettes become truecolour). When a
//! resize is needed the resampled pixels are *copied* onto a canvas that was
//! pre-filled with fully transparent pixels, never blended. Blending onto a
//! freshly allocated canvas would composite over its zeroed RGB and turn every
//! transparent area black.

use super::backend::{BackendError, ConversionBackend, Dimensions, decode_limits, write_webp};
use super::calculations::{WEBP_MAX_DIMENSION, calculate_resize_dimensions, fits_webp_limits};
use super::params::ConversionParams;
use image::imageops::{self, FilterType};
use image::{ImageFormat, ImageReader, Rgba, RgbImage, RgbaImage};
use std::fs::File;
use std::io::BufReader;

/// Fallback backend: MIME-selected decoder, triangle resize, libwebp.
pub struct DirectBackend;

impl DirectBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DirectBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoded pixels in the layout they will be encoded from.
enum Pixels {
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl Pixels {
    fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Rgb(img) => img.dimensions(),
            Self::Rgba(img) => img.dimensions(),
        }
    }
}

/// Decode with the decoder `params.format` names, under the shared limits.
fn decode(params: &ConversionParams) -> Result<Pixels, BackendError> {
    let file = BufReader::new(File::open(&params.source)?);
    let mut reader = ImageReader::with_format(file, params.format.image_format());
    reader.limits(decode_limits());
    let img = reader.decode().map_err(|e| {
        BackendError::Decode(format!("{} as {}: {}", params.source.display(), params.format, e))
    })?;

    Ok(if params.format.may_have_alpha() {
        Pixels::Rgba(img.into_rgba8())
    } else {
        Pixels::Rgb(img.into_rgb8())
    })
}

/// Resample `src` to `width`x`height` onto a fully transparent canvas.
///
/// The copy uses `replace`, which overwrites destination pixels including
/// their alpha; `overlay` would blend.
pub(crate) fn resize_onto_transparent_canvas(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let resampled = imageops::resize(src, width, height, FilterType::Triangle);
    imageops::replace(&mut canvas, &resampled, 0, 0);
    canvas
}

fn resize(pixels: Pixels, width: u32, height: u32) -> Pixels {
    match pixels {
        Pixels::Rgb(img) => Pixels::Rgb(imageops::resize(&img, width, height, FilterType::Triangle)),
        Pixels::Rgba(img) => Pixels::Rgba(resize_onto_transparent_canvas(&img, width, height)),
    }
}

impl ConversionBackend for DirectBackend {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn is_available(&self) -> bool {
        ImageFormat::Jpeg.reading_enabled() && ImageFormat::Png.reading_enabled()
    }

    fn convert(&self, params: &ConversionParams) -> Result<Dimensions, BackendError> {
        let pixels = decode(params)?;
        let pixels = match calculate_resize_dimensions(pixels.dimensions(), params.max_width) {
            Some((width, height)) => resize(pixels, width, height),
            None => pixels,
        };

        let (width, height) = pixels.dimensions();
        if !fits_webp_limits((width, height)) {
            return Err(BackendError::ProcessingFailed(format!(
                "{width}x{height} exceeds the WebP limit of {WEBP_MAX_DIMENSION}px"
            )));
        }

        let encoder = match &pixels {
            Pixels::Rgb(img) => webp::Encoder::from_rgb(img.as_raw(), width, height),
            Pixels::Rgba(img) => webp::Encoder::from_rgba(img.as_raw(), width, height),
        };
        write_webp(encoder, params)?;

        Ok(Dimensions { width, height })
    }
}
