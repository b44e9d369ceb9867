//! Shared test fixtures: small synthetic images written with the `image`
//! encoders, so no binary fixtures need to live in the repository.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let jpeg = tmp.path().join("photo.jpg");
//! create_test_jpeg(&jpeg, 3000, 2000);
//! ```

use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

/// Write an opaque gradient JPEG with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write an RGBA PNG whose left half is fully transparent and whose right
/// half is opaque red.
pub fn create_test_png_with_transparent_half(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([255, 0, 0, 255])
        }
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Write a fully transparent RGBA PNG. Blank rows compress to almost
/// nothing, so large dimensions stay cheap on disk.
pub fn create_blank_png(path: &Path, width: u32, height: u32) {
    RgbaImage::new(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}
