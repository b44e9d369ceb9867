//! End-to-end conversions through the public API with real encoders.
//!
//! Every scenario runs against both shipped backends: the stock converter
//! (which selects the resample backend) and a converter limited to the
//! direct backend, as when the preferred one is missing.

use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use webp_upload::converter::{ConversionResult, ImageConverter, NotConvertedReason};
use webp_upload::imaging::backend::MAX_SOURCE_DIMENSION;
use webp_upload::imaging::{ConversionBackend, DirectBackend, ResampleBackend};
use webp_upload::policy::ConversionPolicy;

fn create_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let file = std::fs::File::create(path).unwrap();
    image::codecs::jpeg::JpegEncoder::new_with_quality(std::io::BufWriter::new(file), 90)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Left half fully transparent, right half opaque green.
fn create_png_with_transparent_half(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([0, 200, 0, 255])
        }
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

fn converters() -> Vec<(&'static str, ImageConverter)> {
    vec![
        ("stock", ImageConverter::new()),
        (
            "direct-only",
            ImageConverter::with_backends(vec![Box::new(DirectBackend::new())]),
        ),
    ]
}

fn converted_path(result: ConversionResult, label: &str) -> PathBuf {
    match result {
        ConversionResult::Converted { new_path } => new_path,
        ConversionResult::NotConverted => panic!("{label}: expected a conversion"),
    }
}

#[test]
fn large_jpeg_is_resized_to_max_width() {
    for (label, converter) in converters() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("holiday.jpg");
        create_jpeg(&source, 3000, 2000);

        let policy = ConversionPolicy::new(true, false, 85, 1920);
        let output = converted_path(converter.convert(&source, "image/jpeg", &policy), label);

        assert_eq!(output, tmp.path().join("holiday.webp"), "{label}");
        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1920, 1280), "{label}");
        assert_eq!(
            image::ImageFormat::from_path(&output).unwrap(),
            image::ImageFormat::WebP
        );
        assert!(source.exists(), "{label}: source must be kept");
    }
}

#[test]
fn narrow_image_keeps_its_dimensions() {
    for (label, converter) in converters() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("small.jpeg");
        create_jpeg(&source, 640, 427);

        for max_width in [0, 640, 1920] {
            let policy = ConversionPolicy::new(true, false, 85, max_width);
            let output = converted_path(converter.convert(&source, "image/jpeg", &policy), label);
            assert_eq!(
                image::image_dimensions(&output).unwrap(),
                (640, 427),
                "{label}, max_width {max_width}"
            );
        }
    }
}

#[test]
fn resize_preserves_aspect_ratio() {
    for (label, converter) in converters() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("odd.jpg");
        create_jpeg(&source, 1001, 667);

        let policy = ConversionPolicy::new(true, false, 85, 500);
        let output = converted_path(converter.convert(&source, "image/jpeg", &policy), label);

        let (w, h) = image::image_dimensions(&output).unwrap();
        let expected = 667.0 * 500.0 / 1001.0;
        assert_eq!(w, 500, "{label}");
        assert!((h as f64 - expected).abs() <= 1.0, "{label}: height {h}, expected ~{expected}");
    }
}

#[test]
fn resized_png_stays_transparent() {
    for (label, converter) in converters() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("badge.png");
        create_png_with_transparent_half(&source, 400, 200);

        let policy = ConversionPolicy::new(true, false, 80, 200);
        let output = converted_path(converter.convert(&source, "image/png", &policy), label);

        let decoded = image::open(&output).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (200, 100), "{label}");
        for (x, y) in [(5, 5), (50, 50), (80, 95)] {
            let pixel = decoded.get_pixel(x, y);
            assert_eq!(pixel[3], 0, "{label}: pixel ({x},{y}) should be transparent, got {pixel:?}");
        }
        assert_eq!(decoded.get_pixel(150, 50)[3], 255, "{label}");
    }
}

#[test]
fn lower_quality_gives_smaller_file() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("detail.jpg");
    create_jpeg(&source, 512, 512);
    let converter = ImageConverter::new();

    let low = converted_path(
        converter.convert(&source, "image/jpeg", &ConversionPolicy::new(true, false, 10, 0)),
        "low",
    );
    let low_size = std::fs::metadata(&low).unwrap().len();
    let high = converted_path(
        converter.convert(&source, "image/jpeg", &ConversionPolicy::new(true, false, 95, 0)),
        "high",
    );
    let high_size = std::fs::metadata(&high).unwrap().len();

    assert!(low_size < high_size, "q10 {low_size} bytes vs q95 {high_size} bytes");
}

#[test]
fn uppercase_extension_derives_webp_path() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("IMG_0042.JPEG");
    create_jpeg(&source, 32, 32);
    let converter = ImageConverter::new();
    let policy = ConversionPolicy::default();

    let first = converter.convert(&source, "image/jpeg", &policy);
    let second = converter.convert(&source, "image/jpeg", &policy);

    assert_eq!(first.new_path(), Some(tmp.path().join("IMG_0042.webp").as_path()));
    assert_eq!(first, second);
}

#[test]
fn non_existent_path_is_not_converted() {
    let converter = ImageConverter::new();
    let result = converter.convert(
        Path::new("/nonexistent/upload.jpg"),
        "image/jpeg",
        &ConversionPolicy::default(),
    );
    assert_eq!(result, ConversionResult::NotConverted);
}

#[test]
fn disabled_policy_never_converts() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.jpg");
    create_jpeg(&source, 64, 64);

    let result = ImageConverter::new().convert(
        &source,
        "image/jpeg",
        &ConversionPolicy::default().disabled(),
    );

    assert_eq!(result, ConversionResult::NotConverted);
    assert!(!tmp.path().join("photo.webp").exists());
}

#[test]
fn corrupt_image_fails_without_leftovers() {
    for (label, converter) in converters() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("truncated.png");
        std::fs::write(&source, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();

        let result = converter.try_convert(&source, "image/png", &ConversionPolicy::default());

        assert!(
            matches!(result, Err(NotConvertedReason::Backend { .. })),
            "{label}: {result:?}"
        );
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("truncated.png")], "{label}");
    }
}

#[test]
fn oversized_source_is_declined_by_every_backend() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("panorama.png");
    RgbaImage::new(MAX_SOURCE_DIMENSION + 1, 2)
        .save_with_format(&source, image::ImageFormat::Png)
        .unwrap();
    let converter = ImageConverter::new().fallback_on_failure(true);

    let result = converter.try_convert(&source, "image/png", &ConversionPolicy::default());

    assert!(
        matches!(result, Err(NotConvertedReason::Backend { backend: "direct", .. })),
        "{result:?}"
    );
    assert!(!tmp.path().join("panorama.webp").exists());
}

#[test]
fn shipped_backends_are_available() {
    assert!(ResampleBackend::new().is_available());
    assert!(DirectBackend::new().is_available());
}
