//! MIME type detection and mapping.
//!
//! Mail attachments arrive as bare paths, so their type is sniffed from the
//! file's leading bytes rather than trusted from the name.

use image::ImageFormat;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub const JPEG: &str = "image/jpeg";
pub const PNG: &str = "image/png";
pub const WEBP: &str = "image/webp";

/// Enough bytes for every signature `image::guess_format` knows.
const SNIFF_LEN: usize = 64;

/// Detect an image file's MIME type from its content.
///
/// Returns `Ok(None)` for files that are not a recognised image format.
pub fn sniff_mime(path: &Path) -> io::Result<Option<&'static str>> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)?;
    Ok(image::guess_format(&head).ok().map(|f| f.to_mime_type()))
}

/// MIME type for a file extension, WebP included.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "webp" => Some(WEBP),
        other => ImageFormat::from_extension(other).map(|f| f.to_mime_type()),
    }
}

/// Sniff the file's content, falling back to its extension when the bytes
/// are not a recognised image.
pub fn detect_mime(path: &Path) -> io::Result<Option<&'static str>> {
    Ok(sniff_mime(path)?.or_else(|| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(mime_for_extension)
    }))
}
