//! Output naming for converted files.
//!
//! A converted file lives next to its source with the same stem and a
//! `.webp` extension. Only a trailing `.jpg`, `.jpeg` or `.png` is replaced,
//! compared case-insensitively:
//! - `uploads/2024/Photo.JPG` → `uploads/2024/Photo.webp`
//! - `scan.final.jpeg` → `scan.final.webp`
//! - `notes.txt` → no output name (not convertible)
//!
//! The same rule rewrites public URLs of uploaded files.

use std::path::{Path, PathBuf};

/// Extensions that name a convertible source.
pub const CONVERTIBLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Staging suffix appended while a conversion is being written.
const PARTIAL_SUFFIX: &str = "partial";

fn is_convertible_extension(ext: &str) -> bool {
    CONVERTIBLE_EXTENSIONS
        .iter()
        .any(|candidate| ext.eq_ignore_ascii_case(candidate))
}

/// Derive the `.webp` output path for a source image.
///
/// Returns `None` when the path does not end in a convertible extension, so
/// the output can never alias the source.
pub fn webp_path_for(source: &Path) -> Option<PathBuf> {
    let ext = source.extension()?.to_str()?;
    if !is_convertible_extension(ext) {
        return None;
    }
    Some(source.with_extension("webp"))
}

/// Staging path a backend writes to before the result is moved into place.
pub fn partial_path_for(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    output.with_file_name(name)
}

/// Replace a trailing image extension in a string such as a URL.
///
/// Returns `None` when the string does not end in a convertible extension.
pub fn replace_image_extension(name: &str) -> Option<String> {
    let dot = name.rfind('.')?;
    let ext = &name[dot + 1..];
    if ext.contains('/') || !is_convertible_extension(ext) {
        return None;
    }
    Some(format!("{}.webp", &name[..dot]))
}
