//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::MaxWidth;

/// Largest width or height libwebp can encode.
pub const WEBP_MAX_DIMENSION: u32 = 16_383;

/// Calculate output dimensions for a width-bounded downscale.
///
/// Returns `None` when no resize is needed: the bound is disabled (0) or the
/// source is already no wider than the bound. Otherwise the width becomes the
/// bound and the height scales proportionally, rounded down, never below 1px.
///
/// # Examples
/// ```
/// # use webp_upload::imaging::{MaxWidth, calculate_resize_dimensions};
/// // 3000x2000 bounded to 1920 wide → 1920x1280
/// assert_eq!(calculate_resize_dimensions((3000, 2000), MaxWidth::new(1920)), Some((1920, 1280)));
///
/// // Already narrow enough → untouched
/// assert_eq!(calculate_resize_dimensions((800, 600), MaxWidth::new(1920)), None);
/// ```
pub fn calculate_resize_dimensions(source: (u32, u32), max_width: MaxWidth) -> Option<(u32, u32)> {
    let (src_w, src_h) = source;
    let bound = max_width.value();

    if max_width.is_disabled() || src_w <= bound {
        return None;
    }

    let h = (src_h as u64 * bound as u64 / src_w as u64).max(1) as u32;
    Some((bound, h))
}

/// Whether libwebp can encode an image of this size.
pub fn fits_webp_limits(dims: (u32, u32)) -> bool {
    let (w, h) = dims;
    w > 0 && h > 0 && w <= WEBP_MAX_DIMENSION && h <= WEBP_MAX_DIMENSION
}
