//! Image decoding, resizing and WebP encoding.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image` (JPEG, PNG decoders) |
//! | **Resize** | `image::imageops` (Lanczos3 or Triangle) |
//! | **Encode → WebP** | `webp` (libwebp, lossy at the policy quality) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a conversion
//! - **Backend**: [`ConversionBackend`] trait + [`ResampleBackend`] and [`DirectBackend`]

pub mod backend;
mod calculations;
pub mod direct_backend;
mod params;
pub mod resample_backend;

pub use backend::{BackendError, ConversionBackend, Dimensions};
pub use calculations::{WEBP_MAX_DIMENSION, calculate_resize_dimensions, fits_webp_limits};
pub use direct_backend::DirectBackend;
pub use params::{ConversionParams, MaxWidth, Quality, SourceFormat};
pub use resample_backend::ResampleBackend;
