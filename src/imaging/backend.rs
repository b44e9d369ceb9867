//! Conversion backend trait and shared types.
//!
//! The [`ConversionBackend`] trait is the single capability interface every
//! imaging backend implements: report whether it can run in this build and
//! environment, then convert one file.
//!
//! Two implementations ship, probed in this order by
//! [`ImageConverter`](crate::converter::ImageConverter):
//!
//! | Backend | Decode | Resize | Encode |
//! |---|---|---|---|
//! | [`ResampleBackend`](super::resample_backend::ResampleBackend) | format-sniffing reader | Lanczos3 on the native colour type | libwebp lossy |
//! | [`DirectBackend`](super::direct_backend::DirectBackend) | JPEG or PNG decoder picked by MIME | Triangle onto a transparent canvas | libwebp lossy |

use super::params::ConversionParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("WebP encode failed: {0}")]
    Encode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a decoded or written image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Largest source width or height either backend will decode.
pub const MAX_SOURCE_DIMENSION: u32 = 20_000;

/// Ceiling on the decoded pixel buffer, in bytes. A 12000x12000 RGBA photo
/// (576 MB) fits; a buffer past 1 GiB is refused before it is allocated.
pub const DECODE_ALLOC_LIMIT: u64 = 1 << 30;

/// Decoder limits shared by every backend.
///
/// Applied through `ImageReader::limits` so the decoder checks the header
/// against them before reserving any pixel memory.
pub fn decode_limits() -> image::Limits {
    let mut limits = image::Limits::default();
    limits.max_image_width = Some(MAX_SOURCE_DIMENSION);
    limits.max_image_height = Some(MAX_SOURCE_DIMENSION);
    limits.max_alloc = Some(DECODE_ALLOC_LIMIT);
    limits
}

/// Trait for imaging backends.
///
/// `is_available` is asked on every conversion; implementations must not
/// cache the answer. `convert` must write the encoded WebP to
/// `params.output` and report the dimensions it wrote. It must never touch
/// `params.source` beyond reading it.
pub trait ConversionBackend: Sync {
    /// Short identifier used in logs and status output.
    fn name(&self) -> &'static str;

    /// Capability probe.
    fn is_available(&self) -> bool;

    /// Decode, optionally resize, encode and write one file.
    fn convert(&self, params: &ConversionParams) -> Result<Dimensions, BackendError>;
}

/// Encode an RGB or RGBA buffer with libwebp and write it out.
///
/// Shared by both backends so quality handling stays identical.
pub(crate) fn write_webp(
    encoder: webp::Encoder<'_>,
    params: &ConversionParams,
) -> Result<(), BackendError> {
    let encoded = encoder
        .encode_simple(false, params.quality.as_factor())
        .map_err(|e| BackendError::Encode(format!("{e:?}")))?;
    std::fs::write(&params.output, &*encoded)?;
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Mock backend that records conversions and optionally writes a file.
    /// Uses Mutex (not RefCell) so it satisfies the trait's Sync bound.
    pub struct MockBackend {
        pub name: &'static str,
        pub available: AtomicBool,
        pub fail: bool,
        /// Bytes written to `params.output`; `None` writes nothing at all.
        pub payload: Option<Vec<u8>>,
        pub calls: Mutex<Vec<RecordedCall>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub source: String,
        pub output: String,
        pub max_width: u32,
        pub quality: u32,
    }

    impl MockBackend {
        /// Available backend that writes a small fake WebP payload.
        pub fn working(name: &'static str) -> Self {
            Self {
                name,
                available: AtomicBool::new(true),
                fail: false,
                payload: Some(b"RIFF\0\0\0\0WEBPVP8 ".to_vec()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn unavailable(name: &'static str) -> Self {
            let backend = Self::working(name);
            backend.available.store(false, Ordering::SeqCst);
            backend
        }

        /// Available backend whose conversion always errors.
        pub fn failing(name: &'static str) -> Self {
            Self {
                fail: true,
                ..Self::working(name)
            }
        }

        /// Available backend that reports success but writes nothing.
        pub fn silent(name: &'static str) -> Self {
            Self {
                payload: None,
                ..Self::working(name)
            }
        }

        pub fn get_calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ConversionBackend for MockBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available.load(Ordering::SeqCst)
        }

        fn convert(&self, params: &ConversionParams) -> Result<Dimensions, BackendError> {
            self.calls.lock().unwrap().push(RecordedCall {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                max_width: params.max_width.value(),
                quality: params.quality.value(),
            });

            if self.fail {
                return Err(BackendError::Decode("mock failure".to_string()));
            }
            if let Some(payload) = &self.payload {
                std::fs::write(&params.output, payload)?;
            }
            Ok(Dimensions {
                width: 1,
                height: 1,
            })
        }
    }

    #[test]
    fn mock_records_conversion() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::working("mock");
        let output = tmp.path().join("out.webp");

        backend
            .convert(&ConversionParams {
                source: "/source.jpg".into(),
                output: output.clone(),
                format: crate::imaging::SourceFormat::Jpeg,
                max_width: crate::imaging::MaxWidth::new(1920),
                quality: crate::imaging::Quality::new(85),
            })
            .unwrap();

        assert!(output.exists());
        let calls = backend.get_calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(
            &calls[0],
            RecordedCall {
                max_width: 1920,
                quality: 85,
                ..
            }
        ));
    }

    #[test]
    fn decode_budget_admits_large_photo() {
        let mut limits = decode_limits();
        assert!(limits.check_dimensions(12_000, 12_000).is_ok());
        assert!(limits.reserve(12_000 * 12_000 * 4).is_ok());
    }

    #[test]
    fn decode_budget_refuses_oversized_buffers() {
        let limits = decode_limits();
        assert!(limits.check_dimensions(MAX_SOURCE_DIMENSION + 1, 10).is_err());
        assert!(limits.check_dimensions(10, MAX_SOURCE_DIMENSION + 1).is_err());

        let mut limits = decode_limits();
        assert!(limits.reserve(20_000 * 20_000 * 4).is_err());
    }

    #[test]
    fn mock_unavailable_reports_unavailable() {
        assert!(!MockBackend::unavailable("mock").is_available());
        assert!(MockBackend::failing("mock").is_available());
    }
}
