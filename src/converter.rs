//! Conversion orchestration.
//!
//! [`ImageConverter::convert`] is the one entry point call sites use. It runs
//! the precondition checks in a fixed order, picks the first backend whose
//! capability probe succeeds, lets it write to a staging file, verifies the
//! staging file, and moves it into place:
//!
//! ```text
//! enabled? → source exists? → JPEG/PNG MIME? → .jpg/.jpeg/.png name? → backend available?
//!     → backend writes <name>.webp.partial → non-empty? → rename to <name>.webp → exists?
//! ```
//!
//! Every failure collapses into [`ConversionResult::NotConverted`]; callers
//! always keep the original file as their fallback. [`ImageConverter::try_convert`]
//! exposes the typed [`NotConvertedReason`] for diagnostics and tests.
//!
//! Only "backend unavailable" moves on to the next backend. A backend that
//! starts a conversion and fails ends the attempt unless
//! [`ImageConverter::fallback_on_failure`] is switched on.

use crate::imaging::{
    BackendError, ConversionBackend, ConversionParams, Dimensions, DirectBackend,
    ResampleBackend, SourceFormat,
};
use crate::naming::{partial_path_for, webp_path_for};
use crate::policy::ConversionPolicy;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Outcome of a conversion as seen by call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    Converted { new_path: PathBuf },
    NotConverted,
}

impl ConversionResult {
    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }

    pub fn new_path(&self) -> Option<&Path> {
        match self {
            Self::Converted { new_path } => Some(new_path),
            Self::NotConverted => None,
        }
    }
}

/// A successful conversion with the details diagnostics want.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub new_path: PathBuf,
    pub backend: &'static str,
    pub dimensions: Dimensions,
}

/// Why a file was not converted.
#[derive(Error, Debug)]
pub enum NotConvertedReason {
    #[error("conversion is disabled")]
    Disabled,
    #[error("source file does not exist")]
    MissingSource,
    #[error("unsupported MIME type {0:?}")]
    UnsupportedMime(String),
    #[error("source name does not end in .jpg, .jpeg or .png")]
    UnconvertibleName,
    #[error("no imaging backend available")]
    NoBackend,
    #[error("{backend} backend failed: {source}")]
    Backend {
        backend: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("{backend} backend panicked")]
    BackendPanicked { backend: &'static str },
    #[error("{backend} backend reported success but left no output")]
    OutputMissing { backend: &'static str },
    #[error("could not move output into place: {0}")]
    Finalize(#[source] io::Error),
}

impl NotConvertedReason {
    /// Expected, frequent rejections of the input itself.
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            Self::Disabled | Self::MissingSource | Self::UnsupportedMime(_) | Self::UnconvertibleName
        )
    }
}

/// Converts JPEG/PNG files to WebP using the first available backend.
pub struct ImageConverter {
    backends: Vec<Box<dyn ConversionBackend>>,
    fallback_on_failure: bool,
}

impl ImageConverter {
    /// Converter with the stock backend order: resample, then direct.
    pub fn new() -> Self {
        Self::with_backends(vec![
            Box::new(ResampleBackend::new()),
            Box::new(DirectBackend::new()),
        ])
    }

    /// Converter probing `backends` in the given order.
    pub fn with_backends(backends: Vec<Box<dyn ConversionBackend>>) -> Self {
        Self {
            backends,
            fallback_on_failure: false,
        }
    }

    /// Let a backend that fails mid-conversion hand over to the next
    /// available one.
    pub fn fallback_on_failure(mut self, enabled: bool) -> Self {
        self.fallback_on_failure = enabled;
        self
    }

    /// Whether a failed backend hands the file to the next one.
    pub fn falls_back_on_failure(&self) -> bool {
        self.fallback_on_failure
    }

    /// All configured backends in probe order.
    pub fn backends(&self) -> impl Iterator<Item = &dyn ConversionBackend> {
        self.backends.iter().map(|b| b.as_ref())
    }

    /// First backend whose capability probe succeeds right now.
    pub fn select_backend(&self) -> Option<&dyn ConversionBackend> {
        self.backends().find(|b| b.is_available())
    }

    /// Convert `path` to WebP according to `policy`.
    ///
    /// Never panics and never returns an error: anything that goes wrong is
    /// logged and reported as [`ConversionResult::NotConverted`].
    pub fn convert(&self, path: &Path, mime: &str, policy: &ConversionPolicy) -> ConversionResult {
        match self.try_convert(path, mime, policy) {
            Ok(conversion) => ConversionResult::Converted {
                new_path: conversion.new_path,
            },
            Err(reason) if reason.is_input_rejection() => {
                debug!(path = %path.display(), mime, %reason, "not converted");
                ConversionResult::NotConverted
            }
            Err(reason) => {
                warn!(path = %path.display(), mime, %reason, "conversion failed");
                ConversionResult::NotConverted
            }
        }
    }

    /// Like [`convert`](Self::convert), keeping the reason for a failure.
    pub fn try_convert(
        &self,
        path: &Path,
        mime: &str,
        policy: &ConversionPolicy,
    ) -> Result<Conversion, NotConvertedReason> {
        if !policy.enabled() {
            return Err(NotConvertedReason::Disabled);
        }
        if !path.is_file() {
            return Err(NotConvertedReason::MissingSource);
        }
        let format = SourceFormat::from_mime(mime)
            .ok_or_else(|| NotConvertedReason::UnsupportedMime(mime.to_string()))?;
        let output = webp_path_for(path).ok_or(NotConvertedReason::UnconvertibleName)?;

        let mut available = self.backends().filter(|b| b.is_available());
        let first = available.next().ok_or(NotConvertedReason::NoBackend)?;

        let mut result = self.run_backend(first, path, &output, format, policy);
        if self.fallback_on_failure {
            for backend in available {
                match &result {
                    Ok(_) => break,
                    Err(reason) => {
                        warn!(path = %path.display(), %reason, next = backend.name(), "retrying with next backend");
                    }
                }
                result = self.run_backend(backend, path, &output, format, policy);
            }
        }
        result
    }

    fn run_backend(
        &self,
        backend: &dyn ConversionBackend,
        source: &Path,
        output: &Path,
        format: SourceFormat,
        policy: &ConversionPolicy,
    ) -> Result<Conversion, NotConvertedReason> {
        let staging = partial_path_for(output);
        let params = ConversionParams {
            source: source.to_path_buf(),
            output: staging.clone(),
            format,
            max_width: policy.max_width(),
            quality: policy.quality(),
        };
        debug!(backend = backend.name(), source = %source.display(), "converting");

        let name = backend.name();
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| backend.convert(&params)));
        let result = match attempt {
            Ok(Ok(dimensions)) => finalize(name, &staging, output).map(|()| dimensions),
            Ok(Err(source)) => Err(NotConvertedReason::Backend {
                backend: name,
                source,
            }),
            Err(_) => Err(NotConvertedReason::BackendPanicked { backend: name }),
        };

        match result {
            Ok(dimensions) => {
                info!(
                    source = %source.display(),
                    output = %output.display(),
                    backend = name,
                    width = dimensions.width,
                    height = dimensions.height,
                    "converted"
                );
                Ok(Conversion {
                    new_path: output.to_path_buf(),
                    backend: name,
                    dimensions,
                })
            }
            Err(reason) => {
                discard(&staging);
                Err(reason)
            }
        }
    }
}

impl Default for ImageConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check the staging file holds data, move it over the final path, and
/// confirm the final path exists.
fn finalize(backend: &'static str, staging: &Path, output: &Path) -> Result<(), NotConvertedReason> {
    let written = fs::metadata(staging).is_ok_and(|m| m.is_file() && m.len() > 0);
    if !written {
        return Err(NotConvertedReason::OutputMissing { backend });
    }
    fs::rename(staging, output).map_err(NotConvertedReason::Finalize)?;
    if !output.is_file() {
        return Err(NotConvertedReason::OutputMissing { backend });
    }
    Ok(())
}

fn discard(staging: &Path) {
    match fs::remove_file(staging) {
        Ok(()) => debug!(path = %staging.display(), "removed partial output"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %staging.display(), error = %e, "could not remove partial output"),
    }
}
