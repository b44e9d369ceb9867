//! CLI output formatting.
//!
//! Each command has a `format_*` function returning `Vec<String>` for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.
//!
//! ## Convert
//!
//! ```text
//! photos/beach.jpg
//!     → photos/beach.webp (1920x1280, resample)
//! notes/readme.txt
//!     not converted: unsupported MIME type "unknown"
//! Converted 1 of 2 files
//! ```
//!
//! ## Backends
//!
//! ```text
//! Backends (probe order)
//!     resample: available (selected)
//!     direct: available
//! ```

use crate::converter::{Conversion, ImageConverter, NotConvertedReason};
use crate::upload::UploadedFile;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What happened to one file on the `convert` command, in JSON-friendly form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub source: PathBuf,
    pub mime: Option<String>,
    pub converted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ConversionReport {
    pub fn new(
        source: &Path,
        mime: Option<&str>,
        outcome: &Result<Conversion, NotConvertedReason>,
    ) -> Self {
        let base = Self {
            source: source.to_path_buf(),
            mime: mime.map(str::to_string),
            converted: false,
            output: None,
            backend: None,
            width: None,
            height: None,
            reason: None,
        };
        match outcome {
            Ok(conversion) => Self {
                converted: true,
                output: Some(conversion.new_path.clone()),
                backend: Some(conversion.backend),
                width: Some(conversion.dimensions.width),
                height: Some(conversion.dimensions.height),
                ..base
            },
            Err(reason) => Self {
                reason: Some(reason.to_string()),
                ..base
            },
        }
    }
}

// ============================================================================
// Convert
// ============================================================================

/// Format the result of a `convert` run.
pub fn format_conversions(reports: &[ConversionReport]) -> Vec<String> {
    let mut lines = Vec::new();
    for report in reports {
        lines.push(report.source.display().to_string());
        match (&report.output, &report.reason) {
            (Some(output), _) => lines.push(format!(
                "    → {} ({}x{}, {})",
                output.display(),
                report.width.unwrap_or_default(),
                report.height.unwrap_or_default(),
                report.backend.unwrap_or("unknown"),
            )),
            (None, Some(reason)) => lines.push(format!("    not converted: {reason}")),
            (None, None) => lines.push("    not converted".to_string()),
        }
    }
    let converted = reports.iter().filter(|r| r.converted).count();
    lines.push(format!("Converted {} of {} files", converted, reports.len()));
    lines
}

pub fn print_conversions(reports: &[ConversionReport]) {
    for line in format_conversions(reports) {
        println!("{}", line);
    }
}

// ============================================================================
// Mail attachments
// ============================================================================

/// Format an attachment list before and after the rewrite.
pub fn format_attachments(original: &[PathBuf], rewritten: &[PathBuf]) -> Vec<String> {
    let mut lines = vec!["Attachments".to_string()];
    for (before, after) in original.iter().zip(rewritten) {
        if before == after {
            lines.push(format!("    {} (unchanged)", before.display()));
        } else {
            lines.push(format!("    {} → {}", before.display(), after.display()));
        }
    }
    lines
}

pub fn print_attachments(original: &[PathBuf], rewritten: &[PathBuf]) {
    for line in format_attachments(original, rewritten) {
        println!("{}", line);
    }
}

// ============================================================================
// Upload
// ============================================================================

/// Format an upload record.
pub fn format_upload(upload: &UploadedFile) -> Vec<String> {
    let mut lines = vec![
        format!("File: {}", upload.file.display()),
        format!("    URL: {}", upload.url),
        format!("    Type: {}", upload.mime),
        format!("    Size: {} bytes", upload.size),
    ];
    if let Some(error) = &upload.error {
        lines.push(format!("    Error: {error}"));
    }
    lines
}

pub fn print_upload(upload: &UploadedFile) {
    for line in format_upload(upload) {
        println!("{}", line);
    }
}

// ============================================================================
// Backends
// ============================================================================

/// Format backend availability in probe order, marking the one that would
/// be selected right now.
pub fn format_backend_status(converter: &ImageConverter) -> Vec<String> {
    let selected = converter.select_backend().map(|b| b.name());
    let mut lines = vec!["Backends (probe order)".to_string()];
    for backend in converter.backends() {
        let state = if backend.is_available() {
            "available"
        } else {
            "unavailable"
        };
        let marker = if Some(backend.name()) == selected {
            " (selected)"
        } else {
            ""
        };
        lines.push(format!("    {}: {}{}", backend.name(), state, marker));
    }
    if selected.is_none() {
        lines.push("No imaging backend available: nothing will be converted".to_string());
    }
    lines
}

pub fn print_backend_status(converter: &ImageConverter) {
    for line in format_backend_status(converter) {
        println!("{}", line);
    }
}
