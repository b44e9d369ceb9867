//! Media library upload handling.
//!
//! When `replace_original` is on, a freshly uploaded JPEG/PNG is converted,
//! the original is deleted, and the upload record is rewritten to describe
//! the WebP file: path, public URL, MIME type and size. Any upload that is not
//! eligible, or whose conversion fails, is passed through untouched so the
//! upload always completes.

use crate::converter::{ConversionResult, ImageConverter};
use crate::mime::{JPEG, PNG, WEBP};
use crate::naming::replace_image_extension;
use crate::policy::ConversionPolicy;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// One stored upload as the host platform records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    /// Absolute path of the stored file.
    pub file: PathBuf,
    /// Public URL of the stored file.
    pub url: String,
    /// MIME type recorded for the upload.
    pub mime: String,
    /// Size in bytes of the stored file.
    pub size: u64,
    /// Upload error reported by the host; such uploads are never touched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadedFile {
    /// Record for a file already on disk, sizing it from the filesystem.
    pub fn from_path(file: PathBuf, url: String, mime: String) -> std::io::Result<Self> {
        let size = fs::metadata(&file)?.len();
        Ok(Self {
            file,
            url,
            mime,
            size,
            error: None,
        })
    }
}

/// Convert an upload in place when the policy asks for replacement.
pub fn handle_upload(
    converter: &ImageConverter,
    policy: &ConversionPolicy,
    upload: UploadedFile,
) -> UploadedFile {
    if upload.error.is_some() {
        return upload;
    }
    if !policy.enabled() || !policy.replace_original() {
        return upload;
    }
    if upload.mime != JPEG && upload.mime != PNG {
        return upload;
    }
    if upload.file.to_string_lossy().contains(".webp") {
        debug!(path = %upload.file.display(), "upload already looks like webp");
        return upload;
    }

    let new_path = match converter.convert(&upload.file, &upload.mime, policy) {
        ConversionResult::Converted { new_path } => new_path,
        ConversionResult::NotConverted => return upload,
    };

    if let Err(e) = fs::remove_file(&upload.file) {
        warn!(path = %upload.file.display(), error = %e, "could not delete original upload");
    }

    let size = match fs::metadata(&new_path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            warn!(path = %new_path.display(), error = %e, "could not stat converted upload");
            0
        }
    };
    let url = replace_image_extension(&upload.url).unwrap_or(upload.url);

    UploadedFile {
        file: new_path,
        url,
        mime: WEBP.to_string(),
        size,
        error: None,
    }
}
