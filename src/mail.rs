//! Outgoing mail attachment rewrite.
//!
//! Before a message is dispatched, every JPEG/PNG attachment is swapped for
//! its WebP conversion. Attachments that are missing, are not images, or fail
//! to convert go out unchanged. Originals are never deleted: the mail path
//! only ever adds files.

use crate::converter::{ConversionResult, ImageConverter};
use crate::mime::{JPEG, PNG, sniff_mime};
use crate::policy::ConversionPolicy;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rewrite an attachment list, keeping order.
pub fn rewrite_attachments(
    converter: &ImageConverter,
    policy: &ConversionPolicy,
    attachments: &[PathBuf],
) -> Vec<PathBuf> {
    if !policy.enabled() || attachments.is_empty() {
        return attachments.to_vec();
    }

    attachments
        .iter()
        .map(|attachment| {
            convert_attachment(converter, policy, attachment).unwrap_or_else(|| attachment.clone())
        })
        .collect()
}

fn convert_attachment(
    converter: &ImageConverter,
    policy: &ConversionPolicy,
    attachment: &Path,
) -> Option<PathBuf> {
    if !attachment.is_file() {
        return None;
    }
    let mime = match sniff_mime(attachment) {
        Ok(Some(mime)) if mime == JPEG || mime == PNG => mime,
        Ok(_) => return None,
        Err(e) => {
            debug!(path = %attachment.display(), error = %e, "could not sniff attachment");
            return None;
        }
    };

    match converter.convert(attachment, mime, policy) {
        ConversionResult::Converted { new_path } => Some(new_path),
        ConversionResult::NotConverted => None,
    }
}
