//! # webp-upload
//!
//! Converts JPEG and PNG images to WebP at the two points where images enter
//! a site: outgoing mail attachments and media-library uploads. Conversion is
//! a best-effort enhancement; when it cannot happen the original file is used
//! unchanged and the surrounding workflow carries on.
//!
//! # Pipeline
//!
//! ```text
//! policy + path + MIME
//!   → preconditions (enabled, exists, JPEG/PNG, convertible name)
//!   → backend selection (first whose capability probe succeeds)
//!   → decode → optional width-bounded resize → WebP at policy quality
//!   → staged write → verify → move into place
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`converter`] | [`ImageConverter`](converter::ImageConverter): preconditions, backend selection, staged write and verification |
//! | [`policy`] | [`ConversionPolicy`](policy::ConversionPolicy): enabled, replace-original, clamped quality and max width |
//! | [`imaging`] | Backends, the [`ConversionBackend`](imaging::ConversionBackend) trait, dimension math |
//! | [`naming`] | `.jpg`/`.jpeg`/`.png` → `.webp` path and URL rewriting |
//! | [`mime`] | Content-based MIME sniffing and the extension → MIME table |
//! | [`mail`] | Attachment list rewrite for outgoing mail |
//! | [`upload`] | Media upload handling with original replacement |
//! | [`config`] | TOML settings loading, defaults and the stock settings file |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Policy
//!
//! The policy is a small `Copy` value passed into every call. Nothing reads
//! settings from ambient state, so one converter can serve requests with
//! different policies and tests never touch global configuration.
//!
//! ## Ordered Backends
//!
//! Backends sit behind one trait and are probed in order on every call. The
//! preferred [`ResampleBackend`](imaging::ResampleBackend) sniffs the real
//! format and uses Lanczos3; [`DirectBackend`](imaging::DirectBackend) uses the
//! decoder the MIME type names and a plain triangle filter. Only an
//! unavailable backend moves selection along. A backend that fails on a
//! particular file ends that attempt unless `fallback_on_failure` is set.
//!
//! ## Never Fail the Caller
//!
//! [`ImageConverter::convert`](converter::ImageConverter::convert) returns a
//! two-state result and never panics, even if a backend does. The typed reason
//! is still available from `try_convert` for logs, tests and the CLI.

pub mod config;
pub mod converter;
pub mod imaging;
pub mod mail;
pub mod mime;
pub mod naming;
pub mod output;
pub mod policy;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
