//! Settings file handling.
//!
//! Settings live in a TOML file (default `webp-upload.toml`). Every key is
//! optional: stock defaults are the base layer and the file is merged on top,
//! so a file only names the values it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! enabled = true            # Master switch for conversion
//! replace_original = false  # Delete uploaded JPEG/PNG after converting
//! quality = 85              # WebP quality, clamped to 1-100
//! max_width = 1920          # Downscale wider images; 0 disables, clamped to 0-10000
//!
//! [backends]
//! fallback_on_failure = false  # Retry a failed file with the next backend
//! ```
//!
//! Out-of-range numbers are clamped when the policy is built, never
//! rejected. Unknown keys are rejected to catch typos early.

use crate::converter::ImageConverter;
use crate::policy::ConversionPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Settings loaded from the TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Master switch for conversion.
    pub enabled: bool,
    /// Delete the uploaded original once its WebP exists.
    pub replace_original: bool,
    /// WebP quality; clamped to 1-100 when the policy is built.
    pub quality: i64,
    /// Width bound in pixels, 0 = no resize; clamped to 0-10000.
    pub max_width: i64,
    /// Backend selection behaviour.
    pub backends: BackendsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            replace_original: false,
            quality: 85,
            max_width: 1920,
            backends: BackendsConfig::default(),
        }
    }
}

impl Settings {
    /// Resolve the per-request conversion policy.
    pub fn policy(&self) -> ConversionPolicy {
        ConversionPolicy::new(self.enabled, self.replace_original, self.quality, self.max_width)
    }

    /// Build the stock converter configured by these settings.
    pub fn converter(&self) -> ImageConverter {
        ImageConverter::new().fallback_on_failure(self.backends.fallback_on_failure)
    }
}

/// Backend selection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendsConfig {
    /// When a backend fails mid-conversion, hand the file to the next
    /// available backend instead of giving up.
    pub fallback_on_failure: bool,
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, toml::ser::Error> {
    toml::Value::try_from(Settings::default())
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load settings from a TOML file.
///
/// A missing file yields the stock defaults. A present file is merged over
/// the defaults; unknown keys and malformed TOML are errors.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse settings from TOML text, merged over the stock defaults.
pub fn parse_config(content: &str) -> Result<Settings, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let settings: Settings = merged.try_into()?;
    Ok(settings)
}

/// Returns a fully-commented stock settings file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# webp-upload settings
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Master switch. When false, nothing is converted and every file is used as-is.
enabled = true

# Media uploads: delete the uploaded JPEG/PNG and keep only the WebP.
# Mail attachments never delete their originals.
replace_original = false

# WebP quality, 1 (smallest) to 100 (most detail). Out-of-range values are clamped.
quality = 85

# Downscale images wider than this many pixels, keeping the aspect ratio.
# 0 disables resizing. Values above 10000 are clamped.
max_width = 1920

# ---------------------------------------------------------------------------
# Backends
# ---------------------------------------------------------------------------
[backends]
# The preferred backend handles every file when it is available. Set to true
# to let a file that fails there get a second attempt on the next backend.
fallback_on_failure = false
"##
}
