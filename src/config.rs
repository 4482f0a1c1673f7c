//! Configuration module.
//!
//! Handles loading, validating, and merging `trez.toml`. User values are
//! layered on top of stock defaults, so a config file only needs the keys it
//! wants to change. Command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [resize]
//! algorithm = "fit"          # fit | fill
//! gravity = "center"         # center, north, south, west, east, northwest, ...
//! background = [0, 0, 0]     # letterbox color for fit (RGB)
//! quality = 95               # JPEG quality (1-100, 0 = default)
//! sharpen_amount = 0         # unsharp mask strength in percent (0 = off)
//! sharpen_radius = 0.0       # unsharp mask blur sigma (0 = off, at most 20)
//!
//! [processing]
//! max_processes = 4          # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Algorithm, Background, Gravity, RenderOptions, Sharpening, TargetSpec};
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
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `trez.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrezConfig {
    /// Default resize options.
    pub resize: ResizeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl TrezConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let resize = &self.resize;
        if resize.quality > 100 {
            return Err(ConfigError::Validation(
                "resize.quality must be 0-100".into(),
            ));
        }
        if resize.sharpen_amount < 0 {
            return Err(ConfigError::Validation(
                "resize.sharpen_amount must not be negative".into(),
            ));
        }
        if !Sharpening::accepts_radius(resize.sharpen_radius) || resize.sharpen_radius < 0.0 {
            return Err(ConfigError::Validation(format!(
                "resize.sharpen_radius must be between 0 and {}",
                Sharpening::MAX_RADIUS
            )));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Default resize options applied when a flag is not given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub algorithm: Algorithm,
    pub gravity: Gravity,
    /// Letterbox color as `[r, g, b]`.
    pub background: [u8; 3],
    /// JPEG quality. 0 means the built-in default (95).
    pub quality: u32,
    pub sharpen_amount: i32,
    pub sharpen_radius: f64,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Fit,
            gravity: Gravity::Center,
            background: [0, 0, 0],
            quality: 95,
            sharpen_amount: 0,
            sharpen_radius: 0.0,
        }
    }
}

impl ResizeConfig {
    /// Build render options for a `width` x `height` target (0 = keep source axis).
    pub fn render_options(&self, width: u32, height: u32) -> RenderOptions {
        RenderOptions {
            target: TargetSpec::new(width, height),
            algorithm: self.algorithm,
            gravity: self.gravity,
            background: Background(self.background),
            quality: self.quality,
            sharpen_amount: self.sharpen_amount,
            sharpen_radius: self.sharpen_radius,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel resize workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(TrezConfig::default()).expect("default config must serialize")
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

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<TrezConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: TrezConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<TrezConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_none() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `trez.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# trez configuration
# ==================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Resize defaults
# ---------------------------------------------------------------------------
[resize]
# "fit" scales the whole image inside the target and pads with `background`.
# "fill" scales the image to cover the target and crops the overflow.
algorithm = "fit"

# Where the image (fit) or the crop window (fill) is anchored:
# center, north, south, west, east, northwest, northeast, southwest, southeast
gravity = "center"

# Padding color for fit, as [r, g, b].
background = [0, 0, 0]

# JPEG quality (1 = worst, 100 = best, 0 = default of 95).
quality = 95

# Unsharp mask applied after resizing. Both values must be positive to enable.
# The radius is a blur sigma in pixels, at most 20.
sharpen_amount = 0
sharpen_radius = 0.0

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel resize workers for `batch` and `bench`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
