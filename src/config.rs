//! Build configuration module.
//!
//! Handles loading, merging, and validating `gallery.toml`. Configuration is
//! sparse: user files only specify the values they want to override, and the
//! rest come from stock defaults. Unknown keys are rejected to catch typos
//! early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [thumbnails]
//! max_size = 300        # Longest edge in pixels (fit inside, never enlarged)
//! quality = 80          # JPEG quality (1-100)
//!
//! [medium]
//! max_size = 1200
//! quality = 85
//!
//! [watermark]
//! enabled = false
//! text = "© Gallery"
//! font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
//! opacity = 0.8         # 0.0-1.0
//!
//! [processing]
//! batch_size = 3        # Images encoded concurrently per batch
//! max_workers = 4       # Omit for auto = CPU cores; clamped to cores
//! ```

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

/// Build configuration loaded from `gallery.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Thumbnail variant settings (gallery grid).
    pub thumbnails: ThumbnailConfig,
    /// Medium variant settings (lightbox view).
    pub medium: MediumConfig,
    /// Watermark settings, applied to the medium variant only.
    pub watermark: WatermarkConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, variant) in [
            ("thumbnails", (self.thumbnails.max_size, self.thumbnails.quality)),
            ("medium", (self.medium.max_size, self.medium.quality)),
        ] {
            let (max_size, quality) = variant;
            if max_size == 0 {
                return Err(ConfigError::Validation(format!(
                    "{name}.max_size must be non-zero"
                )));
            }
            if !(1..=100).contains(&quality) {
                return Err(ConfigError::Validation(format!(
                    "{name}.quality must be 1-100"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.watermark.opacity) {
            return Err(ConfigError::Validation(
                "watermark.opacity must be 0.0-1.0".into(),
            ));
        }
        if self.watermark.enabled && self.watermark.text.trim().is_empty() {
            return Err(ConfigError::Validation(
                "watermark.text must not be empty when watermarking is enabled".into(),
            ));
        }
        if self.processing.batch_size == 0 {
            return Err(ConfigError::Validation(
                "processing.batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Thumbnail variant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailConfig {
    /// Longest edge in pixels. Images fit inside, never enlarged.
    pub max_size: u32,
    /// JPEG quality (1-100).
    pub quality: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_size: 300,
            quality: 80,
        }
    }
}

/// Medium variant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediumConfig {
    /// Longest edge in pixels. Images fit inside, never enlarged.
    pub max_size: u32,
    /// JPEG quality (1-100).
    pub quality: u32,
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            max_size: 1200,
            quality: 85,
        }
    }
}

/// Watermark settings. The watermark is composited onto the medium variant
/// only — never the thumbnail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatermarkConfig {
    /// Whether to composite a text watermark onto medium variants.
    pub enabled: bool,
    /// Watermark label, e.g. a copyright string.
    pub text: String,
    /// Path to a TrueType/OpenType font used to rasterize the label.
    pub font_path: String,
    /// Watermark opacity (0.0 = invisible, 1.0 = opaque).
    pub opacity: f32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            text: "© Gallery".to_string(),
            font_path: "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
            opacity: 0.8,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Number of images encoded concurrently per batch. Bounds peak memory:
    /// the pipeline waits for a whole batch before starting the next.
    pub batch_size: usize,
    /// Maximum number of parallel workers. When absent, defaults to the
    /// number of CPU cores. Values larger than the core count are clamped.
    pub max_workers: Option<usize>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            max_workers: None,
        }
    }
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_workers(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_workers.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
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

/// Load `gallery.toml` from the given path, merging user values on top of
/// stock defaults and validating the result.
///
/// A missing file is not an error — the stock defaults apply.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = if path.exists() {
        let content = fs::read_to_string(path)?;
        let overlay: toml::Value = toml::from_str(&content)?;
        merge_toml(base, overlay)
    } else {
        base
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `gallery.toml` with all keys documented.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Picshelf Configuration
# ======================
# All options are optional. Values shown are the stock defaults; delete
# anything you don't want to override.

# Thumbnail variant (gallery grid). Images are resized to fit inside a
# max_size square — never enlarged, never cropped.
[thumbnails]
max_size = 300
quality = 80

# Medium variant (lightbox view).
[medium]
max_size = 1200
quality = 85

# Text watermark, composited onto the bottom-right corner of the medium
# variant only. Thumbnails are never watermarked. The label is sized to
# 8% of the image width, clamped to 100-250px.
[watermark]
enabled = false
text = "© Gallery"
font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
opacity = 0.8

# Parallel processing. Images are encoded in batches of batch_size to bound
# peak memory; max_workers caps the worker pool (omit for all CPU cores).
[processing]
batch_size = 3
# max_workers = 4
"##
}
