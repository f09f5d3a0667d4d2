//! Gallery configuration.
//!
//! Handles loading, validating, and merging `gallery.toml`. The file is
//! optional and lives in the images root next to the generated manifest:
//!
//! ```text
//! images/
//! ├── gallery.toml        # Optional overrides (stock defaults otherwise)
//! ├── manifest.json       # Written by `carousel-gallery build`
//! ├── signs/
//! ├── service-signs/
//! └── Misc/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! categories = ["signs", "jewelry", "decor", "personalized",
//!               "stickers", "stencils", "custom", "events"]
//! service_categories = ["service-signs", "service-jewelry", ...]
//! misc_dir = "Misc"
//! misc_label = "Background"
//! extensions = ["jpg", "jpeg", "png", "webp", "gif", "heic", "heif"]
//! manifest_file = "manifest.json"
//! url_prefix = "images"
//!
//! [carousel]
//! autoplay_ms = 4000        # Auto-play period (desktop only)
//! settle_ms = 500           # Pause between discovery and carousel setup
//! mobile_settle_ms = 200
//! mobile_stagger_ms = 100   # Extra delay before each mobile carousel
//!
//! [heic]
//! fetch_timeout_ms = 10000
//! convert_timeout_ms = 15000
//! quality = 0.9
//!
//! [probe]
//! enabled = true            # Filename probing when the manifest is missing
//! max_index = 50
//!
//! [errors]
//! threshold = 10            # Errors tolerated before auto-play is disabled
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Name of the optional config file inside the images root.
pub const CONFIG_FILENAME: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Product categories. Each names a directory and a `{category}-carousel` track.
    pub categories: Vec<String>,
    /// Service-card background directories (`service-{category}`).
    pub service_categories: Vec<String>,
    /// Directory holding section background images.
    pub misc_dir: String,
    /// Alt-text label used for misc entries.
    pub misc_label: String,
    /// Allowed raster extensions, lowercase, without the dot.
    pub extensions: Vec<String>,
    /// Manifest file name, written inside the images root.
    pub manifest_file: String,
    /// URL prefix for manifest paths (`{url_prefix}/{dir}/{file}`).
    pub url_prefix: String,
    pub carousel: CarouselConfig,
    pub heic: HeicConfig,
    pub probe: ProbeConfig,
    pub errors: ErrorsConfig,
}

/// The eight product categories the site ships with.
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "signs",
    "jewelry",
    "decor",
    "personalized",
    "stickers",
    "stencils",
    "custom",
    "events",
];

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            service_categories: DEFAULT_CATEGORIES
                .iter()
                .map(|c| format!("service-{c}"))
                .collect(),
            misc_dir: "Misc".to_string(),
            misc_label: "Background".to_string(),
            extensions: ["jpg", "jpeg", "png", "webp", "gif", "heic", "heif"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            manifest_file: "manifest.json".to_string(),
            url_prefix: "images".to_string(),
            carousel: CarouselConfig::default(),
            heic: HeicConfig::default(),
            probe: ProbeConfig::default(),
            errors: ErrorsConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::Validation(
                "categories must not be empty".into(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "extensions must not be empty".into(),
            ));
        }
        if self.carousel.autoplay_ms == 0 {
            return Err(ConfigError::Validation(
                "carousel.autoplay_ms must be positive".into(),
            ));
        }
        if self.heic.fetch_timeout_ms == 0 || self.heic.convert_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "heic timeouts must be positive".into(),
            ));
        }
        if !(self.heic.quality > 0.0 && self.heic.quality <= 1.0) {
            return Err(ConfigError::Validation(
                "heic.quality must be in (0, 1]".into(),
            ));
        }
        if self.probe.max_index == 0 {
            return Err(ConfigError::Validation(
                "probe.max_index must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Whether `ext` (any case, no dot) is in the allow-list.
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Carousel timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// Auto-play period in milliseconds.
    pub autoplay_ms: u64,
    /// Delay between discovery and carousel construction on desktop.
    pub settle_ms: u64,
    /// Same delay on touch-primary devices.
    pub mobile_settle_ms: u64,
    /// Extra delay before each carousel is constructed on touch-primary devices.
    pub mobile_stagger_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            autoplay_ms: 4000,
            settle_ms: 500,
            mobile_settle_ms: 200,
            mobile_stagger_ms: 100,
        }
    }
}

impl CarouselConfig {
    pub fn autoplay_period(&self) -> Duration {
        Duration::from_millis(self.autoplay_ms)
    }
}

/// HEIC/HEIF conversion bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeicConfig {
    pub fetch_timeout_ms: u64,
    pub convert_timeout_ms: u64,
    /// JPEG quality handed to the converter, in `(0, 1]`.
    pub quality: f32,
}

impl Default for HeicConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            convert_timeout_ms: 15_000,
            quality: 0.9,
        }
    }
}

impl HeicConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn convert_timeout(&self) -> Duration {
        Duration::from_millis(self.convert_timeout_ms)
    }
}

/// Filename probing fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    pub enabled: bool,
    /// Highest image index tried per pattern (starting at 1).
    pub max_index: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_index: 50,
        }
    }
}

/// Circuit-breaker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorsConfig {
    /// Auto-play is disabled everywhere once the error count exceeds this.
    pub threshold: u32,
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self { threshold: 10 }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, arrays included.
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

/// Load `gallery.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `gallery.toml` in the images root, falling back to defaults.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `gallery.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Carousel Gallery Configuration
# ==============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Product categories: one directory and one carousel each.
categories = ["signs", "jewelry", "decor", "personalized", "stickers", "stencils", "custom", "events"]

# Service-card background directories. "service-signs" becomes manifest key "signs-bg".
service_categories = ["service-signs", "service-jewelry", "service-decor", "service-personalized", "service-stickers", "service-stencils", "service-custom", "service-events"]

# Directory with section background images (manifest key "misc").
misc_dir = "Misc"

# Alt-text prefix for misc images.
misc_label = "Background"

# Raster formats picked up by the manifest builder (case-insensitive).
extensions = ["jpg", "jpeg", "png", "webp", "gif", "heic", "heif"]

# Manifest written inside the images directory.
manifest_file = "manifest.json"

# URL prefix used for manifest paths.
url_prefix = "images"

# ---------------------------------------------------------------------------
# Carousel timing (milliseconds)
# ---------------------------------------------------------------------------
[carousel]
# Auto-play period. Auto-play never runs on touch-primary devices.
autoplay_ms = 4000

# Pause between image discovery and carousel setup.
settle_ms = 500
mobile_settle_ms = 200

# Extra delay before each carousel is set up on touch-primary devices.
mobile_stagger_ms = 100

# ---------------------------------------------------------------------------
# HEIC/HEIF conversion
# ---------------------------------------------------------------------------
[heic]
fetch_timeout_ms = 10000
convert_timeout_ms = 15000

# JPEG quality handed to the converter, in (0, 1].
quality = 0.9

# ---------------------------------------------------------------------------
# Filename probing (used when manifest.json is missing)
# ---------------------------------------------------------------------------
[probe]
enabled = true

# Tries indices 1..=max_index across 8 patterns and 12 extensions.
max_index = 50

# ---------------------------------------------------------------------------
# Error circuit breaker
# ---------------------------------------------------------------------------
[errors]
# Auto-play is disabled on every carousel once more errors than this occur.
threshold = 10
"##
}
