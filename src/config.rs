//! Deployment configuration.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the project root; every key is optional and overrides the stock default.
//!
//! ## Project Layout
//!
//! ```text
//! project/
//! ├── config.toml              # Optional, overrides stock defaults
//! ├── ContentFiles/            # One content file per page
//! │   ├── 1.intro.txt
//! │   ├── 2.body.md
//! │   └── 10.appendix.txt
//! ├── template/
//! │   └── template.html        # Page template with the five anchors
//! └── DeploymentFiles/         # Generated pages + manifest.txt
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_dir = "ContentFiles"
//! template_file = "template/template.html"
//! output_dir = "DeploymentFiles"
//!
//! [manifest]
//! file_name = "manifest.txt"
//! header = "#Manifest"
//! unnumbered = "skip"       # or "trailing"
//!
//! [images]
//! marker = "PictureDeps"    # Directory every image path starts with
//! class = "content-image"   # Class of generated <img> elements
//! ```
//!
//! Unknown keys are rejected to catch typos early. Relative paths are
//! resolved against the project root.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default image directory marker.
pub const DEFAULT_IMAGE_MARKER: &str = "PictureDeps";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Deployment configuration loaded from `config.toml`.
///
/// Built once per run and passed into the pipeline; nothing reads
/// folder names or markers from anywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Directory holding the content files.
    pub content_dir: String,
    /// The HTML template every page is rendered into.
    pub template_file: String,
    /// Directory receiving the rendered pages and the manifest.
    pub output_dir: String,
    /// Manifest file settings.
    pub manifest: ManifestConfig,
    /// Image placeholder settings.
    pub images: ImagesConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            content_dir: "ContentFiles".to_string(),
            template_file: "template/template.html".to_string(),
            output_dir: "DeploymentFiles".to_string(),
            manifest: ManifestConfig::default(),
            images: ImagesConfig::default(),
        }
    }
}

impl DeployConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("content_dir", &self.content_dir),
            ("template_file", &self.template_file),
            ("output_dir", &self.output_dir),
            ("manifest.file_name", &self.manifest.file_name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.manifest.header.is_empty() || self.manifest.header.contains('\n') {
            return Err(ConfigError::Validation(
                "manifest.header must be a single non-empty line".into(),
            ));
        }
        let marker = &self.images.marker;
        if marker.is_empty() || marker.contains(['<', '>', '|', '/']) {
            return Err(ConfigError::Validation(
                "images.marker must be non-empty and free of '<', '>', '|', '/'".into(),
            ));
        }
        if self.images.class.contains('"') {
            return Err(ConfigError::Validation(
                "images.class must not contain '\"'".into(),
            ));
        }
        Ok(())
    }

    pub fn content_path(&self, root: &Path) -> PathBuf {
        root.join(&self.content_dir)
    }

    pub fn template_path(&self, root: &Path) -> PathBuf {
        root.join(&self.template_file)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }

    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        self.output_path(root).join(&self.manifest.file_name)
    }
}

/// What to do with content files that have no `N.` order prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnnumberedPolicy {
    /// Leave them out of the run entirely (they are listed as skipped).
    #[default]
    Skip,
    /// Render them after all numbered files, sorted by name, numbered on
    /// from the highest order found.
    Trailing,
}

/// Manifest file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Manifest file name inside the output directory.
    pub file_name: String,
    /// First line of the manifest.
    pub header: String,
    /// Handling of files without an order prefix.
    pub unnumbered: UnnumberedPolicy,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            file_name: "manifest.txt".to_string(),
            header: "#Manifest".to_string(),
            unnumbered: UnnumberedPolicy::Skip,
        }
    }
}

/// Image placeholder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Directory name every image path starts with.
    pub marker: String,
    /// Class attribute of generated `<img>` elements.
    pub class: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_IMAGE_MARKER.to_string(),
            class: "content-image".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(DeployConfig::default()).expect("default config must serialize")
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

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join("config.toml");
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
) -> Result<DeployConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: DeployConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the project root, over stock defaults.
pub fn load_config(root: &Path) -> Result<DeployConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# page-deploy configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
# Relative paths are resolved against the directory holding this file.

# Directory holding the content files (N.name.txt / N.name.md).
content_dir = "ContentFiles"

# HTML template every page is rendered into. It must contain a <title>,
# elements with id="header-title" and id="content-text", and the script
# objects `const titles = {...};` and `const contents = {...};`.
template_file = "template/template.html"

# Directory receiving the rendered pages and the manifest.
output_dir = "DeploymentFiles"

# ---------------------------------------------------------------------------
# Manifest
# ---------------------------------------------------------------------------
[manifest]
# Manifest file name inside output_dir.
file_name = "manifest.txt"

# First line of the manifest, followed by one "N. page.html" line per page.
header = "#Manifest"

# Content files without an "N." prefix:
#   "skip"     - not rendered, listed as skipped
#   "trailing" - rendered after all numbered files, numbered on from the
#                highest prefix in name order
unnumbered = "skip"

# ---------------------------------------------------------------------------
# Images
# ---------------------------------------------------------------------------
[images]
# Every image placeholder path starts with this directory:
#   <PictureDeps/Content/photo.png|mc>
marker = "PictureDeps"

# Class attribute of the generated <img> elements.
class = "content-image"
"##
}
