//! Configuration management for storefront
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `STOREFRONT_` prefix, `__` for nesting)
//! 2. An explicit file passed with `--config`
//! 3. `./storefront.toml`
//! 4. `~/.config/storefront/config.toml` (user config)
//! 5. Hardcoded defaults (fallback)
//!
//! Nothing is required: every setting has a default, and the CLI can run
//! without any file or variable present.
//!
//! # Example Configuration
//!
//! ```toml
//! # storefront.toml
//! [templates]
//! root = "."
//! excluded_dirs = ["components", "shared", "tools", "tests"]
//!
//! [validation]
//! eager_image_budget = 2
//! inline_block_limit_bytes = 8192
//!
//! [output]
//! color = true
//! log_format = "compact"
//!
//! [preview]
//! port = 8080
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Where templates live and which directories are not templates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Directory whose immediate children are template directories
    pub root: PathBuf,

    /// Infrastructure directories never treated as templates
    pub excluded_dirs: Vec<String>,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            excluded_dirs: ["components", "shared", "tools", "tests"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Thresholds used by the rule catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Images assumed to sit in the first viewport (exempt from lazy loading)
    pub eager_image_budget: usize,

    /// Largest inline `<style>`/`<script>` body before it is reported
    pub inline_block_limit_bytes: usize,

    /// Largest HTML document before it is reported
    pub max_document_bytes: usize,

    /// Shortest acceptable `<title>`
    pub title_min_chars: usize,

    /// Longest acceptable `<title>`
    pub title_max_chars: usize,

    /// Shortest acceptable meta description
    pub description_min_chars: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            eager_image_budget: 2,
            inline_block_limit_bytes: 8 * 1024,
            max_document_bytes: 100 * 1024,
            title_min_chars: 10,
            title_max_chars: 70,
            description_min_chars: 50,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable events (default)
    #[default]
    Compact,
    /// Multi-line human readable events
    Pretty,
    /// Newline-delimited JSON events
    Json,
}

/// Terminal output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Colorize human-readable output
    pub color: bool,

    /// Format of log events written to stderr
    pub log_format: LogFormat,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            color: true,
            log_format: LogFormat::Compact,
        }
    }
}

/// Preview server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Port the preview server listens on
    pub port: u16,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Complete storefront configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorefrontConfig {
    /// Template discovery settings
    #[serde(default)]
    pub templates: TemplateSettings,

    /// Validator thresholds
    #[serde(default)]
    pub validation: ValidationSettings,

    /// Output settings
    #[serde(default)]
    pub output: OutputSettings,

    /// Preview server settings
    #[serde(default)]
    pub preview: PreviewSettings,
}

impl StorefrontConfig {
    /// Load configuration from the standard locations
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be parsed,
    /// or if a value has the wrong type.
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Load configuration, layering an explicit file above the standard ones
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - The explicit file does not exist
    /// - A configuration file contains invalid TOML syntax
    /// - Values fail type conversion
    pub fn load_with(explicit: Option<&Path>) -> Result<Self> {
        let defaults = toml::to_string(&Self::default())
            .map_err(|e| figment::Error::from(e.to_string()))?;

        let mut figment = Figment::new().merge(Toml::string(&defaults));

        let user_config = Self::recommended_path();
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from("./storefront.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(figment::Error::from(format!(
                    "config file not found: {}",
                    path.display()
                ))
                .into());
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("STOREFRONT_").split("__").lowercase(true));

        Ok(figment.extract()?)
    }

    /// Recommended user configuration path
    ///
    /// Returns `~/.config/storefront/config.toml` on Linux, the platform
    /// equivalent elsewhere, or `./storefront.toml` when no config directory
    /// can be determined.
    #[must_use]
    pub fn recommended_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./storefront.toml"),
            |config_dir| config_dir.join("storefront").join("config.toml"),
        )
    }
}
