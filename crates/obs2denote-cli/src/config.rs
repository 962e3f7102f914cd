//! Configuration file support for the obs2denote CLI.
//!
//! Loads defaults from an `_obs2denote.toml` file placed next to the input;
//! explicit command-line flags always win.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "_obs2denote.toml";

/// Root configuration structure.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Output format configuration
    #[serde(skip_serializing_if = "OutputConfig::is_empty")]
    pub output: OutputConfig,
    /// Wiki-link handling
    #[serde(skip_serializing_if = "LinksConfig::is_empty")]
    pub links: LinksConfig,
    /// Asset handling
    #[serde(skip_serializing_if = "AssetsConfig::is_empty")]
    pub assets: AssetsConfig,
    /// Directory walk behavior
    #[serde(skip_serializing_if = "WalkConfig::is_empty")]
    pub walk: WalkConfig,
}

/// Output format configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "org" or "md"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl OutputConfig {
    fn is_empty(&self) -> bool {
        self.format.is_none()
    }
}

/// Wiki-link handling
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Pass wiki-links through untouched in markdown output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve: Option<bool>,
}

impl LinksConfig {
    fn is_empty(&self) -> bool {
        self.preserve.is_none()
    }
}

/// Asset handling
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// "copy", "link", or "ignore"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handling: Option<String>,
    /// Name of the assets subdirectory under the output directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl AssetsConfig {
    fn is_empty(&self) -> bool {
        self.handling.is_none() && self.dir.is_none()
    }
}

/// Directory walk behavior
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Mirror the input directory structure instead of flattening
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_structure: Option<bool>,
    /// Add folder names as tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_folder_tags: Option<bool>,
}

impl WalkConfig {
    fn is_empty(&self) -> bool {
        self.preserve_structure.is_none() && self.add_folder_tags.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `_obs2denote.toml`).
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.output.format.is_none());
        assert!(config.links.preserve.is_none());
    }

    #[test]
    fn test_parse_output_section() {
        let config: Config = toml::from_str(
            r#"
            [output]
            format = "md"
            "#,
        )
        .unwrap();

        assert_eq!(config.output.format.as_deref(), Some("md"));
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [output]
            format = "org"

            [links]
            preserve = true

            [assets]
            handling = "link"
            dir = "attachments"

            [walk]
            preserve_structure = true
            add_folder_tags = false
            "#,
        )
        .unwrap();

        assert_eq!(config.output.format.as_deref(), Some("org"));
        assert_eq!(config.links.preserve, Some(true));
        assert_eq!(config.assets.handling.as_deref(), Some("link"));
        assert_eq!(config.assets.dir.as_deref(), Some("attachments"));
        assert_eq!(config.walk.preserve_structure, Some(true));
        assert_eq!(config.walk.add_folder_tags, Some(false));
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [assets]
            handling = "ignore"
            "#,
        )
        .unwrap();

        assert_eq!(config.assets.handling.as_deref(), Some("ignore"));
        assert!(config.output.format.is_none());
        assert!(config.walk.preserve_structure.is_none());
    }

    #[test]
    fn test_roundtrip() {
        let config = Config {
            output: OutputConfig { format: Some("md".to_string()) },
            ..Config::default()
        };
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.output.format, parsed.output.format);
    }
}
