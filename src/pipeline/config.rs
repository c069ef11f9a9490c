//! Configuration file loading for the separation pipeline.
//!
//! This module provides utilities for loading pipeline configuration
//! from TOML and JSON files.

use crate::core::{SepResult, SeparationConfig, SeparationError};
use std::path::Path;

/// Configuration file format.
#[derive(Debug, Clone, Copy)]
pub enum ConfigFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration loader for the separation pipeline.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file, auto-detecting the format from
    /// the extension.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file.
    ///
    /// # Returns
    ///
    /// A Result containing the loaded `SeparationConfig` or a
    /// `SeparationError`.
    pub fn load_from_file(path: &Path) -> SepResult<SeparationConfig> {
        let format =
            ConfigFormat::from_extension(path).ok_or_else(|| SeparationError::ConfigError {
                message: format!("Unsupported config file extension: {:?}", path.extension()),
            })?;

        let content =
            std::fs::read_to_string(path).map_err(|e| SeparationError::ConfigError {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            })?;

        Self::load_from_string(&content, format)
    }

    /// Load configuration from a string with specified format.
    pub fn load_from_string(content: &str, format: ConfigFormat) -> SepResult<SeparationConfig> {
        let config = match format {
            ConfigFormat::Toml => Self::load_from_toml(content)?,
            ConfigFormat::Json => Self::load_from_json(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn load_from_toml(content: &str) -> SepResult<SeparationConfig> {
        toml::from_str(content).map_err(|e| SeparationError::ConfigError {
            message: format!("Failed to parse TOML config: {e}"),
        })
    }

    /// Load configuration from a JSON string.
    pub fn load_from_json(content: &str) -> SepResult<SeparationConfig> {
        serde_json::from_str(content).map_err(|e| SeparationError::ConfigError {
            message: format!("Failed to parse JSON config: {e}"),
        })
    }

    /// Save configuration to a TOML string.
    pub fn save_to_toml(config: &SeparationConfig) -> SepResult<String> {
        toml::to_string_pretty(config).map_err(|e| SeparationError::ConfigError {
            message: format!("Failed to serialize config to TOML: {e}"),
        })
    }

    /// Save configuration to a JSON string.
    pub fn save_to_json(config: &SeparationConfig) -> SepResult<String> {
        serde_json::to_string_pretty(config).map_err(|e| SeparationError::ConfigError {
            message: format!("Failed to serialize config to JSON: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_format_detection() {
        assert!(matches!(
            ConfigFormat::from_extension(Path::new("pipeline.toml")),
            Some(ConfigFormat::Toml)
        ));
        assert!(matches!(
            ConfigFormat::from_extension(Path::new("pipeline.json")),
            Some(ConfigFormat::Json)
        ));
        assert!(ConfigFormat::from_extension(Path::new("pipeline.yaml")).is_none());
    }

    #[test]
    fn toml_roundtrip_preserves_thresholds() {
        let mut config = SeparationConfig::default();
        config.graphics.min_area = 2048;
        config.arbiter.overlap_threshold = 0.55;

        let toml_str = ConfigLoader::save_to_toml(&config).unwrap();
        let loaded = ConfigLoader::load_from_toml(&toml_str).unwrap();

        assert_eq!(loaded.graphics.min_area, 2048);
        assert!((loaded.arbiter.overlap_threshold - 0.55).abs() < f32::EPSILON);
    }

    #[test]
    fn json_roundtrip_preserves_thresholds() {
        let mut config = SeparationConfig::default();
        config.resolver.collapse_threshold = 0.35;

        let json_str = ConfigLoader::save_to_json(&config).unwrap();
        let loaded = ConfigLoader::load_from_json(&json_str).unwrap();

        assert!((loaded.resolver.collapse_threshold - 0.35).abs() < f32::EPSILON);
        assert_eq!(
            loaded.max_concurrent_pages,
            SeparationConfig::default().max_concurrent_pages
        );
    }

    #[test]
    fn invalid_values_are_rejected_on_load() {
        let result = ConfigLoader::load_from_string(
            r#"
            [watermark]
            relative_left = 2.0
            "#,
            ConfigFormat::Toml,
        );
        assert!(result.is_err());
    }
}
