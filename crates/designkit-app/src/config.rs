//! Editor configuration.
//!
//! Values come from an optional JSON file, then environment overrides.
//! Every field has a default so an empty file (or no file) is valid.

use designkit_core::{SnapshotPolicy, parse_hex_color};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "DESIGNKIT_CONFIG";
pub const API_URL_VAR: &str = "DESIGNKIT_API_URL";
pub const TOKEN_VAR: &str = "DESIGNKIT_TOKEN";
pub const HISTORY_DEPTH_VAR: &str = "DESIGNKIT_HISTORY_DEPTH";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the design API (without the `/api/designs` suffix).
    pub api_base_url: String,
    /// Entries kept on each history stack.
    pub history_depth: usize,
    pub snapshot_policy: SnapshotPolicy,
    pub export_width: u32,
    pub export_height: u32,
    /// Export background as a CSS hex string.
    pub background_color: String,
    /// TrueType font for text rendering. Text is skipped without one.
    pub font_path: Option<PathBuf>,
    /// Bearer token for the design API.
    pub token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            history_depth: designkit_core::MAX_HISTORY_DEPTH,
            snapshot_policy: SnapshotPolicy::Always,
            export_width: 1280,
            export_height: 800,
            background_color: "#ffffff".to_string(),
            font_path: None,
            token: None,
        }
    }
}

impl AppConfig {
    /// Parse a configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from `path` (or `DESIGNKIT_CONFIG`) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
        let mut config = match path.or(env_path.as_deref()) {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in practice).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(API_URL_VAR) {
            self.api_base_url = url;
        }
        if let Some(token) = lookup(TOKEN_VAR) {
            self.token = Some(token);
        }
        if let Some(depth) = lookup(HISTORY_DEPTH_VAR) {
            self.history_depth = depth.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: HISTORY_DEPTH_VAR.to_string(),
                value: depth.clone(),
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_depth == 0 {
            return Err(invalid("history_depth", &self.history_depth));
        }
        if self.export_width == 0 {
            return Err(invalid("export_width", &self.export_width));
        }
        if self.export_height == 0 {
            return Err(invalid("export_height", &self.export_height));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(invalid("api_base_url", &self.api_base_url));
        }
        Ok(())
    }

    pub fn background(&self) -> Color {
        parse_hex_color(&self.background_color)
    }
}

fn invalid(key: &str, value: &dyn std::fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.history_depth, 10);
        assert_eq!(config.snapshot_policy, SnapshotPolicy::Always);
        assert_eq!((config.export_width, config.export_height), (1280, 800));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "snapshot_policy": "on_change" }"#).unwrap();
        assert_eq!(config.snapshot_policy, SnapshotPolicy::OnChange);
        assert_eq!(config.history_depth, 10);
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_rejects_zero_depth() {
        assert!(matches!(
            AppConfig::from_json(r#"{ "history_depth": 0 }"#),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| match key {
                API_URL_VAR => Some("https://designs.example.com".to_string()),
                TOKEN_VAR => Some("user-1".to_string()),
                HISTORY_DEPTH_VAR => Some("25".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.api_base_url, "https://designs.example.com");
        assert_eq!(config.token.as_deref(), Some("user-1"));
        assert_eq!(config.history_depth, 25);
    }

    #[test]
    fn test_bad_depth_override() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == HISTORY_DEPTH_VAR).then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { key, .. }) if key == HISTORY_DEPTH_VAR));
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::from_file(Path::new("/nonexistent/designkit.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_background_color() {
        let config = AppConfig {
            background_color: "#ff0000".to_string(),
            ..AppConfig::default()
        };
        let c = config.background().to_rgba8();
        assert_eq!([c.r, c.g, c.b, c.a], [255, 0, 0, 255]);
    }
}
