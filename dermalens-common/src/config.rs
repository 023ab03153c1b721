//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is a single TOML file. Every field has a built-in
//! default, so a missing file (or a missing section) never prevents startup.
//!
//! # Resolution priority
//! 1. Explicit path passed by the host application
//! 2. `DERMALENS_CONFIG` environment variable
//! 3. Platform config directory (`~/.config/dermalens/config.toml` on Linux)
//! 4. Built-in defaults
//!
//! Scoring weights and trend thresholds are policy constants and are
//! deliberately absent from this file.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "DERMALENS_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct InsightsConfig {
    pub logging: LoggingConfig,
    pub explanations: ExplanationConfig,
    pub recommendations: RecommendationConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Explanation cache configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExplanationConfig {
    /// Days before a cached explanation is regenerated
    pub ttl_days: u32,

    /// Deadline for a single explanation request before the template is shown
    pub generation_timeout_ms: u64,
}

impl ExplanationConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.ttl_days))
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }
}

impl Default for ExplanationConfig {
    fn default() -> Self {
        Self {
            ttl_days: 7,
            generation_timeout_ms: 8000,
        }
    }
}

/// Recommendation ranking configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Items kept per product category
    pub top_per_category: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self { top_per_category: 3 }
    }
}

impl InsightsConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: InsightsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Resolve and load configuration following the priority order
    ///
    /// A file that cannot be found falls back to defaults with a warning.
    /// A file that exists but cannot be parsed is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match resolve_config_path(explicit) {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                info!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.explanations.ttl_days == 0 {
            return Err(Error::InvalidInput(
                "explanations.ttl_days must be at least 1".to_string(),
            ));
        }
        if self.explanations.generation_timeout_ms == 0 {
            return Err(Error::InvalidInput(
                "explanations.generation_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pick the config file path to load, without checking the final candidate
///
/// Explicit and environment paths are returned even if missing so the caller
/// can warn about them; the platform default is only returned if it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: explicit path
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    // Priority 2: environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: platform config directory
    default_config_path().filter(|path| path.exists())
}

/// Platform config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dermalens").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InsightsConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
        assert_eq!(config.explanations.ttl_days, 7);
        assert_eq!(config.explanations.ttl(), chrono::Duration::days(7));
        assert_eq!(
            config.explanations.generation_timeout(),
            Duration::from_millis(8000)
        );
        assert_eq!(config.recommendations.top_per_category, 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = InsightsConfig::from_toml_str(
            r#"
            [explanations]
            ttl_days = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.explanations.ttl_days, 3);
        assert_eq!(config.explanations.generation_timeout_ms, 8000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = InsightsConfig::from_toml_str("").unwrap();
        assert_eq!(config, InsightsConfig::default());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let result = InsightsConfig::from_toml_str("[explanations]\nttl_days = 0\n");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result =
            InsightsConfig::from_toml_str("[explanations]\ngeneration_timeout_ms = 0\n");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = InsightsConfig::from_toml_str("[logging\nlevel = ");
        assert!(matches!(result, Err(Error::TomlParse(_))));
    }
}
