//! Scanner configuration
//!
//! Markers and footers are the literal strings the remote program renders.
//! They change with the remote program's releases, so they live here rather
//! than in the scanner.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::buffer::SelectionPalette;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Scan configuration (loaded from config.yaml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Rows above the viewport included in the scan window
    pub lookback_lines: usize,
    /// Shortest run of slash-shaped lines reported as a menu
    pub min_slash_run: usize,
    /// Leading columns inspected for the selection color
    pub highlight_columns: usize,
    pub dismissal_marker: String,
    pub list_marker: String,
    pub detail_marker: String,
    /// Stop markers for the server list block
    pub list_footers: Vec<String>,
    /// Stop markers for the server detail block
    pub detail_footers: Vec<String>,
    pub palette: SelectionPalette,
    /// Quiescence delay before a scan runs after the last repaint
    pub quiet_period_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback_lines: 10,
            min_slash_run: 3,
            highlight_columns: 20,
            dismissal_marker: "MCP dialog dismissed".to_string(),
            list_marker: "Manage MCP servers".to_string(),
            detail_marker: " MCP Server".to_string(),
            list_footers: vec![
                "↑↓ to navigate".to_string(),
                "https://code.claude.com".to_string(),
            ],
            detail_footers: vec!["↑↓ to navigate".to_string(), "Esc to cancel".to_string()],
            palette: SelectionPalette::default(),
            quiet_period_ms: 50,
        }
    }
}

impl ScanConfig {
    /// Load from a YAML file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes to unit, not to an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_slash_run == 0 {
            return Err(ConfigError::Invalid("min_slash_run must be at least 1".to_string()));
        }
        for (field, marker) in [
            ("dismissal_marker", &self.dismissal_marker),
            ("list_marker", &self.list_marker),
            ("detail_marker", &self.detail_marker),
        ] {
            if marker.is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}
