//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub clipboard: ClipboardConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Clipboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Try the system clipboard before the copy command
    #[serde(default = "default_primary")]
    pub primary: bool,
    /// Copy command argv, e.g. ["xclip", "-selection", "clipboard"]
    #[serde(default)]
    pub fallback_command: Option<Vec<String>>,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            fallback_command: None,
        }
    }
}

fn default_primary() -> bool {
    true
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// How long "Copied!" stays on a button, in milliseconds
    #[serde(default = "default_feedback_ms")]
    pub feedback_ms: u64,
    /// Title shown in the header
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            feedback_ms: default_feedback_ms(),
            title: default_title(),
        }
    }
}

fn default_feedback_ms() -> u64 {
    1200
}

fn default_title() -> String {
    "clipdeck".to_string()
}

impl DisplayConfig {
    pub fn feedback_duration(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }
}

impl Config {
    /// Load configuration from default location.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if config_path.exists() {
            Self::from_file(&config_path.to_string_lossy())
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: &str) -> Result<Self> {
        let expanded = expand_path(path);
        let content = std::fs::read_to_string(&expanded)
            .with_context(|| format!("Failed to read config file {}", expanded))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", expanded))
    }

    fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the default config path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("clipdeck")
            .join("config.toml")
    }

    /// Get the data directory, where the log file lives.
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("clipdeck")
    }
}

/// Expand ~ to home directory.
pub fn expand_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.clipboard.primary);
        assert_eq!(config.clipboard.fallback_command, None);
        assert_eq!(config.display.feedback_duration(), Duration::from_millis(1200));
        assert_eq!(config.display.title, "clipdeck");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [clipboard]
            primary = false
            fallback_command = ["xsel", "--clipboard", "--input"]
            "#,
        )
        .unwrap();

        assert!(!config.clipboard.primary);
        assert_eq!(
            config.clipboard.fallback_command.as_deref(),
            Some(&["xsel".to_string(), "--clipboard".to_string(), "--input".to_string()][..])
        );
        assert_eq!(config.display.feedback_ms, 1200);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = Config::from_toml("").unwrap();
        assert!(config.clipboard.primary);
        assert_eq!(config.display.feedback_ms, 1200);
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(Config::from_toml("[display]\nfeedback_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::from_file("/nonexistent/clipdeck/config.toml").is_err());
    }

    #[test]
    fn test_expand_path_leaves_absolute_paths() {
        assert_eq!(expand_path("/etc/clipdeck.toml"), "/etc/clipdeck.toml");
    }
}
