//! Configuration infrastructure
//!
//! Application settings persisted as JSON in the user's configuration
//! directory. Missing sections and fields fall back to [`defaults`], so a
//! config file written by an older build keeps loading.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

pub use super::parsing::config::{ParsingConfig, PostSelectors};

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Selectors and srcset handling for page extraction
    pub parsing: ParsingConfig,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs in the log file
    pub json_format: bool,

    /// Enable console output (stderr)
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; next to the executable when unset
    pub directory: Option<PathBuf>,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Keep only the most recent log file (delete all others)
    pub keep_only_latest: bool,

    /// Module-specific log level filters (e.g., "html5ever": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            directory: None,
            max_files: defaults::LOG_MAX_FILES,
            auto_cleanup_logs: defaults::LOG_AUTO_CLEANUP,
            keep_only_latest: defaults::LOG_KEEP_ONLY_LATEST,
            module_filters: defaults::LOG_MODULE_FILTERS
                .iter()
                .map(|(module, level)| ((*module).to_string(), (*level).to_string()))
                .collect(),
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Manager for the per-user configuration file
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Manager for an explicit configuration file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read configuration file: {:?}", self.config_path))?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("Configuration file is invalid: {}", parse_error);

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                self.reset_to_defaults().await
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Reset configuration to defaults
    pub async fn reset_to_defaults(&self) -> Result<AppConfig> {
        info!("Resetting configuration to defaults");
        let default_config = AppConfig::default();
        self.save_config(&default_config).await?;
        Ok(default_config)
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default values and the markup contract of the blog
pub mod defaults {
    /// Directory name under the user's config directory
    pub const APP_DIR_NAME: &str = "maoureu-scraper";

    /// Configuration file name
    pub const CONFIG_FILE_NAME: &str = "maoureu_scraper_config.json";

    // Markup contract
    pub const DATE_SELECTOR: &str = "div.post-header > p.post-date";
    pub const TITLE_SELECTOR: &str = "div.post-header > h1.post-title";
    pub const PARAGRAPHS_SELECTOR: &str = "div.post-content > p";
    pub const IMAGES_SELECTOR: &str = "div.post-container noscript > img";
    pub const POST_LINKS_SELECTOR: &str = "div.posts > a.post";

    // Log configuration defaults
    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = false;

    /// Default maximum log files to keep
    pub const LOG_MAX_FILES: u32 = 5;

    pub const LOG_AUTO_CLEANUP: bool = true;

    pub const LOG_KEEP_ONLY_LATEST: bool = false;

    /// HTML parser internals are only interesting at trace level
    pub const LOG_MODULE_FILTERS: &[(&str, &str)] = &[
        ("html5ever", "warn"),
        ("selectors", "warn"),
        ("tokio", "info"),
    ];

    /// Base name of the log file
    pub const LOG_FILE_NAME: &str = "maoureu-scraper.log";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::SrcSetMode;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));

        let config = manager.load_config().await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(manager.config_path().exists());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_changes() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json"));

        let mut config = manager.load_config().await.unwrap();
        config.parsing.srcset_mode = SrcSetMode::Strict;
        config.parsing.selectors.title = "h2.title".to_string();
        manager.save_config(&config).await.unwrap();

        let config = manager.load_config().await.unwrap();
        assert_eq!(config.parsing.srcset_mode, SrcSetMode::Strict);
        assert_eq!(config.parsing.selectors.title, "h2.title");
        assert_eq!(config.parsing.selectors.date, defaults::DATE_SELECTOR);
    }

    #[tokio::test]
    async fn test_corrupted_file_is_backed_up_and_reset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let manager = ConfigManager::with_path(&path);
        let config = manager.load_config().await.unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(path.with_extension("json.corrupted").exists());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{ "logging": { "level": "debug" } }"#).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.console_output);
        assert_eq!(config.parsing, ParsingConfig::default());
    }
}
