use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
}

/// Watch synchronization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Connectivity/file-list refresh interval in seconds
    pub refresh_interval_secs: u64,
    /// Retries after a failed request send (initial attempt not counted)
    pub request_retries: u32,
    /// Fixed delay between request retries in milliseconds
    pub request_retry_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 5,
            request_retries: 3,
            request_retry_delay_ms: 2000,
        }
    }
}

/// Local storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Match file directory (empty = default data dir)
    pub match_dir: Option<String>,
    /// Directory the loopback watch serves files from (demo mode)
    pub loopback_source_dir: Option<String>,
}

/// UI customization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Show the debug log panel
    pub show_debug_log: bool,
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("bowlsync");

        fs::create_dir_all(&config_dir)
            .context("Failed to create config directory")?;

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .context("Failed to read config file")?;

            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;

            Ok(config)
        } else {
            // Create default config and save it
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(&path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.sync.refresh_interval_secs, 5);
        assert_eq!(config.sync.request_retries, 3);
        assert_eq!(config.sync.request_retry_delay_ms, 2000);
        assert_eq!(config.storage.match_dir, None);
        assert!(!config.ui.show_debug_log);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial_toml = r#"
[sync]
refresh_interval_secs = 10
"#;

        let config: Config = toml::from_str(partial_toml).unwrap();

        // Custom value
        assert_eq!(config.sync.refresh_interval_secs, 10);
        // Default values
        assert_eq!(config.sync.request_retries, 3);
        assert_eq!(config.sync.request_retry_delay_ms, 2000);
    }

    #[test]
    fn test_full_config_parsing() {
        let full_toml = r#"
[sync]
refresh_interval_secs = 30
request_retries = 5
request_retry_delay_ms = 500

[storage]
match_dir = "/custom/matches"
loopback_source_dir = "/custom/watch"

[ui]
show_debug_log = true
"#;

        let config: Config = toml::from_str(full_toml).unwrap();

        assert_eq!(config.sync.refresh_interval_secs, 30);
        assert_eq!(config.sync.request_retries, 5);
        assert_eq!(config.sync.request_retry_delay_ms, 500);
        assert_eq!(config.storage.match_dir, Some("/custom/matches".to_string()));
        assert_eq!(
            config.storage.loopback_source_dir,
            Some("/custom/watch".to_string())
        );
        assert!(config.ui.show_debug_log);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(
            config.sync.refresh_interval_secs,
            deserialized.sync.refresh_interval_secs
        );
        assert_eq!(config.sync.request_retries, deserialized.sync.request_retries);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let invalid_toml = "this is not valid [[ toml";
        let result: Result<Config, _> = toml::from_str(invalid_toml);
        assert!(result.is_err());
    }
}
