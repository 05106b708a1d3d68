//! Application configuration management.
//!
//! This module handles loading and saving the client configuration:
//! the API base URL, an optional storage directory override, and the
//! last email used to log in (for prefilling the login form).
//!
//! Configuration is stored at `~/.config/jobdeck/config.json`; the
//! `JOBDECK_API_URL` and `JOBDECK_STORAGE_DIR` environment variables
//! override the file, and `JOBDECK_CONFIG_DIR` relocates the file
//! itself (tests point it at a scratch directory).

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/storage directory paths
const APP_NAME: &str = "jobdeck";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API base URL when neither the config file nor the environment sets one
const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub storage_dir: Option<PathBuf>,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            storage_dir: None,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment beats the file, so deployments can point a build at
    /// another API without touching user config.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("JOBDECK_API_URL") {
            if !url.is_empty() {
                self.api_base_url = url;
            }
        }
        if let Ok(dir) = std::env::var("JOBDECK_STORAGE_DIR") {
            if !dir.is_empty() {
                self.storage_dir = Some(PathBuf::from(dir));
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("JOBDECK_CONFIG_DIR") {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir).join(CONFIG_FILE));
            }
        }
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Where session state lives: the explicit override, or a
    /// platform-appropriate data directory.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.storage_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_api() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:5000/api");
        assert!(config.last_email.is_none());
    }

    #[test]
    fn test_explicit_storage_dir_wins() {
        let config = Config {
            storage_dir: Some(PathBuf::from("/tmp/jobdeck-test")),
            ..Config::default()
        };
        assert_eq!(config.storage_dir().unwrap(), PathBuf::from("/tmp/jobdeck-test"));
    }

    // Env vars are process-global, so both override cases run in one test
    // to keep the parallel test runner from interleaving them.
    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        std::env::set_var("JOBDECK_API_URL", "http://api.example.com");
        std::env::set_var("JOBDECK_STORAGE_DIR", "/var/lib/jobdeck");
        config.apply_env_overrides();
        assert_eq!(config.api_base_url, "http://api.example.com");
        assert_eq!(config.storage_dir, Some(PathBuf::from("/var/lib/jobdeck")));

        // Empty values are ignored rather than clobbering the config.
        let mut config = Config::default();
        std::env::set_var("JOBDECK_API_URL", "");
        config.apply_env_overrides();
        assert_eq!(config.api_base_url, "http://localhost:5000/api");

        std::env::remove_var("JOBDECK_API_URL");
        std::env::remove_var("JOBDECK_STORAGE_DIR");
    }

    #[test]
    fn test_config_dir_override_relocates_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::env::set_var("JOBDECK_CONFIG_DIR", dir.path());

        let config = Config {
            last_email: Some("jane@x.com".to_string()),
            ..Config::default()
        };
        config.save().unwrap();
        assert!(dir.path().join("config.json").exists());

        let loaded = Config::load().unwrap();
        assert_eq!(loaded.last_email.as_deref(), Some("jane@x.com"));

        std::env::remove_var("JOBDECK_CONFIG_DIR");
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = Config {
            api_base_url: "https://api.jobdeck.io".to_string(),
            storage_dir: None,
            last_email: Some("jane@x.com".to_string()),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.api_base_url, "https://api.jobdeck.io");
        assert_eq!(back.last_email.as_deref(), Some("jane@x.com"));
    }
}
