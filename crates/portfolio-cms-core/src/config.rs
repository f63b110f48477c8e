//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API root, the request timeout, and the last email used
//! on the login form.
//!
//! Configuration is stored at `~/.config/portfolio-cms/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_REQUEST_TIMEOUT;

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "portfolio-cms";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the configured API root
pub const API_URL_ENV: &str = "PORTFOLIO_CMS_API_URL";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4001/api";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for persisted session storage and log files
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// API root, with the environment taking precedence over the file
    pub fn api_base_url(&self) -> String {
        resolve_base_url(std::env::var(API_URL_ENV).ok(), self.api_base_url.as_deref())
    }

    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_secs {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// env > file > default. Blank values are skipped.
pub fn resolve_base_url(env: Option<String>, configured: Option<&str>) -> String {
    env.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| configured.map(str::trim).filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_API_BASE_URL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_base_url_precedence() {
        assert_eq!(
            resolve_base_url(Some("http://env/api".into()), Some("http://file/api")),
            "http://env/api"
        );
        assert_eq!(resolve_base_url(None, Some("http://file/api")), "http://file/api");
        assert_eq!(resolve_base_url(None, None), DEFAULT_API_BASE_URL);
        assert_eq!(
            resolve_base_url(Some("  ".into()), Some("http://file/api")),
            "http://file/api"
        );
        assert_eq!(resolve_base_url(None, Some("")), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_request_timeout() {
        assert_eq!(Config::default().request_timeout(), DEFAULT_REQUEST_TIMEOUT);
        let config = Config {
            request_timeout_secs: Some(5),
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        let zero = Config {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let config = Config {
            api_base_url: Some("https://cms.example.com/api".into()),
            request_timeout_secs: Some(10),
            last_email: Some("jane@x.com".into()),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
