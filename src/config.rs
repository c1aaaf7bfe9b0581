//! Backend configuration storage.
//!
//! Resolves which hosted catalog to talk to and persists the choice in
//! `~/.antiqkart/config.json` (or a custom data directory).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Environment variable carrying the full configuration as JSON
pub const BACKEND_ENV: &str = "ANTIQKART_BACKEND";
pub const API_URL_ENV: &str = "ANTIQKART_API_URL";
pub const API_KEY_ENV: &str = "ANTIQKART_API_KEY";

/// Connection settings stored in config.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    #[serde(alias = "apiURL", alias = "url")]
    pub api_url: String,
    /// Public (anonymous) key of the hosted project
    #[serde(alias = "anonKey", alias = "key")]
    pub anon_key: String,
}

/// Where the active configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    BackendEnv,
    SplitEnv,
    File,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::BackendEnv => write!(f, "{} environment variable", BACKEND_ENV),
            ConfigSource::SplitEnv => {
                write!(f, "{} + {} environment variables", API_URL_ENV, API_KEY_ENV)
            }
            ConfigSource::File => write!(f, "config file"),
        }
    }
}

/// Resolve the data directory: explicit path or `~/.antiqkart`.
pub fn resolve_data_dir(data_dir: Option<String>) -> Result<PathBuf> {
    let base_dir = match data_dir {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .context("Could not determine home directory")?
            .join(".antiqkart"),
    };

    std::fs::create_dir_all(&base_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", base_dir))?;

    Ok(base_dir)
}

/// Configuration store
///
/// Priority when reading:
/// 1. ANTIQKART_BACKEND environment variable (JSON format)
/// 2. ANTIQKART_API_URL + ANTIQKART_API_KEY environment variables
/// 3. config.json in the data directory
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            config_path: data_dir.join("config.json"),
        }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Parse configuration from a JSON string, rejecting blank fields
    fn parse_config(raw: &str) -> Option<BackendConfig> {
        match serde_json::from_str::<BackendConfig>(raw) {
            Ok(config) => {
                if config.api_url.trim().is_empty() || config.anon_key.trim().is_empty() {
                    warn!("Backend configuration is missing the API URL or key");
                    return None;
                }
                Some(config)
            }
            Err(e) => {
                warn!("Failed to parse backend configuration JSON: {}", e);
                None
            }
        }
    }

    /// Get the active configuration and where it came from
    pub fn load(&self) -> Result<Option<(BackendConfig, ConfigSource)>> {
        if let Ok(raw) = std::env::var(BACKEND_ENV) {
            if let Some(config) = Self::parse_config(&raw) {
                return Ok(Some((config, ConfigSource::BackendEnv)));
            }
        }

        if let (Ok(api_url), Ok(anon_key)) = (std::env::var(API_URL_ENV), std::env::var(API_KEY_ENV))
        {
            if !api_url.is_empty() && !anon_key.is_empty() {
                return Ok(Some((BackendConfig { api_url, anon_key }, ConfigSource::SplitEnv)));
            }
        }

        if !self.config_path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to read config file: {}", e);
                return Err(e).with_context(|| {
                    format!("Failed to read config file: {:?}", self.config_path)
                });
            }
        };

        if let Some(config) = Self::parse_config(&content) {
            return Ok(Some((config, ConfigSource::File)));
        }

        warn!("Invalid backend configuration found, removing config file");
        let _ = self.remove();
        Ok(None)
    }

    /// Get the active configuration or fail with a hint
    pub fn require(&self) -> Result<BackendConfig> {
        match self.load()? {
            Some((config, source)) => {
                debug!("Using backend configuration from {}", source);
                Ok(config)
            }
            None => anyhow::bail!(
                "No catalog backend configured. Run 'antiqkart configure --api-url <URL> --api-key <KEY>' \
                 or set {} and {}.",
                API_URL_ENV,
                API_KEY_ENV
            ),
        }
    }

    /// Persist a configuration
    pub fn save(&self, config: &BackendConfig) -> Result<()> {
        if Self::parse_config(&serde_json::to_string(config)?).is_none() {
            anyhow::bail!("API URL and key must not be empty");
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
        std::fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", self.config_path))?;

        info!("Configuration saved successfully");
        debug!("Configuration saved to {:?}", self.config_path);
        Ok(())
    }

    /// Remove the stored configuration
    pub fn remove(&self) -> Result<()> {
        if self.config_path.exists() {
            std::fs::remove_file(&self.config_path).with_context(|| {
                format!("Failed to remove config file: {:?}", self.config_path)
            })?;
        }

        info!("Configuration removed");
        Ok(())
    }
}
