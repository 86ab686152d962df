//! Application configuration management.
//!
//! Configuration is stored at `~/.config/pinboard/config.json`. Every field
//! is optional; `PINBOARD_API_URL` in the environment (or a `.env` file
//! loaded by the binary) overrides the API location.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_BASE_URL;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "pinboard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "PINBOARD_API_URL";

/// Number of discovery images requested when not configured.
pub const DEFAULT_DISCOVERY_COUNT: u32 = 12;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub discovery_count: Option<u32>,
    /// Overrides the per-origin cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Set from the command line; beats the environment and the file.
    #[serde(skip)]
    api_base_url_override: Option<String>,
}

impl Config {
    /// Load from `explicit_path`, or from the default location. A missing
    /// default file yields the default config; a missing explicit file is an
    /// error.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(p) if !p.exists() => {
                anyhow::bail!("Config file not found: {}", p.display())
            }
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn override_api_base_url(&mut self, url: impl Into<String>) {
        self.api_base_url_override = Some(url.into());
    }

    /// Command-line override, then the environment, then the config file,
    /// then the default.
    pub fn api_base_url(&self) -> String {
        let env = self
            .api_base_url_override
            .clone()
            .or_else(|| std::env::var(API_URL_ENV).ok());
        Self::resolve_api_base_url(env, self.api_base_url.as_deref())
    }

    fn resolve_api_base_url(env: Option<String>, file: Option<&str>) -> String {
        env.filter(|v| !v.trim().is_empty())
            .or_else(|| file.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string()
    }

    pub fn discovery_count(&self) -> u32 {
        self.discovery_count.unwrap_or(DEFAULT_DISCOVERY_COUNT)
    }

    /// Cache directory for the configured API. Each origin gets its own
    /// directory so two servers never share a cached feed.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(origin_slug(&self.api_base_url())))
    }
}

/// Filesystem-safe name for an API origin, e.g. `localhost_8000`.
fn origin_slug(base_url: &str) -> String {
    let without_scheme = base_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(base_url);
    let host = without_scheme.split('/').next().unwrap_or(without_scheme);
    host.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}
