//! Configuration Module - User preferences from the platform config dir
//!
//! Supports:
//! - Log level
//! - Application search directories
//! - Licence store root and read timeout

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::discovery::{self, DiscoveryOptions};
use crate::licence;

/// live-probe configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Where to look for installations
    pub discovery: DiscoveryConfig,
    /// Licence store settings
    pub licence: LicenceConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
    /// Emit logs as JSON lines instead of the compact text format
    pub json_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Directories searched for application bundles
    pub search_dirs: Vec<PathBuf>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_dirs: discovery::default_search_dirs(),
        }
    }
}

/// Licence store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenceConfig {
    /// Root of the per-version stores (None = ~/Library/Application Support/Ableton)
    pub store_root: Option<PathBuf>,
    /// Give up reading a store after this many milliseconds
    pub read_timeout_ms: u64,
}

impl Default for LicenceConfig {
    fn default() -> Self {
        Self {
            store_root: None,
            read_timeout_ms: licence::DEFAULT_READ_TIMEOUT.as_millis() as u64,
        }
    }
}

impl LicenceConfig {
    pub fn store_root(&self) -> PathBuf {
        self.store_root
            .clone()
            .unwrap_or_else(licence::default_store_root)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Config {
    /// Load config from default path or return defaults
    pub fn load() -> Self {
        Self::load_from(&Self::default_path()).unwrap_or_default()
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "live-probe", "live-probe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".live-probe")
                    .join("config.toml")
            })
    }

    /// Create default config file if it doesn't exist
    pub fn ensure_exists() -> Result<PathBuf> {
        let path = Self::default_path();
        if !path.exists() {
            let config = Config::default();
            config.save_to(&path)?;
            tracing::info!("Created default config at {}", path.display());
        }
        Ok(path)
    }

    /// Discovery options built from this config
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            search_dirs: self.discovery.search_dirs.clone(),
            store_root: self.licence.store_root(),
            read_timeout: self.licence.read_timeout(),
            host_version: None,
        }
    }
}

/// Generate a sample config file with comments
pub fn generate_sample_config() -> String {
    r#"# live-probe Configuration

[general]
# Log level: trace, debug, info, warn, error
log_level = "info"

# Write logs to stderr as JSON lines
json_logs = false

[discovery]
# Directories whose immediate children are checked for Live bundles
search_dirs = ["/Applications"]

[licence]
# Root holding "Live x.y.z/Unlock/Unlock.cfg" (defaults to
# ~/Library/Application Support/Ableton)
# store_root = "/Users/me/Library/Application Support/Ableton"

# Give up reading a licence store after this many milliseconds
read_timeout_ms = 5000
"#
    .to_string()
}
