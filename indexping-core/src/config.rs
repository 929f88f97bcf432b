//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/indexping/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/indexping/` (~/.config/indexping/)
//! - Data: `$XDG_DATA_HOME/indexping/` (~/.local/share/indexping/)
//! - State/Logs: `$XDG_STATE_HOME/indexping/` (~/.local/state/indexping/)
//!
//! Static settings (site address, endpoint, content rules) live here. Mutable
//! state such as the key and the last error lives in the option store.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default IndexNow aggregation endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.indexnow.org/indexnow";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Site being announced
    #[serde(default)]
    pub site: SiteConfig,

    /// Endpoint and request settings
    #[serde(default)]
    pub indexnow: IndexNowConfig,

    /// Which content is announced and how its URLs are derived
    #[serde(default)]
    pub content: ContentConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Site configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct SiteConfig {
    /// Canonical base address, e.g. `https://example.com/`
    pub url: Option<String>,
}

/// IndexNow endpoint configuration
#[derive(Debug, Deserialize, Clone)]
pub struct IndexNowConfig {
    /// Submission endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for IndexNowConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    5
}

/// Content qualification rules
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// Content types that trigger a submission
    #[serde(default = "default_supported_types")]
    pub supported_types: Vec<String>,

    /// Taxonomies whose listing pages are announced alongside an item, per type
    #[serde(default = "default_taxonomies")]
    pub taxonomies: BTreeMap<String, Vec<String>>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            supported_types: default_supported_types(),
            taxonomies: default_taxonomies(),
        }
    }
}

fn default_supported_types() -> Vec<String> {
    vec!["post".to_string(), "page".to_string(), "product".to_string()]
}

fn default_taxonomies() -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    map.insert(
        "post".to_string(),
        vec!["category".to_string(), "post_tag".to_string()],
    );
    map.insert(
        "product".to_string(),
        vec!["product_cat".to_string(), "product_tag".to_string()],
    );
    map
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration, returning an error describing the first problem
    pub fn validate(&self) -> Result<()> {
        if self.indexnow.endpoint.trim().is_empty() {
            return Err(Error::Config("indexnow.endpoint must not be empty".to_string()));
        }
        if self.indexnow.timeout_secs == 0 {
            return Err(Error::Config(
                "indexnow.timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Some(url) = &self.site.url {
            url::Url::parse(url)
                .map_err(|e| Error::Config(format!("site.url {:?} is invalid: {}", url, e)))?;
        }
        Ok(())
    }

    /// Returns the site URL or a configuration error if it was never set
    pub fn site_url(&self) -> Result<&str> {
        self.site
            .url
            .as_deref()
            .ok_or_else(|| Error::Config("site.url is required".to_string()))
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/indexping/config.toml` (~/.config/indexping/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("indexping").join("config.toml")
    }

    /// Returns the data directory path (for the option store)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("indexping")
    }

    /// Returns the state directory path (for logs)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("indexping")
    }

    /// Returns the option store database path
    ///
    /// `$XDG_DATA_HOME/indexping/options.db` (~/.local/share/indexping/options.db)
    pub fn store_path() -> PathBuf {
        Self::data_dir().join("options.db")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("indexping.log")
    }
}
