//! Configuration loading for photo-search-mcp
//!
//! Configuration is loaded from:
//! 1. Environment variables PHOTO_FEED_URL, PHOTO_FEED_TRANSPORT, PHOTO_SEARCH_HISTORY_DIR
//! 2. Environment variable PHOTO_SEARCH_CONFIG_PATH
//! 3. ~/.binks/photo-search.toml
//! 4. Default values

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::DEFAULT_PAGE_SIZE;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Feed endpoint configuration
    #[serde(default)]
    pub feed: FeedConfig,
    /// Search history persistence
    #[serde(default)]
    pub history: HistoryConfig,
    /// Initial view parameters
    #[serde(default)]
    pub view: ViewConfig,
    /// Usage event tracking
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// How the feed is requested
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Bare JSON (`nojsoncallback=1`), e.g. through a same-origin proxy
    #[default]
    Direct,
    /// Callback-wrapped JSON (`jsoncallback=<name>`)
    Callback,
}

impl std::str::FromStr for TransportKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" | "proxy" => Ok(TransportKind::Direct),
            "callback" | "jsonp" => Ok(TransportKind::Callback),
            other => Err(anyhow!("unknown feed transport '{}'", other)),
        }
    }
}

/// Feed endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Full URL of the public photo feed (or of the proxy in front of it)
    #[serde(default = "default_feed_url")]
    pub base_url: String,
    #[serde(default)]
    pub transport: TransportKind,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Search history persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Directory holding the storage slots
    #[serde(default = "default_history_dir")]
    pub dir: PathBuf,
    /// Slot name for the history list
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Off unless explicitly enabled
    #[serde(default)]
    pub enabled: bool,
}

// Default value functions
fn default_feed_url() -> String {
    "https://www.flickr.com/services/feeds/photos_public.gne".to_string()
}

fn default_user_agent() -> String {
    "photo-search-mcp/0.1".to_string()
}

fn default_history_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".binks")
        .join("photo-search")
}

fn default_storage_key() -> String {
    "flickr_search_history".to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_url(),
            transport: TransportKind::default(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: default_history_dir(),
            storage_key: default_storage_key(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(_) => {
                tracing::info!("Config file not found, using defaults");
                Self::default()
            }
            None => {
                tracing::info!("No config path specified, using defaults");
                Self::default()
            }
        };

        config.apply_env()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!("Loading config from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Environment overrides (highest priority)
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("PHOTO_FEED_URL") {
            self.feed.base_url = url;
        }
        if let Ok(transport) = std::env::var("PHOTO_FEED_TRANSPORT") {
            self.feed.transport = transport.parse()?;
        }
        if let Ok(dir) = std::env::var("PHOTO_SEARCH_HISTORY_DIR") {
            self.history.dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Find the configuration file path
    fn find_config_path() -> Option<PathBuf> {
        // 1. Check environment variable
        if let Ok(path) = std::env::var("PHOTO_SEARCH_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        // 2. Check ~/.binks/photo-search.toml
        dirs::home_dir().map(|home| home.join(".binks").join("photo-search.toml"))
    }
}
