//! Configuration loaded from an optional YAML file.
//!
//! Every field has a default, so an absent file, an empty file and a file
//! that sets only one key are all valid. Command-line flags override the
//! values found here (see [`crate::cli`]).
//!
//! ```yaml
//! scrape:
//!   start_url: https://news.ycombinator.com/news
//!   selector: "span.titleline > a"
//!   resolve_links: false
//! records:
//!   database: projects.json
//! ```

use crate::error::ConfigError;
use crate::scrapers::hacker_news::TITLE_LINK_CSS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scrape: ScrapeConfig,

    #[serde(default)]
    pub records: RecordsConfig,
}

/// Extractor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Page to fetch
    #[serde(default = "default_start_url")]
    pub start_url: String,

    /// CSS selector matching one anchor per listing
    #[serde(default = "default_selector")]
    pub selector: String,

    /// User-Agent header sent with the request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Resolve relative hrefs against `start_url`
    #[serde(default)]
    pub resolve_links: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            start_url: default_start_url(),
            selector: default_selector(),
            user_agent: default_user_agent(),
            resolve_links: false,
        }
    }
}

/// Record manager settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// JSON file holding the project collection
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

fn default_start_url() -> String {
    "https://news.ycombinator.com/news".to_string()
}

fn default_selector() -> String {
    TITLE_LINK_CSS.to_string()
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_database() -> PathBuf {
    PathBuf::from("projects.json")
}

impl Config {
    /// Load configuration from `path`, or return the defaults when `path` is `None`.
    #[instrument(level = "debug")]
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            debug!("No config file given; using defaults");
            return Ok(Self::default());
        };

        let raw = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&raw)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}
