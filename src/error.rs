//! Error types for scraping, the project collection and configuration.

use thiserror::Error;

/// Errors raised while fetching or parsing a front page.
///
/// These propagate to the caller untouched; the extractor does no recovery.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Transport failure or non-success HTTP status
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured listing selector is not valid CSS
    #[error("Invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    /// The start URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors raised by a [`ProjectStore`](crate::records::store::ProjectStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same name already exists
    #[error("Duplicate key: a project named '{0}' already exists")]
    DuplicateKey(String),

    /// IO error while reading or writing the collection file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The collection file is not valid JSON for the record layout
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced by record manager operations.
#[derive(Debug, Error)]
pub enum RecordError {
    /// No project with the given name
    #[error("Project '{0}' not found")]
    NotFound(String),

    /// A required metric key is absent from the update
    #[error("Missing required metric: {0}")]
    MissingMetric(String),

    /// A metric is not a number, or lies outside `[0, 1]`
    #[error("Metric {metric} must be a number between 0 and 1 (got {value})")]
    OutOfRange { metric: String, value: String },

    /// The underlying collection failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised while loading the YAML configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
