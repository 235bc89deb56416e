//! Error types for source fetching and settings loading.

use thiserror::Error;

/// Why a single source produced no section items.
///
/// The `Display` text is what ends up in a failed report section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport, connection, timeout or non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The body arrived but is not a readable feed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The page arrived but the extraction rule could not be applied.
    #[error("extraction error: {0}")]
    Extraction(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Network("timeout".to_string())
        } else if let Some(status) = e.status() {
            FetchError::Network(format!("HTTP {status}"))
        } else if e.is_connect() {
            FetchError::Network(format!("connection failed: {e}"))
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("settings YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}
