//! Error types for SessionProbe

use thiserror::Error;

/// Main error type for SessionProbe operations
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid regex: {0}")]
    RegexError(#[from] regex::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to connect to the proxy {proxy}: {reason}")]
    ProxyUnreachable { proxy: String, reason: String },

    #[error("Failed to create request for {url}: {reason}")]
    RequestBuild { url: String, reason: String },

    #[error("Network error for URL: {url} - {reason}")]
    Network { url: String, reason: String },

    #[error("TLS certificate error for URL: {url} - {reason}")]
    TlsTrust { url: String, reason: String },

    #[error("Error fetching URL: {url} - {reason}")]
    Fetch { url: String, reason: String },

    #[error("Error reading response body for URL: {url} - {reason}")]
    BodyRead { url: String, reason: String },

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Result type alias for SessionProbe operations
pub type Result<T> = std::result::Result<T, ProbeError>;
