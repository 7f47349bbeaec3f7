//! Core data models for SessionProbe

use crate::error::{ProbeError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Methods that may be probed in addition to the always-present GET
pub const SUPPORTED_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"];

/// Output format of the report file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ProbeError::ConfigError(format!(
                "Unknown output format '{other}'. Use: text, json"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// One unit of dispatch: a single method against a single target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTask {
    pub method: Method,
    pub url: String,
}

impl ProbeTask {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }
}

impl fmt::Display for ProbeTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Classification result of one executed probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// HTTP status code of the first response (redirects are not followed)
    pub status: u16,
    /// Body length in bytes
    pub length: usize,
    pub method: String,
    pub url: String,
    /// Whether the outcome survives the response filters
    pub included: bool,
}

/// Configuration for a probe run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// File with one URL per line
    pub urls_file: Option<String>,
    /// OpenAPI / Swagger document to extract GET endpoints from
    pub openapi_file: Option<String>,
    /// Raw header specification ("Key1:Value1;Key2:Value2")
    pub headers: Option<String>,
    /// Maximum number of in-flight probes
    pub threads: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Explicit proxy URL; environment proxy settings are used when absent
    pub proxy: Option<String>,
    /// Disable TLS certificate verification
    pub skip_verification: bool,
    /// Drop targets whose path ends with .css
    pub ignore_css: bool,
    /// Drop targets whose path ends with .js
    pub ignore_js: bool,
    /// Responses whose body matches this regex are left out of the report
    pub filter_regex: Option<String>,
    /// Responses with one of these body lengths are left out of the report
    pub exclude_lengths: Vec<usize>,
    /// Methods to probe; GET is always included
    pub methods: Vec<String>,
    /// Report file path
    pub output: String,
    pub format: OutputFormat,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            urls_file: None,
            openapi_file: None,
            headers: None,
            threads: 10,
            timeout_secs: 10,
            proxy: None,
            skip_verification: false,
            ignore_css: true,
            ignore_js: true,
            filter_regex: None,
            exclude_lengths: Vec::new(),
            methods: vec!["GET".to_string()],
            output: "output.txt".to_string(),
            format: OutputFormat::Text,
        }
    }
}

impl ProbeConfig {
    /// Returns the proxy URL if one is configured and non-empty
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Resolves the configured method names into the probed method set.
    ///
    /// GET always comes first; the remaining methods follow in
    /// [`SUPPORTED_METHODS`] order with duplicates removed.
    pub fn probe_methods(&self) -> Result<Vec<Method>> {
        let mut requested = Vec::new();
        for name in &self.methods {
            let name = name.trim().to_uppercase();
            if name.is_empty() {
                continue;
            }
            if !SUPPORTED_METHODS.contains(&name.as_str()) {
                return Err(ProbeError::ConfigError(format!(
                    "Unsupported method '{name}'. Use: {}",
                    SUPPORTED_METHODS.join(", ")
                )));
            }
            requested.push(name);
        }

        let methods = SUPPORTED_METHODS
            .iter()
            .filter(|m| **m == "GET" || requested.iter().any(|r| r == *m))
            .map(|m| Method::from_bytes(m.as_bytes()))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ProbeError::ConfigError(format!("Invalid method: {e}")))?;

        Ok(methods)
    }
}
