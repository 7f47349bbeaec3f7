//! Target sources: plain URL lists and OpenAPI / Swagger documents

use crate::error::{ProbeError, Result};
use crate::models::ProbeConfig;
use crate::targets::{SuffixFilter, TargetSet};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Reads every configured target source and builds the target set
pub fn load_targets(config: &ProbeConfig) -> Result<TargetSet> {
    let mut lines = Vec::new();

    if let Some(ref path) = config.urls_file {
        lines.extend(read_url_file(Path::new(path))?);
    }
    if let Some(ref path) = config.openapi_file {
        lines.extend(read_openapi_file(Path::new(path))?);
    }
    if config.urls_file.is_none() && config.openapi_file.is_none() {
        return Err(ProbeError::ConfigError(
            "No target source configured".to_string(),
        ));
    }

    let filter = SuffixFilter {
        ignore_css: config.ignore_css,
        ignore_js: config.ignore_js,
    };
    Ok(TargetSet::from_lines(lines, filter))
}

/// Reads a file containing one URL per line
pub fn read_url_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ProbeError::ConfigError(format!("Cannot read URL file {}: {e}", path.display()))
    })?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Reads an OpenAPI 3 or Swagger 2 document (JSON or YAML) and returns one
/// URL per path that declares a GET operation
pub fn read_openapi_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ProbeError::ConfigError(format!("Cannot read API document {}: {e}", path.display()))
    })?;
    let urls = extract_openapi_urls(&content)?;
    info!(
        "Extracted {} GET endpoints from {}",
        urls.len(),
        path.display()
    );
    Ok(urls)
}

/// Extracts `base_url + path` for every GET operation in an API document
pub fn extract_openapi_urls(content: &str) -> Result<Vec<String>> {
    let trimmed = content.trim_start();
    let doc: Value = if trimmed.starts_with('{') {
        serde_json::from_str(content)?
    } else {
        serde_yaml::from_str(content)?
    };

    let base = base_url(&doc)?;
    let paths = doc
        .get("paths")
        .and_then(Value::as_object)
        .ok_or_else(|| ProbeError::ConfigError("API document has no 'paths' object".to_string()))?;

    let urls = paths
        .iter()
        .filter(|(_, item)| item.get("get").is_some())
        .map(|(path, _)| format!("{}{}", base.trim_end_matches('/'), path))
        .collect();

    Ok(urls)
}

fn base_url(doc: &Value) -> Result<String> {
    // OpenAPI 3
    if let Some(servers) = doc.get("servers").and_then(Value::as_array) {
        if servers.len() > 1 {
            warn!("API document lists {} servers, using the first", servers.len());
        }
        if let Some(url) = servers
            .first()
            .and_then(|s| s.get("url"))
            .and_then(Value::as_str)
        {
            return Ok(url.to_string());
        }
    }

    // Swagger 2
    if let Some(host) = doc.get("host").and_then(Value::as_str) {
        let scheme = doc
            .get("schemes")
            .and_then(Value::as_array)
            .and_then(|s| s.first())
            .and_then(Value::as_str)
            .unwrap_or("https");
        let base_path = doc.get("basePath").and_then(Value::as_str).unwrap_or("");
        return Ok(format!(
            "{scheme}://{host}{}",
            base_path.trim_end_matches('/')
        ));
    }

    Err(ProbeError::ConfigError(
        "API document declares no server URL".to_string(),
    ))
}
