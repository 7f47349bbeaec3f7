//! Configuration management for SessionProbe

use crate::error::{ProbeError, Result};
use crate::models::{OutputFormat, ProbeConfig};
use serde::Deserialize;
use std::path::Path;

/// File-based configuration structure matching config/default.toml
#[derive(Debug, Deserialize)]
struct FileConfig {
    probe: Option<ProbeSection>,
    targets: Option<TargetsSection>,
    filter: Option<FilterSection>,
    proxy: Option<ProxySection>,
    output: Option<OutputSection>,
}

#[derive(Debug, Deserialize)]
struct ProbeSection {
    threads: Option<usize>,
    timeout_secs: Option<u64>,
    methods: Option<Vec<String>>,
    headers: Option<String>,
    skip_verification: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TargetsSection {
    urls: Option<String>,
    openapi: Option<String>,
    ignore_css: Option<bool>,
    ignore_js: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct FilterSection {
    regex: Option<String>,
    exclude_lengths: Option<Vec<usize>>,
}

#[derive(Debug, Deserialize)]
struct ProxySection {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OutputSection {
    path: Option<String>,
    format: Option<OutputFormat>,
}

/// Loads configuration from a TOML file and merges it over the defaults
pub fn load_config(path: &Path) -> Result<ProbeConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ProbeError::ConfigError(format!("Cannot read config file {}: {e}", path.display()))
    })?;
    parse_config(&content)
}

/// Parses TOML configuration text and merges it over the defaults
pub fn parse_config(content: &str) -> Result<ProbeConfig> {
    let file_config: FileConfig = toml::from_str(content)?;
    let mut config = ProbeConfig::default();

    if let Some(probe) = file_config.probe {
        if let Some(threads) = probe.threads {
            config.threads = threads;
        }
        if let Some(timeout) = probe.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(methods) = probe.methods {
            config.methods = methods;
        }
        if probe.headers.is_some() {
            config.headers = probe.headers;
        }
        if let Some(skip) = probe.skip_verification {
            config.skip_verification = skip;
        }
    }

    if let Some(targets) = file_config.targets {
        if targets.urls.is_some() {
            config.urls_file = targets.urls;
        }
        if targets.openapi.is_some() {
            config.openapi_file = targets.openapi;
        }
        if let Some(css) = targets.ignore_css {
            config.ignore_css = css;
        }
        if let Some(js) = targets.ignore_js {
            config.ignore_js = js;
        }
    }

    if let Some(filter) = file_config.filter {
        if filter.regex.is_some() {
            config.filter_regex = filter.regex;
        }
        if let Some(lengths) = filter.exclude_lengths {
            config.exclude_lengths = lengths;
        }
    }

    if let Some(proxy) = file_config.proxy {
        config.proxy = proxy.url;
    }

    if let Some(output) = file_config.output {
        if let Some(path) = output.path {
            config.output = path;
        }
        if let Some(format) = output.format {
            config.format = format;
        }
    }

    Ok(config)
}

/// Command-line values; `None` keeps whatever the file or defaults set
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub urls_file: Option<String>,
    pub openapi_file: Option<String>,
    pub headers: Option<String>,
    pub threads: Option<usize>,
    pub output: Option<String>,
    pub format: Option<OutputFormat>,
    pub proxy: Option<String>,
    pub skip_verification: bool,
    pub ignore_css: Option<bool>,
    pub ignore_js: Option<bool>,
    pub filter_regex: Option<String>,
    pub exclude_lengths: Option<Vec<usize>>,
    pub methods: Option<Vec<String>>,
}

/// Merges CLI arguments into an existing ProbeConfig
pub fn merge_cli_args(config: &mut ProbeConfig, cli: CliOverrides) {
    if cli.urls_file.is_some() {
        config.urls_file = cli.urls_file;
    }
    if cli.openapi_file.is_some() {
        config.openapi_file = cli.openapi_file;
    }
    if cli.headers.is_some() {
        config.headers = cli.headers;
    }
    if let Some(t) = cli.threads {
        config.threads = t;
    }
    if let Some(o) = cli.output {
        config.output = o;
    }
    if let Some(f) = cli.format {
        config.format = f;
    }
    if cli.proxy.is_some() {
        config.proxy = cli.proxy;
    }
    if cli.skip_verification {
        config.skip_verification = true;
    }
    if let Some(css) = cli.ignore_css {
        config.ignore_css = css;
    }
    if let Some(js) = cli.ignore_js {
        config.ignore_js = js;
    }
    if cli.filter_regex.is_some() {
        config.filter_regex = cli.filter_regex;
    }
    if let Some(lengths) = cli.exclude_lengths {
        config.exclude_lengths = lengths;
    }
    if let Some(methods) = cli.methods {
        config.methods = methods;
    }
}

/// Checks settings that must hold before anything is read or sent
pub fn validate(config: &ProbeConfig) -> Result<()> {
    if config.urls_file.is_none() && config.openapi_file.is_none() {
        return Err(ProbeError::ConfigError(
            "Please provide a URLs file (--urls) or an API document (--openapi)".to_string(),
        ));
    }
    if config.threads == 0 {
        return Err(ProbeError::ConfigError(
            "--threads must be at least 1".to_string(),
        ));
    }
    if config.timeout_secs == 0 {
        return Err(ProbeError::ConfigError(
            "timeout_secs must be at least 1".to_string(),
        ));
    }
    config.probe_methods()?;
    Ok(())
}
