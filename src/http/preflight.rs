//! Proxy reachability check run before any probe is dispatched

use crate::error::{ProbeError, Result};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::info;
use url::Url;

pub const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(5);

/// Verifies that the configured proxy accepts TCP connections.
///
/// No-op without a proxy. Any failure is fatal for the run.
pub async fn check_proxy(proxy: Option<&str>) -> Result<()> {
    check_proxy_with_timeout(proxy, PREFLIGHT_TIMEOUT).await
}

pub async fn check_proxy_with_timeout(proxy: Option<&str>, limit: Duration) -> Result<()> {
    let Some(proxy) = proxy.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    let url = Url::parse(proxy)
        .map_err(|e| ProbeError::ConfigError(format!("Failed to parse proxy URL: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| ProbeError::ConfigError(format!("Proxy URL has no host: {proxy}")))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| ProbeError::ConfigError(format!("Proxy URL has no port: {proxy}")))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');

    let unreachable = |reason: String| ProbeError::ProxyUnreachable {
        proxy: proxy.to_string(),
        reason,
    };

    match timeout(limit, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => {
            info!("Proxy {proxy} is reachable");
            Ok(())
        }
        Ok(Err(e)) => Err(unreachable(e.to_string())),
        Err(_) => Err(unreachable(format!(
            "no connection within {} seconds",
            limit.as_secs()
        ))),
    }
}
