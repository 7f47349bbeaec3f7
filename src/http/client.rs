//! HTTP transport: client configuration and request execution

use crate::error::{ProbeError, Result};
use crate::http::headers::{build_request, HeaderMultimap};
use crate::models::{ProbeConfig, ProbeTask};
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::error::Error as StdError;
use std::time::Duration;
use tracing::debug;

/// Per-request timeout used when the configuration does not override it
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A received response: the status is always known, the body may have
/// failed to arrive
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub body: Result<Vec<u8>>,
}

/// Executes probe tasks. Implementations must be shareable across all
/// concurrently running probes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and returns the first response without following
    /// redirects
    async fn execute(&self, task: &ProbeTask, headers: &HeaderMultimap) -> Result<RawResponse>;
}

/// Transport settings resolved from the configuration
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub proxy: Option<String>,
    pub skip_verification: bool,
    pub timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            skip_verification: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl From<&ProbeConfig> for TransportOptions {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            proxy: config.proxy_url().map(str::to_string),
            skip_verification: config.skip_verification,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// reqwest-backed transport shared by every probe of a run
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds the shared client.
    ///
    /// Redirects are never followed; an explicit proxy replaces the
    /// environment proxy settings reqwest picks up otherwise.
    pub fn new(options: &TransportOptions) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("sessionprobe/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(options.skip_verification);

        if let Some(ref proxy_url) = options.proxy {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| ProbeError::ConfigError(format!("Invalid proxy URL: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        Self::new(&TransportOptions::from(config))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, task: &ProbeTask, headers: &HeaderMultimap) -> Result<RawResponse> {
        let request = build_request(&self.client, task, headers)?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| classify_send_error(&task.url, &e))?;

        let status = response.status().as_u16();
        debug!("Response: {status} for {task}");

        let body = response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ProbeError::BodyRead {
                url: task.url.clone(),
                reason: e.to_string(),
            });

        Ok(RawResponse { status, body })
    }
}

/// Maps a send failure onto the per-task error taxonomy
fn classify_send_error(url: &str, err: &reqwest::Error) -> ProbeError {
    let reason = error_chain(err);

    if has_source::<native_tls::Error>(err) || is_certificate_error(&reason) {
        return ProbeError::TlsTrust {
            url: url.to_string(),
            reason,
        };
    }

    if err.is_connect() || err.is_timeout() {
        return ProbeError::Network {
            url: url.to_string(),
            reason,
        };
    }

    ProbeError::Fetch {
        url: url.to_string(),
        reason,
    }
}

/// Joins an error with all of its sources; reqwest keeps the interesting part
/// (DNS, TLS, refused) in the source chain
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// True if `T` appears anywhere in the source chain of `err`
fn has_source<T: StdError + 'static>(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(cause) = current {
        if cause.downcast_ref::<T>().is_some() {
            return true;
        }
        current = cause.source();
    }
    false
}

fn is_certificate_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("certificate") || lower.contains("unknownissuer") || lower.contains("self signed")
}
