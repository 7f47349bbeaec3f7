//! Probe engine: bounded concurrent dispatch of (method, target) probes
//!
//! Every (method, target) pair becomes one task. At most `concurrency` tasks
//! are in flight; the scheduling loop waits for a free slot before spawning
//! the next one and never waits on an individual task. Results are collected
//! in a per-run [`ResultStore`] and frozen into a sorted [`Report`] once every
//! task has finished.

pub mod classifier;
pub mod store;

use crate::error::{ProbeError, Result};
use crate::http::preflight;
use crate::http::{HeaderMultimap, HttpTransport, Transport};
use crate::models::{ProbeConfig, ProbeOutcome, ProbeTask};
use crate::report::Report;
use crate::targets::TargetSet;
use reqwest::Method;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

pub use classifier::{classify, Classification, FilterConfig};
pub use store::{Progress, ResultStore};

/// Default number of in-flight probes
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Runs probe tasks against a shared transport
pub struct ProbeEngine {
    transport: Arc<dyn Transport>,
    headers: Arc<HeaderMultimap>,
    filter: Arc<FilterConfig>,
    methods: Vec<Method>,
    concurrency: usize,
}

impl ProbeEngine {
    /// Creates an engine probing GET only, without headers or filters
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            headers: Arc::new(HeaderMultimap::new()),
            filter: Arc::new(FilterConfig::default()),
            methods: vec![Method::GET],
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Builds the engine and its HTTP transport from the run configuration
    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;

        let headers = match config.headers.as_deref() {
            Some(spec) => HeaderMultimap::parse(spec),
            None => HeaderMultimap::new(),
        };
        let filter = FilterConfig::new(
            config.filter_regex.as_deref(),
            config.exclude_lengths.iter().copied(),
        )?;

        Ok(Self::new(Arc::new(transport))
            .with_headers(headers)
            .with_filter(filter)
            .with_methods(config.probe_methods()?)
            .with_concurrency(config.threads))
    }

    pub fn with_headers(mut self, headers: HeaderMultimap) -> Self {
        self.headers = Arc::new(headers);
        self
    }

    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    pub fn with_methods(mut self, methods: Vec<Method>) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Number of probes a run over `targets` dispatches
    pub fn total_tasks(&self, targets: &TargetSet) -> usize {
        targets.len() * self.methods.len()
    }

    /// Probes every (method, target) pair and returns the sorted report.
    ///
    /// Per-probe failures are logged and left out of the report; only an
    /// invalid engine setup fails the run.
    pub async fn run(&self, targets: &TargetSet) -> Result<Report> {
        if self.concurrency == 0 {
            return Err(ProbeError::ConfigError(
                "Concurrency must be at least 1".to_string(),
            ));
        }
        if self.methods.is_empty() {
            return Err(ProbeError::ConfigError(
                "At least one method must be probed".to_string(),
            ));
        }

        let total = self.total_tasks(targets);
        let store = Arc::new(ResultStore::new());
        let progress = Arc::new(Progress::new(total));
        let slots = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        info!(
            "Starting to check {} URLs (deduplicated) with {} method(s) and {} threads",
            targets.len(),
            self.methods.len(),
            self.concurrency
        );

        for url in targets.iter() {
            for method in &self.methods {
                // blocks the loop while every slot is taken
                let permit = Arc::clone(&slots)
                    .acquire_owned()
                    .await
                    .map_err(|e| ProbeError::WorkerPool(e.to_string()))?;
                let guard = SlotGuard {
                    _permit: permit,
                    progress: Arc::clone(&progress),
                };

                let task = ProbeTask::new(method.clone(), url);
                let transport = Arc::clone(&self.transport);
                let headers = Arc::clone(&self.headers);
                let filter = Arc::clone(&self.filter);
                let store = Arc::clone(&store);

                tasks.spawn(async move {
                    let _guard = guard;
                    if let Some(outcome) =
                        probe_target(transport.as_ref(), &task, &headers, &filter).await
                    {
                        if outcome.included {
                            store.record(outcome);
                        }
                    }
                });
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Probe task panicked: {e}");
            }
        }

        let report = store.freeze(self.methods.len() > 1);
        info!(
            "Finished {}/{} probes, {} responses reported",
            progress.completed(),
            total,
            report.total()
        );
        Ok(report)
    }
}

/// Runs the proxy preflight and, if it passes, the whole probe run
pub async fn run(config: &ProbeConfig, targets: &TargetSet) -> Result<Report> {
    preflight::check_proxy(config.proxy_url()).await?;
    let engine = ProbeEngine::from_config(config)?;
    engine.run(targets).await
}

/// Holds a pool slot for the lifetime of one task and counts the task as
/// completed when dropped, whatever way the task ends
struct SlotGuard {
    _permit: OwnedSemaphorePermit,
    progress: Arc<Progress>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let completed = self.progress.complete_one();
        info!(
            "Progress: {:.2}% ({}/{} probes completed)",
            self.progress.percentage(completed),
            completed,
            self.progress.total()
        );
    }
}

/// Executes and classifies one probe. `None` means the probe failed before
/// a response arrived.
async fn probe_target(
    transport: &dyn Transport,
    task: &ProbeTask,
    headers: &HeaderMultimap,
    filter: &FilterConfig,
) -> Option<ProbeOutcome> {
    let response = match transport.execute(task, headers).await {
        Ok(response) => response,
        Err(e) => {
            log_task_error(&e);
            return None;
        }
    };

    let outcome = match response.body {
        Ok(body) => {
            let verdict = classify(response.status, &body, filter);
            ProbeOutcome {
                status: verdict.status,
                length: verdict.length,
                method: task.method.to_string(),
                url: task.url.clone(),
                included: verdict.included,
            }
        }
        Err(e) => {
            log_task_error(&e);
            ProbeOutcome {
                status: response.status,
                length: 0,
                method: task.method.to_string(),
                url: task.url.clone(),
                included: false,
            }
        }
    };

    debug!(
        "{task} => {} ({} bytes, {})",
        outcome.status,
        outcome.length,
        if outcome.included { "reported" } else { "filtered" }
    );
    Some(outcome)
}

fn log_task_error(err: &ProbeError) {
    error!("{err}");
    if let ProbeError::TlsTrust { url, .. } = err {
        warn!("Certificate of {url} is not trusted. Use --skip-verification to probe it anyway");
    }
}
