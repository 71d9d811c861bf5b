use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::RunConfig;
use crate::engine::aggregator::aggregate;
use crate::engine::jobs::JobSource;
use crate::engine::progress::ProgressTracker;
use crate::engine::EngineStatus;
use crate::error::StressError;
use crate::http::client::{fetch, HttpClientBuilder};
use crate::results::{RequestOutcome, RunResult};

/// Capacity of the worker -> collector channel.
const OUTCOME_CHANNEL_CAPACITY: usize = 4096;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// An event emitted by the engine during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// The collected count crossed a 10% boundary, or the last outcome arrived.
    Progress { completed: u64, total: u64 },

    /// Engine lifecycle status changed.
    StatusChange { status: EngineStatus },
}

/// Configuration passed to [`run_test`].
pub struct EngineConfig {
    /// The run to execute.
    pub run: RunConfig,
    /// Optional channel for progress and status events. Delivery is
    /// best-effort; events that do not fit in the channel are dropped and a
    /// closed receiver does not affect the run.
    pub event_tx: Option<mpsc::Sender<EngineEvent>>,
}

impl EngineConfig {
    pub fn new(run: RunConfig) -> Self {
        Self { run, event_tx: None }
    }

    pub fn with_events(mut self, event_tx: mpsc::Sender<EngineEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }
}

/// A handle to a run executing in a background Tokio task.
pub struct EngineHandle {
    /// Cancel to stop issuing new requests; in-flight requests still finish.
    pub cancel_token: CancellationToken,
    task: JoinHandle<Result<RunResult, StressError>>,
}

impl EngineHandle {
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Wait for the run to finish and return its result.
    pub async fn wait(self) -> Result<RunResult, StressError> {
        self.task
            .await
            .map_err(|e| StressError::Engine(format!("engine task failed: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Start a run in a background task and return a handle to it immediately.
pub fn spawn_test(config: EngineConfig) -> EngineHandle {
    let cancel_token = CancellationToken::new();
    let task = tokio::spawn(run_test(config, cancel_token.clone()));
    EngineHandle { cancel_token, task }
}

/// Execute `config.run.requests` GET requests with `config.run.concurrency`
/// workers and return the collected outcomes with their summary.
///
/// Cancelling `cancel` stops the issuing of new requests; requests already
/// claimed by a worker run to completion and are part of the result, so a
/// cancelled run still returns `Ok`. The only errors are structural ones
/// (unparseable URL, client construction) detected before any worker starts.
pub async fn run_test(
    config: EngineConfig,
    cancel: CancellationToken,
) -> Result<RunResult, StressError> {
    let EngineConfig { run, event_tx } = config;

    let url = match Url::parse(&run.url) {
        Ok(url) => url,
        Err(e) => {
            let err = StressError::InvalidUrl(format!("{}: {e}", run.url));
            emit_error_status(&event_tx, &err);
            return Err(err);
        }
    };

    let client = match HttpClientBuilder::for_run(&run).build() {
        Ok(client) => Arc::new(client),
        Err(err) => {
            emit_error_status(&event_tx, &err);
            return Err(err);
        }
    };

    tracing::info!(
        url = %run.url,
        requests = run.requests,
        concurrency = run.concurrency,
        timeout_ms = run.timeout.as_millis() as u64,
        "starting load run"
    );
    emit(&event_tx, EngineEvent::StatusChange { status: EngineStatus::Running });

    let started_at = Utc::now();
    let start = Instant::now();

    let jobs = Arc::new(JobSource::new(run.requests, cancel.clone()));
    let url = Arc::new(url);
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<RequestOutcome>(OUTCOME_CHANNEL_CAPACITY);

    let mut workers: JoinSet<()> = JoinSet::new();
    for worker_id in 0..run.worker_count() {
        let jobs = Arc::clone(&jobs);
        let client = Arc::clone(&client);
        let url = Arc::clone(&url);
        let outcome_tx = outcome_tx.clone();
        workers.spawn(async move {
            run_worker(worker_id, jobs, client, url, outcome_tx).await;
        });
    }

    // Drop the original sender so the channel closes once every worker has
    // returned and dropped its clone.
    drop(outcome_tx);

    // Collection loop; the only writer of `outcomes`.
    let mut outcomes: Vec<RequestOutcome> = Vec::with_capacity(initial_capacity(run.requests));
    let mut progress = ProgressTracker::new(run.requests);
    let mut stopping = false;
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled(), if !stopping => {
                stopping = true;
                tracing::warn!(
                    issued = jobs.issued(),
                    total = jobs.total(),
                    collected = outcomes.len(),
                    "cancellation requested, waiting for in-flight requests"
                );
                emit(&event_tx, EngineEvent::StatusChange { status: EngineStatus::Stopping });
            }
            received = outcome_rx.recv() => {
                let Some(outcome) = received else { break };
                if let Some(error) = &outcome.error {
                    tracing::debug!(
                        job_id = outcome.job_id,
                        status = outcome.status_code,
                        "request failed: {error}"
                    );
                }
                outcomes.push(outcome);
                if let Some(completed) = progress.record() {
                    emit(&event_tx, EngineEvent::Progress { completed, total: run.requests });
                }
            }
        }
    }

    let mut worker_failure = None;
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::error!("worker task failed: {e}");
            worker_failure.get_or_insert(e);
        }
    }
    if let Some(e) = worker_failure {
        let err = StressError::Engine(format!("worker task failed: {e}"));
        emit_error_status(&event_tx, &err);
        return Err(err);
    }

    let total_time = start.elapsed();
    let finished_at = Utc::now();
    let cancelled = stopping;
    let summary = aggregate(&outcomes, total_time);

    tracing::info!(
        collected = outcomes.len(),
        successful = summary.successful_requests,
        failed = summary.failed_requests,
        elapsed_ms = total_time.as_millis() as u64,
        cancelled,
        "load run finished"
    );

    // Both normal completion and graceful cancellation produce the same status.
    emit(&event_tx, EngineEvent::StatusChange { status: EngineStatus::Completed });

    Ok(RunResult {
        run_id: Uuid::new_v4(),
        config: run,
        started_at,
        finished_at,
        cancelled,
        summary,
        outcomes,
    })
}

// ---------------------------------------------------------------------------
// Internal implementation
// ---------------------------------------------------------------------------

/// Claim jobs until the source is exhausted or cancelled, sending one outcome
/// per claimed job.
async fn run_worker(
    worker_id: u64,
    jobs: Arc<JobSource>,
    client: Arc<Client>,
    url: Arc<Url>,
    outcome_tx: mpsc::Sender<RequestOutcome>,
) {
    let mut handled: u64 = 0;
    while let Some(job_id) = jobs.claim() {
        let outcome = fetch(&client, &url, job_id).await;
        // The collector only goes away if the run itself was dropped.
        if outcome_tx.send(outcome).await.is_err() {
            return;
        }
        handled += 1;
    }
    tracing::trace!(worker_id, handled, "worker finished");
}

/// Avoid reserving memory for a million outcomes up front.
fn initial_capacity(requests: u64) -> usize {
    requests.min(OUTCOME_CHANNEL_CAPACITY as u64 * 16) as usize
}

/// Never waits on the receiver: a full channel drops the event so a slow
/// or stalled listener cannot hold up the collector.
fn emit(tx: &Option<mpsc::Sender<EngineEvent>>, event: EngineEvent) {
    let Some(tx) = tx else { return };
    match tx.try_send(event) {
        Ok(()) | Err(TrySendError::Closed(_)) => {}
        Err(TrySendError::Full(event)) => {
            tracing::trace!(?event, "event channel full, dropping event");
        }
    }
}

fn emit_error_status(tx: &Option<mpsc::Sender<EngineEvent>>, err: &StressError) {
    tracing::error!("Engine error: {err}");
    emit(tx, EngineEvent::StatusChange { status: EngineStatus::Error });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
