use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::RunConfig;

/// The recorded result of one request attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestOutcome {
    /// Job token this outcome was produced for.
    pub job_id: u64,
    /// HTTP status code, or [`RequestOutcome::TRANSPORT_FAILURE`] when no
    /// response was received.
    pub status_code: u16,
    /// Time from sending the request until the response headers arrived.
    pub elapsed: Duration,
    /// Number of body bytes actually read.
    pub size_bytes: u64,
    /// Human-readable error for transport failures and body read failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequestOutcome {
    /// Status code recorded when the request never produced an HTTP response.
    pub const TRANSPORT_FAILURE: u16 = 0;

    /// A request that failed before any response was received.
    pub fn transport_failure(job_id: u64, elapsed: Duration, error: impl Into<String>) -> Self {
        Self {
            job_id,
            status_code: Self::TRANSPORT_FAILURE,
            elapsed,
            size_bytes: 0,
            error: Some(error.into()),
        }
    }

    /// `true` for a 2xx response whose body was read without error.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code) && self.error.is_none()
    }
}

/// Aggregated statistics for one run.
///
/// Produced by [`aggregate`](crate::engine::aggregate); durations are exact
/// and the histogram is ordered, so two reports over the same outcomes compare
/// equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SummaryReport {
    /// Wall-clock time of the whole run.
    pub total_time: Duration,
    pub total_requests: u64,
    /// 2xx responses with a fully read body.
    pub successful_requests: u64,
    /// Everything else, including transport failures.
    pub failed_requests: u64,
    /// Status code -> number of outcomes. Transport failures are keyed by 0.
    pub status_codes: BTreeMap<u16, u64>,
    pub avg_response_time: Duration,
    pub min_response_time: Duration,
    pub max_response_time: Duration,
    pub p50_response_time: Duration,
    pub p95_response_time: Duration,
    pub p99_response_time: Duration,
    /// Outcomes per second of wall-clock time.
    pub requests_per_second: f64,
    /// Sum of body bytes read across all outcomes.
    pub total_bytes: u64,
}

impl SummaryReport {
    /// Fraction of successful requests in `[0.0, 1.0]`; zero when nothing ran.
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.successful_requests as f64 / self.total_requests as f64
    }
}

/// One distinct error description and how many outcomes carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorCount {
    pub message: String,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// RunResult: the bundle handed to the reporting layer
// ---------------------------------------------------------------------------

/// Complete results of a finished (or cancelled) run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunResult {
    pub run_id: Uuid,
    pub config: RunConfig,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// `true` when cancellation was observed while outcomes were still being
    /// collected, even if every job had already been issued by then.
    pub cancelled: bool,
    pub summary: SummaryReport,
    /// Every collected outcome, in completion order.
    pub outcomes: Vec<RequestOutcome>,
}

impl RunResult {
    /// Distinct error descriptions, most frequent first. Ties are ordered by
    /// message so the listing is stable.
    pub fn error_breakdown(&self) -> Vec<ErrorCount> {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for outcome in &self.outcomes {
            if let Some(error) = &outcome.error {
                *counts.entry(error.as_str()).or_insert(0) += 1;
            }
        }

        let mut breakdown: Vec<ErrorCount> = counts
            .into_iter()
            .map(|(message, count)| ErrorCount {
                message: message.to_string(),
                count,
            })
            .collect();
        breakdown.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.message.cmp(&b.message)));
        breakdown
    }
}
