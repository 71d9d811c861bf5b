use std::collections::BTreeMap;
use std::time::Duration;

use crate::results::{RequestOutcome, SummaryReport};

/// Reduce a completed result set and the run's wall-clock time into a
/// [`SummaryReport`].
///
/// Pure and order-independent: outcomes may arrive in any order and the same
/// input always produces an identical report. An empty result set yields a
/// report whose derived metrics are all zero.
pub fn aggregate(outcomes: &[RequestOutcome], total_time: Duration) -> SummaryReport {
    let mut status_codes: BTreeMap<u16, u64> = BTreeMap::new();
    let mut successful: u64 = 0;
    let mut failed: u64 = 0;
    let mut sum_nanos: u128 = 0;
    let mut min = Duration::MAX;
    let mut max = Duration::ZERO;
    let mut total_bytes: u64 = 0;

    for outcome in outcomes {
        *status_codes.entry(outcome.status_code).or_insert(0) += 1;

        if outcome.is_success() {
            successful += 1;
        } else {
            failed += 1;
        }

        sum_nanos += outcome.elapsed.as_nanos();
        min = min.min(outcome.elapsed);
        max = max.max(outcome.elapsed);
        total_bytes = total_bytes.saturating_add(outcome.size_bytes);
    }

    let total = outcomes.len() as u64;
    if total == 0 {
        return SummaryReport {
            total_time,
            ..SummaryReport::default()
        };
    }

    let avg = nanos_to_duration(sum_nanos / u128::from(total));

    let mut sorted: Vec<Duration> = outcomes.iter().map(|o| o.elapsed).collect();
    sorted.sort_unstable();

    SummaryReport {
        total_time,
        total_requests: total,
        successful_requests: successful,
        failed_requests: failed,
        status_codes,
        avg_response_time: avg,
        min_response_time: min,
        max_response_time: max,
        p50_response_time: percentile(&sorted, 50.0),
        p95_response_time: percentile(&sorted, 95.0),
        p99_response_time: percentile(&sorted, 99.0),
        requests_per_second: throughput(total, total_time),
        total_bytes,
    }
}

/// Nearest-rank percentile over an ascending slice.
///
/// `p` must be in the range (0.0, 100.0]. Returns zero for an empty slice.
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    let idx = idx.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

fn throughput(count: u64, total_time: Duration) -> f64 {
    let secs = total_time.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    let secs = (nanos / 1_000_000_000) as u64;
    let subsec = (nanos % 1_000_000_000) as u32;
    Duration::new(secs, subsec)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
