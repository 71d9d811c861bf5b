use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use stresstest_core::engine::progress::percent;
use stresstest_core::http::status_reason;
use stresstest_core::results::{ErrorCount, SummaryReport};
use stresstest_core::{RunConfig, RunResult};

const WIDE_RULE: usize = 60;
const BAR_WIDTH: usize = 20;

/// Broad family a status code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusClass {
    Success,
    Redirect,
    ClientError,
    ServerError,
    Connection,
    Other,
}

impl StatusClass {
    pub fn of(code: u16) -> Self {
        match code {
            0 => StatusClass::Connection,
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirect,
            400..=499 => StatusClass::ClientError,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusClass::Success => "Success (2xx)",
            StatusClass::Redirect => "Redirection (3xx)",
            StatusClass::ClientError => "Client errors (4xx)",
            StatusClass::ServerError => "Server errors (5xx)",
            StatusClass::Connection => "Connection errors",
            StatusClass::Other => "Other",
        }
    }
}

/// One progress line, e.g. `Progress: 40.0% (40/100 requests)`.
pub fn progress_line(completed: u64, total: u64) -> String {
    format!(
        "Progress: {:.1}% ({completed}/{total} requests)",
        percent(completed, total)
    )
}

/// Banner printed before the run starts.
pub fn render_header(config: &RunConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Starting load test...");
    let _ = writeln!(out, "URL:         {}", config.url);
    let _ = writeln!(out, "Requests:    {}", config.requests);
    let _ = writeln!(out, "Concurrency: {}", config.concurrency);
    let _ = writeln!(out, "{}", "=".repeat(50));
    out
}

/// Human-readable report for a finished run.
pub fn render(result: &RunResult) -> String {
    let report = &result.summary;
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "=".repeat(WIDE_RULE));
    let _ = writeln!(out, "{:^width$}", "LOAD TEST REPORT", width = WIDE_RULE);
    let _ = writeln!(out, "{}", "=".repeat(WIDE_RULE));

    render_summary(&mut out, report);
    render_status_distribution(&mut out, report);
    render_error_cluster(&mut out, report);
    render_performance(&mut out, report);
    render_error_breakdown(&mut out, &result.error_breakdown());

    let _ = writeln!(out, "{}", "=".repeat(WIDE_RULE));
    if result.cancelled {
        let _ = writeln!(
            out,
            "Test interrupted: {} of {} requests completed.",
            report.total_requests, result.config.requests
        );
    } else {
        let _ = writeln!(out, "Test completed.");
    }
    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.len().max(30)));
}

fn render_summary(out: &mut String, report: &SummaryReport) {
    section(out, "SUMMARY");
    let _ = writeln!(out, "Total time:          {}", format_duration(report.total_time));
    let _ = writeln!(out, "Total requests:      {}", report.total_requests);
    let _ = writeln!(out, "Successful requests: {}", report.successful_requests);
    let _ = writeln!(out, "Failed requests:     {}", report.failed_requests);
    if report.total_requests > 0 {
        let _ = writeln!(out, "Success rate:        {:.2}%", report.success_rate() * 100.0);
    }
    let _ = writeln!(out, "Requests per second: {:.2} req/s", report.requests_per_second);
    let _ = writeln!(out, "Data transferred:    {}", format_bytes(report.total_bytes));
}

fn render_status_distribution(out: &mut String, report: &SummaryReport) {
    section(out, "STATUS CODE DISTRIBUTION");

    if report.status_codes.is_empty() {
        let _ = writeln!(out, "No status codes recorded");
        return;
    }

    let mut by_class: BTreeMap<StatusClass, Vec<(u16, u64)>> = BTreeMap::new();
    for (&code, &count) in &report.status_codes {
        by_class.entry(StatusClass::of(code)).or_default().push((code, count));
    }

    for (class, codes) in &by_class {
        let _ = writeln!(out, "{}", class.label());
        for &(code, count) in codes {
            let share = percent(count, report.total_requests);
            let _ = writeln!(
                out,
                "  HTTP {code} {:<28} {count:>8} ({share:.2}%)",
                status_reason(code)
            );
            if share > 1.0 {
                let _ = writeln!(out, "  [{}]", bar(share, BAR_WIDTH));
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "By class:");
    for (class, codes) in &by_class {
        let count: u64 = codes.iter().map(|&(_, count)| count).sum();
        let _ = writeln!(
            out,
            "  {:<20} {count:>8} ({:.2}%)",
            class.label(),
            percent(count, report.total_requests)
        );
    }
}

/// Every non-2xx code, as a share of all requests and of all errors.
fn render_error_cluster(out: &mut String, report: &SummaryReport) {
    let errors: Vec<(u16, u64)> = report
        .status_codes
        .iter()
        .filter(|(&code, _)| StatusClass::of(code) != StatusClass::Success)
        .map(|(&code, &count)| (code, count))
        .collect();
    if errors.is_empty() {
        return;
    }

    section(out, "ERROR CLUSTER");
    let total_errors: u64 = errors.iter().map(|&(_, count)| count).sum();
    for &(code, count) in &errors {
        let _ = writeln!(
            out,
            "{count} x {} ({code})  {:.2}% of total | {:.1}% of errors",
            status_reason(code),
            percent(count, report.total_requests),
            percent(count, total_errors)
        );
    }
    let _ = writeln!(
        out,
        "Total non-2xx responses: {total_errors}/{} ({:.2}%)",
        report.total_requests,
        percent(total_errors, report.total_requests)
    );
}

fn render_performance(out: &mut String, report: &SummaryReport) {
    section(out, "PERFORMANCE");
    let _ = writeln!(out, "Average response time: {}", format_duration(report.avg_response_time));
    let _ = writeln!(out, "Fastest response time: {}", format_duration(report.min_response_time));
    let _ = writeln!(out, "Slowest response time: {}", format_duration(report.max_response_time));
    let _ = writeln!(
        out,
        "p50 / p95 / p99:       {} / {} / {}",
        format_duration(report.p50_response_time),
        format_duration(report.p95_response_time),
        format_duration(report.p99_response_time)
    );
    if !report.max_response_time.is_zero() {
        let spread = report.max_response_time.saturating_sub(report.min_response_time);
        let _ = writeln!(out, "Spread:                {}", format_duration(spread));
    }
}

fn render_error_breakdown(out: &mut String, errors: &[ErrorCount]) {
    if errors.is_empty() {
        return;
    }
    section(out, "ERRORS");
    for error in errors {
        let _ = writeln!(out, "{:>8} x {}", error.count, error.message);
    }
}

/// Fixed-width bar where each cell stands for `100 / width` percent.
fn bar(share: f64, width: usize) -> String {
    let filled = ((share / 100.0) * width as f64).floor() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Byte count in binary units, e.g. `512 B`, `1.5 KB`, `3.2 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const UNITS: [&str; 6] = ["KB", "MB", "GB", "TB", "PB", "EB"];

    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}", bytes as f64 / div as f64, UNITS[exp])
}

/// Duration rounded for display: milliseconds below one second, seconds above.
pub fn format_duration(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        format!("{:.2}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
