use std::error::Error as _;
use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode, Url};

use crate::config::{RunConfig, DEFAULT_TIMEOUT};
use crate::error::StressError;
use crate::results::RequestOutcome;

/// Builder for the shared [`reqwest::Client`] used by every worker.
pub struct HttpClientBuilder {
    timeout: Duration,
    pool_max_idle_per_host: usize,
    pool_idle_timeout: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            pool_max_idle_per_host: 100,
            pool_idle_timeout: Duration::from_secs(90),
            user_agent: format!("stresstest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the timeout and user agent of a run, sizing the idle pool
    /// to the number of workers.
    pub fn for_run(config: &RunConfig) -> Self {
        Self::new()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(config.worker_count() as usize)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pool_max_idle_per_host(mut self, n: usize) -> Self {
        self.pool_max_idle_per_host = n;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn build(self) -> Result<Client, StressError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(self.pool_idle_timeout)
            .user_agent(self.user_agent)
            .build()?;
        Ok(client)
    }
}

/// Perform one GET against `url` and record what happened.
///
/// Never fails: transport errors (DNS, connect, TLS, timeout) become an
/// outcome with status 0, and a body that breaks off after the status line
/// keeps its status, the bytes read so far and an error. `elapsed` covers the
/// time until response headers arrived; the body is drained and discarded.
pub async fn fetch(client: &Client, url: &Url, job_id: u64) -> RequestOutcome {
    let start = Instant::now();

    let mut response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            return RequestOutcome::transport_failure(job_id, start.elapsed(), describe_error(&e));
        }
    };
    let elapsed = start.elapsed();
    let status_code = response.status().as_u16();

    let mut size_bytes: u64 = 0;
    let mut error = None;
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => size_bytes += chunk.len() as u64,
            Ok(None) => break,
            Err(e) => {
                error = Some(describe_error(&e));
                break;
            }
        }
    }

    RequestOutcome {
        job_id,
        status_code,
        elapsed,
        size_bytes,
        error,
    }
}

/// Canonical reason phrase for a status code, `"Connection Error"` for the
/// transport-failure code 0 and `"Unknown"` for anything unregistered.
pub fn status_reason(code: u16) -> &'static str {
    if code == RequestOutcome::TRANSPORT_FAILURE {
        return "Connection Error";
    }
    StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown")
}

/// Render a reqwest error together with its source chain, e.g.
/// `timeout: error sending request for url (...): operation timed out`.
pub fn describe_error(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        Some("timeout")
    } else if err.is_connect() {
        Some("connect")
    } else if err.is_body() || err.is_decode() {
        Some("body")
    } else {
        None
    };

    let mut message = match kind {
        Some(kind) => format!("{kind}: {err}"),
        None => err.to_string(),
    };

    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
