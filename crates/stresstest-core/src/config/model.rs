use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upper bound on the total number of requests in one run.
pub const MAX_REQUESTS: u64 = 1_000_000;

/// Upper bound on the number of concurrent workers.
pub const MAX_CONCURRENCY: u32 = 10_000;

/// Client-side timeout applied to every individual request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameters of a single load run.
///
/// The engine treats a `RunConfig` as already validated; callers that accept
/// user input should run it through [`validate_config`](super::validate_config)
/// first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunConfig {
    /// Absolute `http://` or `https://` URL every request is sent to.
    pub url: String,
    /// Total number of GET requests to issue.
    pub requests: u64,
    /// Number of workers issuing requests in parallel.
    pub concurrency: u32,
    /// Per-request timeout covering connect, headers and body.
    pub timeout: Duration,
    /// Value of the `User-Agent` header sent with each request.
    pub user_agent: String,
}

impl RunConfig {
    pub fn new(url: impl Into<String>, requests: u64, concurrency: u32) -> Self {
        Self {
            url: url.into(),
            requests,
            concurrency,
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Number of workers actually spawned: never more than there are jobs.
    pub fn worker_count(&self) -> u64 {
        u64::from(self.concurrency).min(self.requests)
    }
}

fn default_user_agent() -> String {
    format!("stresstest/{}", env!("CARGO_PKG_VERSION"))
}
