use std::time::Duration;

use clap::{Parser, ValueEnum};
use stresstest_core::RunConfig;

/// How the final report is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// The complete run result as pretty-printed JSON.
    Json,
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "stresstest",
    version,
    about = "Send a fixed number of concurrent HTTP GET requests to a URL and report the results.",
    after_help = "Example:\n  stresstest --url=http://localhost:8080 --requests=1000 --concurrency=10"
)]
pub struct Cli {
    /// URL of the service under test (http:// or https://)
    #[arg(long, env = "STRESSTEST_URL")]
    pub url: String,

    /// Total number of requests to send (1 - 1000000)
    #[arg(short = 'n', long, env = "STRESSTEST_REQUESTS")]
    pub requests: u64,

    /// Number of requests in flight at the same time (1 - 10000, at most --requests)
    #[arg(short = 'c', long, env = "STRESSTEST_CONCURRENCY")]
    pub concurrency: u32,

    /// Per-request timeout in seconds
    #[arg(long, env = "STRESSTEST_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable debug logging (overridden by STRESSTEST_LOG / RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Map the parsed flags onto a [`RunConfig`]. Range checks happen later in
    /// [`stresstest_core::config::validate_config`].
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(self.url.trim(), self.requests, self.concurrency)
            .with_timeout(Duration::from_secs(self.timeout))
    }
}
