pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod results;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::RunConfig;
pub use engine::{run_test, spawn_test, EngineConfig, EngineEvent, EngineStatus};
pub use error::StressError;
pub use results::{RequestOutcome, RunResult, SummaryReport};
pub use tokio_util::sync::CancellationToken;
