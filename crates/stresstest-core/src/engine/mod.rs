use serde::{Deserialize, Serialize};

pub mod aggregator;
pub mod executor;
pub mod jobs;
pub mod progress;

pub use aggregator::aggregate;
pub use executor::{run_test, spawn_test, EngineConfig, EngineEvent, EngineHandle};
pub use jobs::JobSource;
pub use progress::ProgressTracker;

/// Current operational status of the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    /// No run has started yet.
    #[default]
    Idle,
    /// Workers are issuing requests.
    Running,
    /// Cancellation was observed; in-flight requests are finishing.
    Stopping,
    /// The run ended, either normally or after cancellation.
    Completed,
    /// The run could not start.
    Error,
}

impl std::fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EngineStatus::Idle => "idle",
            EngineStatus::Running => "running",
            EngineStatus::Stopping => "stopping",
            EngineStatus::Completed => "completed",
            EngineStatus::Error => "error",
        };
        write!(f, "{s}")
    }
}
