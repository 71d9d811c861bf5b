use stresstest_core::StressError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid arguments:\n{}", format_list(.0))]
    InvalidArguments(Vec<StressError>),

    #[error(transparent)]
    Engine(#[from] StressError),

    #[error("failed to render JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit status: 2 for bad arguments, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidArguments(_) => 2,
            CliError::Engine(_) | CliError::Json(_) => 1,
        }
    }
}

fn format_list(errors: &[StressError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_arguments_lists_every_error() {
        let err = CliError::InvalidArguments(vec![
            StressError::Validation("requests must be greater than 0".to_string()),
            StressError::InvalidUrl("URL must not be empty".to_string()),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("invalid arguments:"));
        assert!(msg.contains("  - Validation error: requests must be greater than 0"));
        assert!(msg.contains("  - Invalid URL: URL must not be empty"));
    }

    #[test]
    fn engine_error_is_transparent() {
        let err: CliError = StressError::Engine("worker task failed".to_string()).into();
        assert_eq!(err.to_string(), "Engine error: worker task failed");
    }

    #[test]
    fn exit_codes() {
        assert_eq!(CliError::InvalidArguments(Vec::new()).exit_code(), 2);
        let engine: CliError = StressError::Engine("x".to_string()).into();
        assert_eq!(engine.exit_code(), 1);
    }
}
