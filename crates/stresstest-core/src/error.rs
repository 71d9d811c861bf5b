use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum StressError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

impl Serialize for StressError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = StressError::Validation("requests must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: requests must be at least 1"
        );
    }

    #[test]
    fn invalid_url_display() {
        let err = StressError::InvalidUrl("relative URL without a base".to_string());
        assert_eq!(err.to_string(), "Invalid URL: relative URL without a base");
    }

    #[test]
    fn engine_error_display() {
        let err = StressError::Engine("worker panicked".to_string());
        assert_eq!(err.to_string(), "Engine error: worker panicked");
    }

    #[test]
    fn serialize_produces_string() {
        let err = StressError::Validation("test error".to_string());
        let json = serde_json::to_string(&err).expect("serialize should succeed");
        assert_eq!(json, "\"Validation error: test error\"");
    }

    #[test]
    fn error_is_debug() {
        let err = StressError::InvalidUrl("x".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("InvalidUrl"));
    }
}
