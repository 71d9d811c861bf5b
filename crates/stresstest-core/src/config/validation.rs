use reqwest::Url;

use crate::config::model::{RunConfig, MAX_CONCURRENCY, MAX_REQUESTS};
use crate::error::StressError;

/// Validate a [`RunConfig`] and return every problem found.
///
/// An empty `Vec` means the configuration is valid. The engine itself never
/// calls this; it is meant for the layer that turns user input into a config.
pub fn validate_config(config: &RunConfig) -> Vec<StressError> {
    let mut errors = Vec::new();

    if let Err(e) = validate_url(&config.url) {
        errors.push(e);
    }

    if config.requests == 0 {
        errors.push(StressError::Validation(
            "requests must be greater than 0".to_string(),
        ));
    } else if config.requests > MAX_REQUESTS {
        errors.push(StressError::Validation(format!(
            "requests must not exceed {MAX_REQUESTS} (got {})",
            config.requests
        )));
    }

    if config.concurrency == 0 {
        errors.push(StressError::Validation(
            "concurrency must be greater than 0".to_string(),
        ));
    } else if config.concurrency > MAX_CONCURRENCY {
        errors.push(StressError::Validation(format!(
            "concurrency must not exceed {MAX_CONCURRENCY} (got {})",
            config.concurrency
        )));
    }

    if config.requests > 0 && u64::from(config.concurrency) > config.requests {
        errors.push(StressError::Validation(format!(
            "concurrency ({}) must not exceed the number of requests ({})",
            config.concurrency, config.requests
        )));
    }

    if config.timeout.is_zero() {
        errors.push(StressError::Validation(
            "timeout must be greater than 0".to_string(),
        ));
    }

    errors
}

/// Parse `raw` and require an `http` or `https` scheme with a host.
pub fn validate_url(raw: &str) -> Result<Url, StressError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StressError::InvalidUrl("URL must not be empty".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| StressError::InvalidUrl(format!("{trimmed}: {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(StressError::InvalidUrl(format!(
                "only http and https are supported (got scheme '{other}')"
            )))
        }
    }

    if url.host_str().is_none() {
        return Err(StressError::InvalidUrl(format!("{trimmed}: missing host")));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn messages(errors: &[StressError]) -> Vec<String> {
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn valid_config_has_no_errors() {
        let config = RunConfig::new("https://example.com/health", 1000, 10);
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn boundaries_are_inclusive() {
        let config = RunConfig::new("http://localhost", MAX_REQUESTS, MAX_CONCURRENCY);
        assert!(validate_config(&config).is_empty());

        let config = RunConfig::new("http://localhost", 1, 1);
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn zero_requests_is_rejected() {
        let config = RunConfig::new("http://localhost", 0, 1);
        let msgs = messages(&validate_config(&config));
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("requests must be greater than 0"));
    }

    #[test]
    fn too_many_requests_is_rejected() {
        let config = RunConfig::new("http://localhost", MAX_REQUESTS + 1, 1);
        let msgs = messages(&validate_config(&config));
        assert!(msgs.iter().any(|m| m.contains("must not exceed 1000000")));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = RunConfig::new("http://localhost", 10, 0);
        let msgs = messages(&validate_config(&config));
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("concurrency must be greater than 0"));
    }

    #[test]
    fn concurrency_above_limit_is_rejected() {
        let config = RunConfig::new("http://localhost", MAX_REQUESTS, MAX_CONCURRENCY + 1);
        let msgs = messages(&validate_config(&config));
        assert!(msgs.iter().any(|m| m.contains("must not exceed 10000")));
    }

    #[test]
    fn concurrency_above_requests_is_rejected() {
        let config = RunConfig::new("http://localhost", 5, 10);
        let msgs = messages(&validate_config(&config));
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("concurrency (10) must not exceed the number of requests (5)"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = RunConfig::new("http://localhost", 5, 1).with_timeout(Duration::ZERO);
        let msgs = messages(&validate_config(&config));
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("timeout"));
    }

    #[test]
    fn multiple_errors_are_all_reported() {
        let config = RunConfig::new("ftp://example.com", 0, 0);
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn url_without_scheme_is_rejected() {
        let err = validate_url("example.com").unwrap_err();
        assert!(matches!(err, StressError::InvalidUrl(_)));
    }

    #[test]
    fn url_with_unsupported_scheme_is_rejected() {
        let err = validate_url("ftp://example.com").unwrap_err();
        assert!(err.to_string().contains("got scheme 'ftp'"));
    }

    #[test]
    fn empty_url_is_rejected() {
        let err = validate_url("   ").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn http_and_https_urls_are_accepted() {
        assert!(validate_url("http://127.0.0.1:8080/").is_ok());
        assert!(validate_url("https://example.com/path?q=1").is_ok());
    }
}
