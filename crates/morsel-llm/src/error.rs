//! Error types for the LLM crate.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using the LLM error type.
pub type Result<T> = std::result::Result<T, LlmError>;

// ─────────────────────────────────────────────────────────────────────────────
// Rate Limit Info
// ─────────────────────────────────────────────────────────────────────────────

/// Information about a rate limit error.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// The error message from the provider.
    pub message: String,
    /// How long to wait before retrying (if the provider specified).
    pub retry_after: Option<Duration>,
}

impl RateLimitInfo {
    /// Create a new rate limit info with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retry_after: None,
        }
    }

    /// Create a rate limit info with a retry duration.
    pub fn with_retry_after(message: impl Into<String>, retry_after: Duration) -> Self {
        Self {
            message: message.into(),
            retry_after: Some(retry_after),
        }
    }

    /// Build rate limit info from an error body and optional Retry-After
    /// header value.
    pub fn from_response(message: &str, retry_after_header: Option<&str>) -> Self {
        Self {
            message: message.to_string(),
            retry_after: retry_after_header.and_then(parse_retry_after_header),
        }
    }
}

impl std::fmt::Display for RateLimitInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(retry_after) = self.retry_after {
            write!(f, " (retry after {:.2}s)", retry_after.as_secs_f64())?;
        }
        Ok(())
    }
}

/// Parse a Retry-After header value.
///
/// Only the seconds (integer) form is supported.
fn parse_retry_after_header(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

// ─────────────────────────────────────────────────────────────────────────────
// LLM Error
// ─────────────────────────────────────────────────────────────────────────────

/// Error type for LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Backend/API error from the provider.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Network/connectivity error (retryable).
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration error (API key missing, etc.).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Rate limit exceeded (retryable with backoff).
    #[error("Rate limit exceeded: {0}")]
    RateLimit(RateLimitInfo),

    /// Authentication failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LlmError {
    /// Create a rate limit error from a message string.
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit(RateLimitInfo::new(message))
    }

    /// Get the retry-after duration if this is a rate limit error.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit(info) => info.retry_after,
            _ => None,
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// Network errors and rate limits are transient; everything else should
    /// surface immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimit(_))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            LlmError::Network(format!("Connection failed: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(LlmError::Network("timeout".to_string()).is_retryable());
        assert!(LlmError::rate_limit("rate limited").is_retryable());
        assert!(!LlmError::Config("bad config".to_string()).is_retryable());
        assert!(!LlmError::Auth("unauthorized".to_string()).is_retryable());
        assert!(!LlmError::Backend("server error".to_string()).is_retryable());
    }

    #[test]
    fn test_rate_limit_info_new() {
        let info = RateLimitInfo::new("Rate limited");
        assert_eq!(info.message, "Rate limited");
        assert!(info.retry_after.is_none());
    }

    #[test]
    fn test_parse_retry_after_header() {
        assert_eq!(parse_retry_after_header("5"), Some(Duration::from_secs(5)));
        assert_eq!(
            parse_retry_after_header(" 10 "),
            Some(Duration::from_secs(10))
        );
        assert_eq!(parse_retry_after_header("invalid"), None);
    }

    #[test]
    fn test_from_response_with_header() {
        let info = RateLimitInfo::from_response("Quota exceeded", Some("7"));
        assert_eq!(info.retry_after, Some(Duration::from_secs(7)));

        let info = RateLimitInfo::from_response("Quota exceeded", None);
        assert!(info.retry_after.is_none());
    }

    #[test]
    fn test_llm_error_retry_after() {
        let err = LlmError::RateLimit(RateLimitInfo::with_retry_after(
            "limited",
            Duration::from_secs(5),
        ));
        assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));

        let err = LlmError::Network("timeout".to_string());
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_rate_limit_info_display() {
        let info = RateLimitInfo::new("Rate limited");
        assert_eq!(info.to_string(), "Rate limited");

        let info = RateLimitInfo::with_retry_after("Rate limited", Duration::from_secs_f64(6.5));
        assert!(info.to_string().contains("retry after 6.50s"));
    }
}
