//! Generative backend trait and mock implementation.
//!
//! The chat path needs exactly one thing from a model provider: a text
//! completion for an assembled prompt. This module defines that seam and
//! provides a mock for deterministic testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{LlmError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Shared Retry Logic
// ─────────────────────────────────────────────────────────────────────────────

/// Execute an async operation with exponential backoff retry.
///
/// Retries only on transient errors (network failures, rate limits).
/// Non-retryable errors are returned immediately.
pub async fn with_retry<F, Fut, T>(
    max_retries: u32,
    initial_backoff: Duration,
    backend_name: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;
    let mut backoff = initial_backoff;

    for attempt in 0..=max_retries {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_retryable() {
                    return Err(e);
                }

                last_error = Some(e);

                if attempt < max_retries {
                    tracing::warn!(
                        backend = backend_name,
                        attempt = attempt + 1,
                        max_retries = max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }

    Err(last_error.unwrap())
}

// ─────────────────────────────────────────────────────────────────────────────
// Generative Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for generative model providers.
///
/// Implementations provide the actual connection to a hosted model API
/// (Gemini in production, a mock in tests).
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Generate a completion for the given prompt and return its text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Get the name of this backend.
    fn name(&self) -> &str;
}

/// A backend that can be shared across threads.
pub type SharedBackend = Arc<dyn GenerativeBackend>;

// ─────────────────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

/// A mock backend for testing purposes.
///
/// Returns pre-configured responses in order and logs every prompt it was
/// given, useful for deterministic testing of the chat flow.
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    responses: std::sync::Mutex<Vec<Result<String>>>,
    prompt_log: std::sync::Mutex<Vec<String>>,
}

impl MockBackend {
    /// Create a new mock backend with the given responses.
    ///
    /// Responses are returned in order. If more requests are made than
    /// responses available, an error is returned.
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            name: "mock".to_string(),
            responses: std::sync::Mutex::new(responses),
            prompt_log: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a mock backend with a single text response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![Ok(text.into())])
    }

    /// Create a mock backend that fails every request with the given error.
    pub fn with_error(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Get all prompts that were sent to this backend.
    pub fn prompts(&self) -> Vec<String> {
        self.prompt_log.lock().unwrap().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.prompt_log.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompt_log.lock().unwrap().push(prompt.to_string());

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(LlmError::Backend(
                "MockBackend: no more responses available".to_string(),
            ));
        }
        responses.remove(0)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_single_response() {
        let backend = MockBackend::with_text("Hello!");

        let response = backend.complete("Hi").await.unwrap();

        assert_eq!(response, "Hello!");
        assert_eq!(backend.request_count(), 1);
        assert_eq!(backend.prompts(), vec!["Hi".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_backend_multiple_responses() {
        let backend = MockBackend::new(vec![Ok("First".to_string()), Ok("Second".to_string())]);

        assert_eq!(backend.complete("1").await.unwrap(), "First");
        assert_eq!(backend.complete("2").await.unwrap(), "Second");
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_backend_exhausted() {
        let backend = MockBackend::new(vec![]);
        assert!(backend.complete("Hi").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_backend_queued_error() {
        let backend = MockBackend::with_error(LlmError::rate_limit("slow down"));
        let err = backend.complete("Hi").await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimit(_)));
    }

    #[tokio::test]
    async fn test_with_retry_succeeds_after_transient_failure() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let attempts = AtomicU32::new(0);
        let result = with_retry(3, Duration::from_millis(1), "test", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(LlmError::Network("flaky".to_string()))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_with_retry_does_not_retry_config_errors() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let attempts = AtomicU32::new(0);
        let result: Result<&str> = with_retry(3, Duration::from_millis(1), "test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(LlmError::Config("no key".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
