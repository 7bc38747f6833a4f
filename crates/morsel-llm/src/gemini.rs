//! Gemini API backend implementation.
//!
//! Connects to Google's Generative Language API (`generateContent`) and maps
//! its failure modes onto [`LlmError`]. Rate-limit conditions (HTTP 429 or a
//! `RESOURCE_EXHAUSTED` status in the error body) are surfaced as
//! [`LlmError::RateLimit`] so callers can give the user a distinct message.

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use std::time::Duration;

use crate::backend::{GenerativeBackend, with_retry};
use crate::error::{LlmError, RateLimitInfo, Result};

/// Default API base URL.
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default model.
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default timeout for requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum retries for transient errors.
    pub max_retries: u32,

    /// Initial backoff duration for retries.
    pub retry_backoff: Duration,
}

impl GeminiConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }

    /// Create config from environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            LlmError::Config("GEMINI_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gemini Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Gemini API backend.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create a backend from environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Build the generateContent endpoint URL.
    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    /// Handle a response, extracting the first candidate's text.
    async fn handle_response(response: Response) -> Result<String> {
        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        let body = response.text().await?;
        let parsed: ApiResponse = serde_json::from_str(&body)?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| LlmError::Backend("Response contained no candidates".to_string()))
    }

    /// Handle an error response.
    async fn handle_error_response(response: Response) -> LlmError {
        let status = response.status();

        // Extract Retry-After header before consuming response
        let retry_after_header = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await.unwrap_or_default();

        if let Ok(error) = serde_json::from_str::<ApiError>(&body) {
            let is_rate_limit =
                status.as_u16() == 429 || error.error.status.as_deref() == Some("RESOURCE_EXHAUSTED");

            if is_rate_limit {
                return LlmError::RateLimit(RateLimitInfo::from_response(
                    &error.error.message,
                    retry_after_header.as_deref(),
                ));
            }

            match status.as_u16() {
                401 | 403 => {
                    LlmError::Auth(format!("Authentication failed: {}", error.error.message))
                }
                500..=599 => LlmError::Backend(format!("Server error: {}", error.error.message)),
                _ => LlmError::Backend(error.error.message),
            }
        } else if status.as_u16() == 429 {
            LlmError::RateLimit(RateLimitInfo::from_response(
                &body,
                retry_after_header.as_deref(),
            ))
        } else {
            LlmError::Backend(format!("HTTP {}: {}", status, body))
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ApiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        with_retry(
            self.config.max_retries,
            self.config.retry_backoff,
            "gemini",
            || async {
                let response = self
                    .client
                    .post(self.generate_url())
                    .header("x-goog-api-key", &self.config.api_key)
                    .header(header::CONTENT_TYPE, "application/json")
                    .json(&request)
                    .send()
                    .await?;

                Self::handle_response(response).await
            },
        )
        .await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, serde::Serialize)]
struct ApiRequest {
    contents: Vec<Content>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, serde::Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, serde::Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, serde::Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}
