//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use morsel_llm::LlmError;
use morsel_memory::MemoryError;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Authentication failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The model is rate limited. Distinct from other model failures so the
    /// user sees a "try again shortly" message instead of a generic outage.
    #[error("The assistant is a little overwhelmed right now. Please try again in a moment.")]
    ModelOverloaded,

    /// Any other model failure.
    #[error("The assistant is temporarily unavailable. Please try again.")]
    ModelUnavailable,

    /// Database/storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<LlmError> for ServerError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::RateLimit(info) => {
                tracing::warn!(rate_limit = %info, "Model rate limited");
                ServerError::ModelOverloaded
            }
            other => {
                tracing::error!(error = %other, "Model call failed");
                ServerError::ModelUnavailable
            }
        }
    }
}

impl From<MemoryError> for ServerError {
    fn from(e: MemoryError) -> Self {
        match e {
            MemoryError::Conflict(msg) => ServerError::Conflict(msg),
            other => ServerError::Storage(other.to_string()),
        }
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ServerError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ServerError::ModelOverloaded => {
                (StatusCode::SERVICE_UNAVAILABLE, "model_overloaded")
            }
            ServerError::ModelUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "model_unavailable")
            }
            ServerError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            ServerError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "serialization_error")
            }
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let message = self.to_string();

        match &self {
            ServerError::Internal(_) | ServerError::Storage(_) | ServerError::Serialization(_) => {
                tracing::error!(status = %status, code, error = %message, "Server error");
            }
            _ => {
                tracing::warn!(status = %status, code, error = %message, "Client error");
            }
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_maps_to_overloaded() {
        let err: ServerError = LlmError::rate_limit("quota exceeded").into();
        assert!(matches!(err, ServerError::ModelOverloaded));
        assert!(err.to_string().contains("overwhelmed"));
    }

    #[test]
    fn test_other_model_errors_map_to_unavailable() {
        let err: ServerError = LlmError::Backend("boom".to_string()).into();
        assert!(matches!(err, ServerError::ModelUnavailable));
        assert!(err.to_string().contains("temporarily unavailable"));

        let err: ServerError = LlmError::Network("timeout".to_string()).into();
        assert!(matches!(err, ServerError::ModelUnavailable));
    }

    #[test]
    fn test_memory_conflict_maps_to_conflict() {
        let err: ServerError = MemoryError::Conflict("email taken".to_string()).into();
        assert!(matches!(err, ServerError::Conflict(_)));
    }
}
