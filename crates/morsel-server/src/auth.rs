//! Internal-caller authentication middleware.
//!
//! This server sits behind a trusted frontend. Two headers carry the trust
//! relationship: `X-Internal-Token` proves the caller is the frontend, and
//! `X-User-Id` names the signed-in user on whose behalf the request is made.
//! Requests without a usable `X-User-Id` proceed as anonymous: they get a
//! reply but no constraint context and no memory writes.
//!
//! # Security
//!
//! Token comparison uses constant-time comparison to prevent timing attacks.

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use morsel_types::UserId;

use crate::state::AppState;

/// Header carrying the shared frontend secret.
pub const INTERNAL_TOKEN_HEADER: &str = "X-Internal-Token";

/// Header carrying the trusted user identity.
pub const USER_ID_HEADER: &str = "X-User-Id";

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Caller identity resolved from request headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The signed-in user, or `None` for anonymous requests.
    pub user_id: Option<UserId>,
}

impl Identity {
    /// An anonymous caller.
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// A caller acting on behalf of a user.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Error
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication error.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// Missing internal token header.
    MissingToken,
    /// Token validation failed.
    InvalidToken,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing internal token"),
            AuthError::InvalidToken => write!(f, "Invalid internal token"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Missing internal token",
            AuthError::InvalidToken => "Invalid internal token",
        };

        let body = serde_json::json!({
            "code": "unauthorized",
            "message": message,
        });

        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Security Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Compare two strings in constant time.
///
/// This prevents timing attacks by ensuring the comparison takes the same
/// amount of time regardless of how many characters match.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    if a_bytes.len() == b_bytes.len() {
        a_bytes.ct_eq(b_bytes).into()
    } else {
        // Dummy comparison to keep timing consistent when lengths differ
        let _ = a_bytes.ct_eq(a_bytes);
        false
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication middleware function.
///
/// Validates the internal token (when configured) and injects the caller
/// [`Identity`] into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    validate_token(&request, &state)?;

    let identity = resolve_identity(&request);
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Check the internal token header against the configured secret.
fn validate_token(request: &Request<Body>, state: &AppState) -> Result<(), AuthError> {
    // No token configured (local development): skip the check entirely
    let Some(ref expected) = state.config().internal_token else {
        return Ok(());
    };

    let Some(header) = request.headers().get(INTERNAL_TOKEN_HEADER) else {
        return Err(AuthError::MissingToken);
    };

    let token = header.to_str().map_err(|_| AuthError::InvalidToken)?;
    if constant_time_eq(token, expected) {
        Ok(())
    } else {
        Err(AuthError::InvalidToken)
    }
}

/// Resolve the caller identity from `X-User-Id`.
///
/// The header value comes from the frontend's session and is trusted as-is;
/// a missing or non-numeric value means anonymous, never an error.
fn resolve_identity(request: &Request<Body>) -> Identity {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<UserId>().ok());

    match user_id {
        Some(id) => Identity::user(id),
        None => Identity::anonymous(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
