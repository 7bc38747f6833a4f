//! Account endpoints: signup and signin.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use morsel_memory::User;
use morsel_types::UserId;

use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for POST /signup.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    /// Email address, unique case-insensitively.
    pub email: String,
    /// Display name.
    pub username: String,
    /// Password, stored as-is.
    pub password: String,
}

/// Request body for POST /signin.
#[derive(Debug, Clone, Deserialize)]
pub struct SigninRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// User payload returned by signup and signin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// Numeric user id, the identity the frontend passes back in `X-User-Id`.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Display name.
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /signup - Register a new account.
pub async fn signup_handler(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ServerError> {
    if request.email.trim().is_empty()
        || request.username.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(ServerError::BadRequest(
            "email, username, and password are required".to_string(),
        ));
    }

    let store = Arc::clone(&state.store);
    let user = tokio::task::spawn_blocking(move || {
        store.create_user(&request.email, &request.username, &request.password)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Signup task failed: {}", e)))??;

    info!(user_id = user.id, "Account created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /signin - Verify credentials and return the user payload.
///
/// Unknown email and wrong password produce the same 401 so the endpoint
/// doesn't leak which accounts exist.
pub async fn signin_handler(
    State(state): State<AppState>,
    Json(request): Json<SigninRequest>,
) -> Result<Json<UserResponse>, ServerError> {
    let store = Arc::clone(&state.store);
    let user = tokio::task::spawn_blocking(move || {
        store.authenticate_user(&request.email, &request.password)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Signin task failed: {}", e)))??;

    match user {
        Some(user) => Ok(Json(user.into())),
        None => Err(ServerError::Unauthorized(
            "Invalid email or password".to_string(),
        )),
    }
}
