//! Chat endpoint: the full memory loop for one turn.
//!
//! Read the user's stored constraints, embed them in the prompt, call the
//! model, return its reply, and hand the structured `memory_updates` to a
//! detached write task. The response never waits on the write, and write
//! failures never reach the client.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use morsel_llm::{build_prompt, parse_reply};

use crate::auth::Identity;
use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for POST /chat.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
}

/// Response from the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's reply text.
    pub response: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handler
// ─────────────────────────────────────────────────────────────────────────────

/// POST /chat - One chat turn.
pub async fn chat_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    if request.message.trim().is_empty() {
        return Err(ServerError::BadRequest("message is required".to_string()));
    }

    let user_id = identity.user_id;

    // Read path: constraint summary for the prompt. Anonymous users get an
    // empty context.
    let constraints = {
        let store = Arc::clone(&state.store);
        tokio::task::spawn_blocking(move || store.user_constraints(user_id))
            .await
            .map_err(|e| ServerError::Internal(format!("Constraint read failed: {}", e)))?
    };

    let prompt = build_prompt(&constraints, &request.message);
    let raw = state.llm.complete(&prompt).await?;
    let reply = parse_reply(&raw);

    // Write path: detached, never awaited, outcome never surfaced.
    if let (Some(user_id), Some(updates)) = (user_id, reply.memory_updates) {
        if updates.is_empty() {
            debug!(user_id, "Reply carried no memory updates");
        } else {
            let store = Arc::clone(&state.store);
            let message = request.message.clone();
            tokio::spawn(async move {
                let _ = tokio::task::spawn_blocking(move || {
                    store.apply_updates(Some(user_id), &updates, Some(&message));
                })
                .await;
            });
        }
    }

    Ok(Json(ChatResponse {
        response: reply.assistant_response,
    }))
}
