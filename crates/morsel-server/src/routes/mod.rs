//! HTTP route handlers.

mod chat;
mod health;
mod users;

pub use chat::{ChatRequest, ChatResponse, chat_handler};
pub use health::{HealthResponse, health, health_routes};
pub use users::{SigninRequest, SignupRequest, UserResponse, signin_handler, signup_handler};
