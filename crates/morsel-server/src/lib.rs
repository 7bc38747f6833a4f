//! Internal HTTP API for Morsel.
//!
//! This crate is the backend tier: a small axum service the trusted frontend
//! calls with an `X-Internal-Token` shared secret and an `X-User-Id` identity
//! header. It exposes signup, signin, the chat turn (with the memory
//! read/write loop), and a health check.
//!
//! # Example
//!
//! ```ignore
//! use morsel_server::{Server, ServerConfig};
//! use morsel_llm::GeminiBackend;
//! use morsel_memory::ConstraintStore;
//! use std::sync::Arc;
//!
//! let store = ConstraintStore::open("morsel.db")?;
//! let backend = Arc::new(GeminiBackend::from_env()?);
//! let config = ServerConfig::new(Some("secret".to_string()));
//!
//! let server = Server::new(store, backend, config);
//! server.run().await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::{AuthError, Identity, auth_middleware};
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use routes::{ChatRequest, ChatResponse, SigninRequest, SignupRequest, UserResponse};
pub use state::AppState;

use std::net::SocketAddr;

use axum::{Router, middleware};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use morsel_llm::SharedBackend;
use morsel_memory::ConstraintStore;

/// The Morsel HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server with the given store, backend, and configuration.
    pub fn new(store: ConstraintStore, llm: SharedBackend, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(store, llm, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            // Health route (no auth required)
            .merge(routes::health_routes())
            .merge(self.api_routes())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Routes behind the internal-token check.
    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::post;

        Router::new()
            .route("/signup", post(routes::signup_handler))
            .route("/signin", post(routes::signin_handler))
            .route("/chat", post(routes::chat_handler))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth::auth_middleware,
            ))
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
