//! Application state shared across handlers.

use std::sync::Arc;

use morsel_llm::SharedBackend;
use morsel_memory::ConstraintStore;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The constraint store.
    pub store: Arc<ConstraintStore>,

    /// The generative backend.
    pub llm: SharedBackend,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: ConstraintStore, llm: SharedBackend, config: ServerConfig) -> Self {
        Self {
            store: Arc::new(store),
            llm,
            config: Arc::new(config),
        }
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
