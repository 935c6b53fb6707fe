//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the configuration and the session store. The store sits behind a
//! trait object so the interceptor and handlers only see the capability.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::session::{MemorySessionStore, SessionStore};

/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, sessions: Arc<dyn SessionStore>) -> Self {
        Self { config: Arc::new(config), sessions }
    }

    /// State backed by an in-process store using the configured idle timeout.
    #[must_use]
    pub fn with_memory_sessions(config: AppConfig) -> Self {
        let sessions = Arc::new(MemorySessionStore::new(config.session_idle_timeout));
        Self::new(config, sessions)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
