//! Application state

use crate::config::GatewayConfig;
use axum::http::{HeaderMap, Method};
use std::sync::Arc;
use tempdesk_core::{AuthError, HmacAuthenticator, MemoryFileStore, MemoryUserStore, User, UserStore};
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Registered principals
    pub users: Arc<dyn UserStore>,
    /// Stored files and their permissions
    pub files: Arc<MemoryFileStore>,
    /// Signed-request authenticator
    pub authenticator: HmacAuthenticator,
}

impl AppState {
    /// Create state backed by in-memory stores
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_users(config, Arc::new(MemoryUserStore::new()))
    }

    /// Create state around an existing user store
    pub fn with_users(config: GatewayConfig, users: Arc<dyn UserStore>) -> Self {
        let authenticator = HmacAuthenticator::new().with_window(config.auth_window());
        info!(
            window_secs = config.auth_window_secs,
            "Signed-request authentication enabled"
        );

        Self {
            config,
            users,
            files: Arc::new(MemoryFileStore::new()),
            authenticator,
        }
    }

    /// Resolve the principal behind a signed request
    pub fn authenticate(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<User, AuthError> {
        self.authenticator
            .authenticate(method, path, headers, self.users.as_ref())
    }
}
