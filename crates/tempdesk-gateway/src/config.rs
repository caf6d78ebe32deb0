//! Gateway configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gateway server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Accepted clock skew between a request's `Date` and now (seconds)
    pub auth_window_secs: u64,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
    /// Enable CORS
    pub cors_enabled: bool,
    /// CORS allowed origins
    pub cors_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            auth_window_secs: 10 * 60,
            max_body_size: 64 * 1024 * 1024, // 64 MiB
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl GatewayConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Replay window for signed requests
    pub fn auth_window(&self) -> Duration {
        Duration::from_secs(self.auth_window_secs)
    }
}
