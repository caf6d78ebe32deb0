//! Client configuration

use std::fmt;
use std::time::Duration;

/// Name and shared key used to sign requests
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
    pub key: String,
}

impl Credentials {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Client configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Gateway endpoint URL
    pub endpoint: String,
    /// Signing credentials; requests go out anonymous without them
    pub credentials: Option<Credentials>,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000".to_string(),
            credentials: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("tempdesk-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Create a new config with the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Sign requests as `name` with `key`
    pub fn with_credentials(mut self, name: impl Into<String>, key: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(name, key));
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL for API requests, without a trailing slash
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trims_slash() {
        assert_eq!(Config::new("http://desk:9000/").base_url(), "http://desk:9000");
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let config = Config::default().with_credentials("Sam", "hunter2");
        let printed = format!("{:?}", config);
        assert!(printed.contains("Sam"));
        assert!(!printed.contains("hunter2"));
    }
}
