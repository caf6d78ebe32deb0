//! Client error types

use serde::Deserialize;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error reported by the gateway
    #[error("API error ({code}): {message}")]
    Api {
        code: String,
        message: String,
        request_id: Option<String>,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Signing error
    #[error("Signing error: {0}")]
    Crypto(#[from] tempdesk_crypto::CryptoError),

    /// Invalid response
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
    request_id: Option<String>,
}

impl ClientError {
    /// Parse a gateway error from a JSON response body
    pub fn from_json(body: &str, status: u16, header_code: Option<&str>) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { error }) => Self::Api {
                code: error.code,
                message: error.message,
                request_id: error.request_id,
            },
            Err(_) => Self::Api {
                code: header_code
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP{}", status)),
                message: if body.is_empty() {
                    "Unknown error".to_string()
                } else {
                    body.to_string()
                },
                request_id: None,
            },
        }
    }

    /// Error code reported by the gateway, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self.code(), Some("NoSuchFile" | "NoSuchUser"))
    }

    /// Check if this is an access denied error
    pub fn is_access_denied(&self) -> bool {
        matches!(self.code(), Some("AccessDenied"))
    }

    /// Check if the gateway refused the request signature
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self.code(),
            Some("WrongFormat" | "Outdated" | "NoUser" | "NotAuthed")
        )
    }
}
