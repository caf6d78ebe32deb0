//! Error types and API error codes

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tempdesk_core::{AuthError, AuthErrorKind, CoreError};
use thiserror::Error;

/// Header carrying the request id on every response
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the error code on error responses
pub const ERROR_CODE_HEADER: &str = "x-desk-error-code";

/// API error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    AccessDenied,
    WrongFormat,
    Outdated,
    NoUser,
    NotAuthed,
    NameAlreadyExists,
    InvalidUserName,
    NoSuchUser,
    NoSuchFile,
    FileAlreadyExists,
    InvalidPath,
    InvalidRequest,
    MalformedJson,
    InternalError,
}

impl ErrorCode {
    /// Get the error code string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessDenied => "AccessDenied",
            Self::WrongFormat => "WrongFormat",
            Self::Outdated => "Outdated",
            Self::NoUser => "NoUser",
            Self::NotAuthed => "NotAuthed",
            Self::NameAlreadyExists => "NameAlreadyExists",
            Self::InvalidUserName => "InvalidUserName",
            Self::NoSuchUser => "NoSuchUser",
            Self::NoSuchFile => "NoSuchFile",
            Self::FileAlreadyExists => "FileAlreadyExists",
            Self::InvalidPath => "InvalidPath",
            Self::InvalidRequest => "InvalidRequest",
            Self::MalformedJson => "MalformedJson",
            Self::InternalError => "InternalError",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::WrongFormat | Self::Outdated => StatusCode::BAD_REQUEST,
            Self::NoUser | Self::NotAuthed | Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::NameAlreadyExists
            | Self::InvalidUserName
            | Self::InvalidPath
            | Self::InvalidRequest
            | Self::MalformedJson => StatusCode::BAD_REQUEST,
            Self::NoSuchUser | Self::NoSuchFile => StatusCode::NOT_FOUND,
            Self::FileAlreadyExists => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthErrorKind> for ErrorCode {
    fn from(kind: AuthErrorKind) -> Self {
        match kind {
            AuthErrorKind::WrongFormat => Self::WrongFormat,
            AuthErrorKind::Outdated => Self::Outdated,
            AuthErrorKind::NoUser => Self::NoUser,
            AuthErrorKind::NotAuthed => Self::NotAuthed,
        }
    }
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error details returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub request_id: String,
}

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Api {
        code: ErrorCode,
        message: String,
        request_id: String,
    },

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a new API error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Caller is not allowed to perform the operation
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AccessDenied, message)
    }

    /// Get the error code
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Api { code, .. } => *code,
            Self::Auth(e) => e.kind().into(),
            Self::Core(e) => match e {
                CoreError::NameAlreadyExists(_) => ErrorCode::NameAlreadyExists,
                CoreError::InvalidUserName(_) => ErrorCode::InvalidUserName,
                CoreError::UserNotFound(_) => ErrorCode::NoSuchUser,
                CoreError::FileNotFound(_) => ErrorCode::NoSuchFile,
                CoreError::FileAlreadyExists(_) => ErrorCode::FileAlreadyExists,
                CoreError::InvalidPath(_) => ErrorCode::InvalidPath,
                CoreError::NegativeOffset(_) => ErrorCode::InvalidRequest,
                CoreError::Io(_) => ErrorCode::InternalError,
            },
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let status = code.status_code();
        let request_id = match &self {
            ApiError::Api { request_id, .. } => request_id.clone(),
            _ => uuid::Uuid::new_v4().to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, request_id = %request_id, "Request failed");
        }

        let message = match code {
            // Internal details stay in the log
            ErrorCode::InternalError => "internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.as_str().to_string(),
                message,
                request_id: request_id.clone(),
            },
        };

        let mut response = (status, Json(body)).into_response();
        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }
        headers.insert(
            HeaderName::from_static(ERROR_CODE_HEADER),
            HeaderValue::from_static(code.as_str()),
        );
        response
    }
}
