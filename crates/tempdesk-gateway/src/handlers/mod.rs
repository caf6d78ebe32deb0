//! Request handlers

pub mod file;
pub mod permission;
pub mod service;
pub mod user;

pub use file::*;
pub use permission::*;
pub use service::*;
pub use user::*;

use crate::{ApiError, ErrorCode};
use serde::de::DeserializeOwned;

/// Parse a JSON request body, reporting failures as `MalformedJson`
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Error parsing submitted json");
        ApiError::new(ErrorCode::MalformedJson, format!("error parsing submitted json: {}", e))
    })
}
