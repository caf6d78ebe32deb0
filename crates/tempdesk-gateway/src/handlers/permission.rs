//! Permission handlers (owner only)

use super::parse_json;
use crate::auth::Caller;
use crate::{ApiError, AppState};
use axum::{
    extract::{Extension, Path, State},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use tempdesk_core::{PermissionChange, StoredFile};

/// Body of `POST /perm/{*path}`: one change or a batch applied atomically
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChangeRequest {
    Many(Vec<PermissionChange>),
    One(PermissionChange),
}

impl ChangeRequest {
    fn changes(&self) -> &[PermissionChange] {
        match self {
            Self::Many(changes) => changes,
            Self::One(change) => std::slice::from_ref(change),
        }
    }
}

fn owned_file(state: &AppState, caller: &Caller, path: &str) -> Result<Arc<StoredFile>, ApiError> {
    let user = caller.require_user()?;
    let file = state.files.get(path)?;
    if !file.is_owner(&user.name) {
        return Err(ApiError::access_denied("only the owner may manage permissions"));
    }
    Ok(file)
}

/// GET /perm/{*path} - Snapshot of a file's permission
pub async fn get_permission(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let file = owned_file(&state, &caller, &path)?;
    Ok(Json(file.permission().snapshot()).into_response())
}

/// POST /perm/{*path} - Apply permission changes
pub async fn change_permission(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let file = owned_file(&state, &caller, &path)?;
    let request: ChangeRequest = parse_json(&body)?;

    let changes = request.changes();
    file.permission().apply_all(changes);
    tracing::debug!(path = %path, changes = changes.len(), "Permission updated");

    Ok(Json(file.permission().snapshot()).into_response())
}
