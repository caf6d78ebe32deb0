//! User handlers: sign-up, profile, key and metadata updates

use super::parse_json;
use crate::auth::Caller;
use crate::{ApiError, AppState};
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tempdesk_core::{User, UserUpdate};

/// Body of `POST /user`
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

/// Body of `PUT /user`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub meta: Option<BTreeMap<String, String>>,
}

/// GET /user - Profile of the authenticated caller
pub async fn get_user(Extension(caller): Extension<Caller>) -> Result<Response, ApiError> {
    let user = caller.require_user()?;
    Ok(Json(user.profile()).into_response())
}

/// POST /user - Sign up
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let info: SignUpRequest = parse_json(&body)?;
    let user = User {
        name: info.name,
        key: info.password,
        meta: info.meta,
    };
    let profile = user.profile();

    state.users.create_user(user).map_err(|e| {
        tracing::debug!(error = %e, "Error creating new user");
        e
    })?;
    tracing::info!(user = %profile.name, "User signed up");

    Ok((StatusCode::OK, Json(profile)).into_response())
}

/// PUT /user - Replace the caller's key and/or metadata
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let user = caller.require_user()?;
    let request: UpdateUserRequest = parse_json(&body)?;

    let updated = state.users.update_user(
        &user.name,
        UserUpdate {
            key: request.password,
            meta: request.meta,
        },
    )?;

    Ok(Json(updated.profile()).into_response())
}

/// DELETE /user - Remove the caller
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Response, ApiError> {
    let user = caller.require_user()?;
    state.users.delete_user(&user.name)?;
    tracing::info!(user = %user.name, "User deleted");

    Ok(StatusCode::NO_CONTENT.into_response())
}
