//! File handlers

use crate::auth::Caller;
use crate::{ApiError, AppState, ErrorCode};
use axum::{
    extract::{Extension, Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tempdesk_core::{CoreError, StoredFile};

/// Prefix of request/response headers carrying file metadata
pub const META_HEADER_PREFIX: &str = "x-desk-meta-";

/// Response header naming the owner of a file
pub const OWNER_HEADER: &str = "x-desk-owner";

/// Query parameters accepted on `/files/{*path}`
#[derive(Debug, Default, Deserialize)]
pub struct FileQuery {
    /// Access code for public files
    pub code: Option<String>,
    /// Destination of a rename
    pub rename_to: Option<String>,
}

/// Summary returned after a write or rename
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub owner: String,
    pub size: u64,
}

impl FileInfo {
    fn new(path: impl Into<String>, file: &StoredFile) -> Self {
        Self {
            path: path.into(),
            owner: file.owner().to_string(),
            size: file.len(),
        }
    }
}

/// Whether `caller` (or the presented code) may read `file`
fn can_read(file: &StoredFile, caller: &Caller, code: Option<&str>) -> bool {
    if let Some(user) = caller.user() {
        if file.is_owner(&user.name) || file.permission().test_user(user) {
            return true;
        }
    }
    code.is_some_and(|code| file.permission().test_code(code))
}

/// PUT /files/{*path} - Create or overwrite a file
pub async fn put_file(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let user = caller.require_user()?;

    let (file, status) = match state.files.get(&path) {
        Ok(file) => {
            if !file.is_owner(&user.name) && !file.permission().test_user(user) {
                return Err(ApiError::access_denied("write access to file denied"));
            }
            (file, StatusCode::OK)
        }
        Err(CoreError::FileNotFound(_)) => {
            tracing::debug!(path = %path, owner = %user.name, "Creating file");
            (state.files.create(&path, &user.name)?, StatusCode::CREATED)
        }
        Err(e) => return Err(e.into()),
    };

    file.replace(&body);

    // Extract file metadata (x-desk-meta-*)
    for (name, value) in headers.iter() {
        if let Some(key) = name.as_str().strip_prefix(META_HEADER_PREFIX) {
            if let Ok(v) = value.to_str() {
                file.write_meta(key, v);
            }
        }
    }

    Ok((status, Json(FileInfo::new(path, &file))).into_response())
}

/// GET /files/{*path} - Read a file
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(path): Path<String>,
    Query(query): Query<FileQuery>,
) -> Result<Response, ApiError> {
    let file = state.files.get(&path)?;

    if !can_read(&file, &caller, query.code.as_deref()) {
        tracing::debug!(path = %path, caller = caller.log_name(), "Read refused");
        return Err(ApiError::access_denied("read access to file denied"));
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    if let Ok(owner) = HeaderValue::from_str(file.owner()) {
        headers.insert(HeaderName::from_static(OWNER_HEADER), owner);
    }
    for (key, value) in file.string_meta() {
        let name = HeaderName::try_from(format!("{}{}", META_HEADER_PREFIX, key));
        if let (Ok(name), Ok(value)) = (name, HeaderValue::from_str(&value)) {
            headers.insert(name, value);
        }
    }

    Ok((StatusCode::OK, headers, file.contents()).into_response())
}

/// DELETE /files/{*path} - Remove a file (owner only)
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let user = caller.require_user()?;
    let file = state.files.get(&path)?;
    if !file.is_owner(&user.name) {
        return Err(ApiError::access_denied("only the owner may delete a file"));
    }

    state.files.remove(&path)?;
    tracing::debug!(path = %path, owner = %user.name, "File removed");

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// POST /files/{*path}?rename_to=dest - Rename a file (owner only)
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(path): Path<String>,
    Query(query): Query<FileQuery>,
) -> Result<Response, ApiError> {
    let user = caller.require_user()?;
    let dest = query
        .rename_to
        .ok_or_else(|| ApiError::new(ErrorCode::InvalidRequest, "missing rename_to"))?;

    let file = state.files.get(&path)?;
    if !file.is_owner(&user.name) {
        return Err(ApiError::access_denied("only the owner may rename a file"));
    }
    if let Ok(existing) = state.files.get(&dest) {
        if !existing.is_owner(&user.name) {
            return Err(ApiError::access_denied("destination belongs to another user"));
        }
    }

    state.files.rename(&dest, &path)?;
    tracing::debug!(from = %path, to = %dest, "File renamed");

    Ok(Json(FileInfo::new(dest, &file)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdesk_core::{PermissionChange, User};

    #[test]
    fn test_can_read() {
        let file = StoredFile::new("Sam");
        let sam = Caller::User(User::new("Sam", "password"));
        let tom = Caller::User(User::new("Tom", "password"));

        // Blacklist with nobody blocked admits everyone
        assert!(can_read(&file, &sam, None));
        assert!(can_read(&file, &tom, None));
        assert!(!can_read(&file, &Caller::Anonymous, None));

        file.permission().block_all_users();
        assert!(can_read(&file, &sam, None));
        assert!(!can_read(&file, &tom, None));

        file.permission().update(|perm| {
            PermissionChange::AllowPublic { code: String::new() }.apply(perm);
            PermissionChange::AllowCode { code: "1234".into() }.apply(perm);
        });
        assert!(can_read(&file, &Caller::Anonymous, Some("1234")));
        assert!(!can_read(&file, &Caller::Anonymous, Some("4321")));
        assert!(can_read(&file, &sam, None));
        assert!(!can_read(&file, &tom, None));
    }
}
