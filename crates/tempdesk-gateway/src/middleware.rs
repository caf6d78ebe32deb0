//! HTTP middleware for authentication, request ids and logging

use crate::auth::{has_credentials, Caller};
use crate::error::REQUEST_ID_HEADER;
use crate::{ApiError, AppState};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authentication middleware.
///
/// Requests without `Authorization` and `Date` continue as
/// [`Caller::Anonymous`]; anything else must authenticate or is rejected.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = if has_credentials(request.headers()) {
        let user = state
            .authenticate(request.method(), request.uri().path(), request.headers())
            .map_err(|e| {
                tracing::debug!(
                    kind = e.kind().as_str(),
                    error = %e,
                    path = %request.uri().path(),
                    "Error authenticating"
                );
                e
            })?;
        Caller::User(user)
    } else {
        Caller::Anonymous
    };

    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}

/// Request ID middleware - adds an `x-request-id` header unless an error
/// response already carries one
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if !response.headers().contains_key(REQUEST_ID_HEADER) {
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }
    }
    response
}

/// Request ID extension
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Logging middleware. Only the path is logged; queries may carry access codes.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}
