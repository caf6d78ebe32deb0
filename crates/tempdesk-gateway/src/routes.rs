//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue},
    middleware as axum_middleware,
    routing::{get, head},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        // Service endpoints
        .route("/", head(handlers::health_check))
        // User endpoints
        .route(
            "/user",
            get(handlers::get_user)
                .post(handlers::sign_up)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // File endpoints
        .route(
            "/files/{*path}",
            get(handlers::get_file)
                .put(handlers::put_file)
                .delete(handlers::delete_file)
                .post(handlers::rename_file),
        )
        // Permission endpoints
        .route(
            "/perm/{*path}",
            get(handlers::get_permission).post(handlers::change_permission),
        )
        // Apply middleware
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::auth_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware));

    let router = if state.config.cors_enabled {
        router.layer(cors_layer(&state.config.cors_origins))
    } else {
        router
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(crate::error::REQUEST_ID_HEADER),
            HeaderName::from_static(crate::error::ERROR_CODE_HEADER),
            HeaderName::from_static(handlers::OWNER_HEADER),
        ])
}
