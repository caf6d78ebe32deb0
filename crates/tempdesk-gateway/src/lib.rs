//! # tempdesk Gateway
//!
//! HTTP front end for the tempdesk file-sharing desk.
//!
//! This crate provides:
//! - **Signed Requests**: `Authorization: HMAC <name> <digest>` checked
//!   against a `Date` replay window
//! - **Users**: sign-up and profile management
//! - **Files**: owner-managed files with per-file permissions
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! │            (tempdesk-client, curl, etc.)            │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                 tempdesk Gateway                    │
//! ├─────────────────────────────────────────────────────┤
//! │  Request Id │ Logging │ Auth Middleware             │
//! ├─────────────────────────────────────────────────────┤
//! │        User / File / Permission Handlers            │
//! ├─────────────────────────────────────────────────────┤
//! │                  tempdesk-core                      │
//! │     (HmacAuthenticator, FilePermission, stores)     │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::Caller;
pub use config::GatewayConfig;
pub use error::{ApiError, ErrorCode};
pub use server::{run_server, run_server_with_shutdown, serve};
pub use state::AppState;
