//! # tempdesk Core
//!
//! Access control and request authentication for the tempdesk file-sharing
//! desk.
//!
//! This crate provides:
//! - **Request Authentication**: stateless HMAC-signed requests
//! - **File Permission**: per-file private (black/whitelist) and public
//!   (access code) regimes
//! - **User Store**: principals with shared secret keys
//! - **File Store**: in-memory named files with their own permission
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            HTTP gateway                 │
//! ├─────────────────────────────────────────┤
//! │  HmacAuthenticator  │  FilePermission   │
//! ├─────────────────────┼───────────────────┤
//! │  UserStore          │  MemoryFileStore  │
//! ├─────────────────────┴───────────────────┤
//! │         tempdesk-crypto (HMAC)          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate logs; callers decide what to record.

pub mod auth;
pub mod error;
pub mod file;
pub mod http_date;
pub mod permission;
pub mod user;

pub use auth::{AuthError, AuthErrorKind, HmacAuthenticator, AUTH_SCHEME, DEFAULT_AUTH_WINDOW};
pub use error::{CoreError, Result};
pub use file::{FileHandle, MemoryFileStore, StoredFile};
pub use permission::{FilePermission, PermissionChange, SharedPermission, UserMetaRules};
pub use user::{MemoryUserStore, User, UserLookup, UserProfile, UserStore, UserUpdate};
