//! # tempdesk
//!
//! A small file-sharing desk: HMAC-signed requests and per-file
//! permissions. This crate re-exports the workspace members.
//!
//! - [`crypto`]: HMAC-SHA256 digests
//! - [`core`]: request authentication, permissions, user and file stores
//! - [`gateway`]: the HTTP server
//! - [`client`]: the signing client SDK

pub use tempdesk_client as client;
pub use tempdesk_core as core;
pub use tempdesk_crypto as crypto;
pub use tempdesk_gateway as gateway;
