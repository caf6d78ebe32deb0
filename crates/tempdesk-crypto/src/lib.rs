//! # tempdesk Crypto
//!
//! Request digests for the tempdesk file-sharing desk.
//!
//! This crate provides:
//! - **HMAC-SHA256**: keyed digests over canonical signing messages
//! - **Digest Verification**: constant-time comparison of claimed digests
//!
//! Digests travel as standard base64 (with padding) inside the
//! `Authorization: HMAC <name> <digest>` header.
//!
//! ## Example
//!
//! ```rust
//! use tempdesk_crypto::{sign, verify};
//!
//! let digest = sign(b"GET\n/\nSam\nThu, 01 Jan 2026 00:00:00 GMT", b"password").unwrap();
//! assert!(verify(b"GET\n/\nSam\nThu, 01 Jan 2026 00:00:00 GMT", &digest, b"password"));
//! ```

pub mod digest;
pub mod error;

pub use digest::{decode_digest, digest, sign, verify, HmacSha256, DIGEST_BYTE_SIZE};
pub use error::{CryptoError, Result};
