//! Error types for the tempdesk-crypto crate

use thiserror::Error;

/// Result type alias using `CryptoError`
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur while computing or decoding digests
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The MAC rejected the key
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Base64 decode error
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Decoded digest has the wrong size
    #[error("invalid digest length: expected {expected} bytes, got {actual}")]
    DigestLength { expected: usize, actual: usize },
}
