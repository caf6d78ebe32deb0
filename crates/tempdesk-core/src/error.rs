//! Error types for the tempdesk-core crate

use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in user and file store operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// A user with this name is already registered
    #[error("name already exists: {0}")]
    NameAlreadyExists(String),

    /// User not found
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Invalid user name
    #[error("invalid user name: {0:?}")]
    InvalidUserName(String),

    /// File not found
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// File already exists
    #[error("file already exists: {0}")]
    FileAlreadyExists(String),

    /// Invalid file path
    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    /// Positional access before the start of a file
    #[error("negative offset: {0}")]
    NegativeOffset(i64),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
