//! Signed-request authentication
//!
//! Clients authenticate every request with two headers:
//!
//! ```text
//! Date: Sun, 06 Nov 1994 08:49:37 GMT
//! Authorization: HMAC <name> <base64(HMAC-SHA256(key, message))>
//! ```
//!
//! where `message` is `METHOD\nPATH\nNAME\nDATE`: the request method, the
//! request path without query string, the principal name and the raw `Date`
//! header value, joined by `\n` with no trailing newline.
//!
//! Authentication is stateless. Nothing is cached or created on success.

use crate::http_date;
use crate::user::{User, UserLookup};
use chrono::{DateTime, Utc};
use http::header::{AUTHORIZATION, DATE};
use http::{HeaderMap, Method};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Scheme token at the start of the `Authorization` header
pub const AUTH_SCHEME: &str = "HMAC";

/// Largest accepted distance between the `Date` header and now, either way
pub const DEFAULT_AUTH_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Why a request could not be authenticated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Missing or malformed `Authorization`/`Date` header
    #[error("wrong format: {0}")]
    WrongFormat(&'static str),

    /// `Date` is outside the replay window
    #[error("message outdated")]
    Outdated,

    /// Principal is not registered
    #[error("no such user: {0}")]
    NoUser(String),

    /// Digest does not match
    #[error("not authenticated")]
    NotAuthed,
}

/// Classification of an [`AuthError`], without details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AuthErrorKind {
    WrongFormat,
    Outdated,
    NoUser,
    NotAuthed,
}

impl AuthErrorKind {
    /// Stable name of the failure kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WrongFormat => "WrongFormat",
            Self::Outdated => "Outdated",
            Self::NoUser => "NoUser",
            Self::NotAuthed => "NotAuthed",
        }
    }
}

impl AuthError {
    /// Failure kind
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            Self::WrongFormat(_) => AuthErrorKind::WrongFormat,
            Self::Outdated => AuthErrorKind::Outdated,
            Self::NoUser(_) => AuthErrorKind::NoUser,
            Self::NotAuthed => AuthErrorKind::NotAuthed,
        }
    }
}

/// Build the canonical message a client signs
pub fn signing_message(method: &str, path: &str, name: &str, date: &str) -> String {
    format!("{}\n{}\n{}\n{}", method, path, name, date)
}

/// Build an `Authorization` header value
pub fn authorization_header(name: &str, digest: &str) -> String {
    format!("{} {} {}", AUTH_SCHEME, name, digest)
}

fn header<'a>(headers: &'a HeaderMap, name: http::header::HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// HMAC-SHA256 request authenticator
#[derive(Clone, Copy, Debug)]
pub struct HmacAuthenticator {
    window: Duration,
}

impl Default for HmacAuthenticator {
    fn default() -> Self {
        Self {
            window: DEFAULT_AUTH_WINDOW,
        }
    }
}

impl HmacAuthenticator {
    /// Authenticator with the default ten-minute replay window
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different replay window
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Replay window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Authenticate a request against the current time
    pub fn authenticate<L>(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        users: &L,
    ) -> Result<User, AuthError>
    where
        L: UserLookup + ?Sized,
    {
        self.authenticate_at(method, path, headers, users, Utc::now())
    }

    /// Authenticate a request as if it were received at `now`
    pub fn authenticate_at<L>(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        users: &L,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError>
    where
        L: UserLookup + ?Sized,
    {
        let (Some(authorization), Some(date)) =
            (header(headers, AUTHORIZATION), header(headers, DATE))
        else {
            return Err(AuthError::WrongFormat("missing header"));
        };

        let sent_at =
            http_date::parse(date).ok_or(AuthError::WrongFormat("wrong date header format"))?;

        let skew = if now >= sent_at { now - sent_at } else { sent_at - now };
        if skew.to_std().map_or(true, |skew| skew > self.window) {
            return Err(AuthError::Outdated);
        }

        let fields: Vec<&str> = authorization.split_whitespace().collect();
        let [scheme, name, digest] = fields[..] else {
            return Err(AuthError::WrongFormat("wrong authorization header format"));
        };
        if scheme != AUTH_SCHEME {
            return Err(AuthError::WrongFormat("wrong authorization header format"));
        }

        let user = users
            .user(name)
            .ok_or_else(|| AuthError::NoUser(name.to_string()))?;

        let message = signing_message(method.as_str(), path, name, date);
        if !tempdesk_crypto::verify(message.as_bytes(), digest, user.key_bytes()) {
            return Err(AuthError::NotAuthed);
        }

        Ok(user)
    }
}
