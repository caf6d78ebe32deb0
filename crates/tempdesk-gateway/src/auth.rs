//! Request identity

use crate::ApiError;
use axum::http::{header, HeaderMap};
use tempdesk_core::User;

/// Who is behind a request, as established by the auth middleware
#[derive(Clone, Debug)]
pub enum Caller {
    /// A principal whose signature verified
    User(User),
    /// No credentials were presented
    Anonymous,
}

impl Caller {
    /// The authenticated user, if any
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    /// The authenticated user, or `AccessDenied`
    pub fn require_user(&self) -> Result<&User, ApiError> {
        self.user()
            .ok_or_else(|| ApiError::access_denied("authentication required"))
    }

    /// Name used in logs
    pub fn log_name(&self) -> &str {
        match self {
            Self::User(user) => &user.name,
            Self::Anonymous => "anonymous",
        }
    }
}

/// Whether the request attempts signed authentication at all
pub fn has_credentials(headers: &HeaderMap) -> bool {
    headers.contains_key(header::AUTHORIZATION) || headers.contains_key(header::DATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_has_credentials() {
        let mut headers = HeaderMap::new();
        assert!(!has_credentials(&headers));

        headers.insert(header::DATE, HeaderValue::from_static("Sun, 06 Nov 1994 08:49:37 GMT"));
        assert!(has_credentials(&headers));
    }

    #[test]
    fn test_require_user() {
        assert!(Caller::Anonymous.require_user().is_err());
        let caller = Caller::User(User::new("Sam", "password"));
        assert_eq!(caller.require_user().unwrap().name, "Sam");
        assert_eq!(caller.log_name(), "Sam");
    }
}
