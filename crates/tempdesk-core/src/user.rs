//! Principals and the user store
//!
//! A [`User`] is the authentication principal: a unique name, the shared
//! secret key used to sign requests, and free-form string metadata. The key
//! never leaves the service; [`UserProfile`] is the client-visible view.

use crate::{CoreError, Result};
use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An authentication principal
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Unique name, also the principal in `Authorization`
    pub name: String,
    /// Shared secret key
    pub key: String,
    /// Arbitrary user metadata
    pub meta: BTreeMap<String, String>,
}

impl User {
    /// Create a user with empty metadata
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            meta: BTreeMap::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Secret key as bytes, for digest verification
    pub fn key_bytes(&self) -> &[u8] {
        self.key.as_bytes()
    }

    /// Client-visible projection without the key
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            name: self.name.clone(),
            meta: self.meta.clone(),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("key", &"<redacted>")
            .field("meta", &self.meta)
            .finish()
    }
}

/// Public view of a user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

/// Replacement values for a user; the name is immutable
#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    /// New secret key
    pub key: Option<String>,
    /// New metadata, replacing the old map entirely
    pub meta: Option<BTreeMap<String, String>>,
}

/// Lookup-by-name capability consumed by the authenticator.
///
/// Implementations must be safe for concurrent readers.
pub trait UserLookup: Send + Sync {
    /// Find a user by name
    fn user(&self, name: &str) -> Option<User>;
}

/// A user store with full lifecycle operations
pub trait UserStore: UserLookup {
    /// Register a new user
    fn create_user(&self, user: User) -> Result<()>;

    /// Replace key and/or metadata of an existing user
    fn update_user(&self, name: &str, update: UserUpdate) -> Result<User>;

    /// Remove a user, returning it
    fn delete_user(&self, name: &str) -> Result<User>;

    /// Number of registered users
    fn len(&self) -> usize;

    /// Whether no user is registered
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Check that a name can travel as a single `Authorization` token
pub fn validate_user_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CoreError::InvalidUserName(name.to_string()));
    }
    Ok(())
}

/// An in-memory user store
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: DashMap<String, User>,
}

impl MemoryUserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all registered users, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.users.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl UserLookup for MemoryUserStore {
    fn user(&self, name: &str) -> Option<User> {
        self.users.get(name).map(|entry| entry.value().clone())
    }
}

impl UserStore for MemoryUserStore {
    fn create_user(&self, user: User) -> Result<()> {
        validate_user_name(&user.name)?;
        match self.users.entry(user.name.clone()) {
            Entry::Occupied(_) => Err(CoreError::NameAlreadyExists(user.name)),
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(())
            }
        }
    }

    fn update_user(&self, name: &str, update: UserUpdate) -> Result<User> {
        let mut entry = self
            .users
            .get_mut(name)
            .ok_or_else(|| CoreError::UserNotFound(name.to_string()))?;
        if let Some(key) = update.key {
            entry.key = key;
        }
        if let Some(meta) = update.meta {
            entry.meta = meta;
        }
        Ok(entry.value().clone())
    }

    fn delete_user(&self, name: &str) -> Result<User> {
        self.users
            .remove(name)
            .map(|(_, user)| user)
            .ok_or_else(|| CoreError::UserNotFound(name.to_string()))
    }

    fn len(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_lookup() {
        let store = MemoryUserStore::new();
        store
            .create_user(User::new("Sam", "password").with_meta("team", "ops"))
            .unwrap();

        let sam = store.user("Sam").unwrap();
        assert_eq!(sam.key, "password");
        assert_eq!(sam.meta.get("team").map(String::as_str), Some("ops"));
        assert!(store.user("Tom").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let store = MemoryUserStore::new();
        store.create_user(User::new("Sam", "password")).unwrap();

        let err = store.create_user(User::new("Sam", "other")).unwrap_err();
        assert!(matches!(err, CoreError::NameAlreadyExists(name) if name == "Sam"));
        assert_eq!(store.user("Sam").unwrap().key, "password");
    }

    #[test]
    fn test_invalid_names_rejected() {
        let store = MemoryUserStore::new();
        for name in ["", "Sam Smith", "tab\there", "line\n"] {
            assert!(matches!(
                store.create_user(User::new(name, "k")),
                Err(CoreError::InvalidUserName(_))
            ));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_replaces_key_and_meta() {
        let store = MemoryUserStore::new();
        store
            .create_user(User::new("Sam", "password").with_meta("a", "1"))
            .unwrap();

        let updated = store
            .update_user(
                "Sam",
                UserUpdate {
                    key: Some("new-key".to_string()),
                    meta: None,
                },
            )
            .unwrap();
        assert_eq!(updated.key, "new-key");
        assert_eq!(updated.meta.len(), 1);

        let updated = store
            .update_user(
                "Sam",
                UserUpdate {
                    key: None,
                    meta: Some(BTreeMap::new()),
                },
            )
            .unwrap();
        assert_eq!(updated.key, "new-key");
        assert!(updated.meta.is_empty());

        assert!(matches!(
            store.update_user("Tom", UserUpdate::default()),
            Err(CoreError::UserNotFound(_))
        ));
    }

    #[test]
    fn test_delete() {
        let store = MemoryUserStore::new();
        store.create_user(User::new("Sam", "password")).unwrap();

        let removed = store.delete_user("Sam").unwrap();
        assert_eq!(removed.name, "Sam");
        assert!(store.user("Sam").is_none());
        assert!(matches!(store.delete_user("Sam"), Err(CoreError::UserNotFound(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let user = User::new("Sam", "super-secret");
        let printed = format!("{:?}", user);
        assert!(printed.contains("Sam"));
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn test_profile_has_no_key() {
        let user = User::new("Sam", "super-secret").with_meta("team", "ops");
        let json = serde_json::to_string(&user.profile()).unwrap();
        assert!(json.contains("\"name\":\"Sam\""));
        assert!(!json.contains("super-secret"));
    }
}
