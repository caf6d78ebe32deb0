//! Per-file access control
//!
//! Every file carries one [`FilePermission`]. It is always in exactly one of
//! two regimes:
//!
//! - **Private**: identity based. A switch selects between blacklist mode
//!   (everyone except `blocked`) and whitelist mode (nobody except
//!   `allowed`). This is the initial regime, in blacklist mode with both
//!   sets empty, so a fresh file admits everyone.
//! - **Public**: code based. Anyone presenting a registered access code is
//!   admitted, and [`FilePermission::test_user`] admits every identity.
//!
//! The private rules survive a public excursion untouched and take effect
//! again after [`FilePermission::block_public`].
//!
//! Mutations that do not apply to the current regime or list mode are
//! silently ignored. Callers that need confirmation re-test afterwards.
//!
//! ```text
//!                 allow_public
//!   ┌──────────────────────────────┐
//!   │ Private                      ▼
//!   │  Blacklist ◄──allow_all──┐  Public {codes}
//!   │  Whitelist ──block_all──►┘   │
//!   └──────────────◄───────────────┘
//!                 block_public
//! ```

use crate::user::User;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Active access-control regime of a file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Regime {
    /// Identity based; governed by the private rules
    #[default]
    Private,
    /// Code based; the private rules are kept but inert
    Public { codes: BTreeSet<String> },
}

/// Identity rules used while the file is private
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateRules {
    /// Whitelist mode when set, blacklist mode otherwise
    pub is_blocked: bool,
    /// Names admitted in whitelist mode
    pub allowed: BTreeSet<String>,
    /// Names refused in blacklist mode
    pub blocked: BTreeSet<String>,
}

/// Metadata-based rules (for example group membership).
///
/// The base permission model carries no metadata rules; the default bodies
/// do nothing. Permission types that want them override these methods.
pub trait UserMetaRules {
    /// Admit users whose metadata has `key` = `value`
    fn allow_user_meta(&mut self, _key: &str, _value: &str) {}

    /// Refuse users whose metadata has `key` = `value`
    fn block_user_meta(&mut self, _key: &str, _value: &str) {}
}

/// Authorization state of a single file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePermission {
    regime: Regime,
    private: PrivateRules,
}

impl FilePermission {
    /// Private, blacklist mode, nobody blocked
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the public regime is active
    pub fn is_public(&self) -> bool {
        matches!(self.regime, Regime::Public { .. })
    }

    /// Whether the private rules are in whitelist mode
    pub fn is_blocked(&self) -> bool {
        self.private.is_blocked
    }

    /// Current regime
    pub fn regime(&self) -> &Regime {
        &self.regime
    }

    /// Private rules, whether or not they are currently in effect
    pub fn private_rules(&self) -> &PrivateRules {
        &self.private
    }

    /// Registered access codes, if public
    pub fn codes(&self) -> Option<&BTreeSet<String>> {
        match &self.regime {
            Regime::Public { codes } => Some(codes),
            Regime::Private => None,
        }
    }

    fn private_mut(&mut self) -> Option<&mut PrivateRules> {
        match self.regime {
            Regime::Private => Some(&mut self.private),
            Regime::Public { .. } => None,
        }
    }

    fn codes_mut(&mut self) -> Option<&mut BTreeSet<String>> {
        match &mut self.regime {
            Regime::Public { codes } => Some(codes),
            Regime::Private => None,
        }
    }

    /// Admit `name`. Only effective while private and in whitelist mode.
    pub fn allow_user(&mut self, name: &str) {
        if let Some(rules) = self.private_mut().filter(|r| r.is_blocked) {
            rules.blocked.remove(name);
            rules.allowed.insert(name.to_string());
        }
    }

    /// Refuse `name`. Only effective while private and in blacklist mode.
    pub fn block_user(&mut self, name: &str) {
        if let Some(rules) = self.private_mut().filter(|r| !r.is_blocked) {
            rules.allowed.remove(name);
            rules.blocked.insert(name.to_string());
        }
    }

    /// Switch to blacklist mode with nobody blocked. Only effective while private.
    pub fn allow_all_users(&mut self) {
        if let Some(rules) = self.private_mut() {
            rules.is_blocked = false;
            rules.blocked.clear();
        }
    }

    /// Switch to whitelist mode with nobody allowed. Only effective while private.
    pub fn block_all_users(&mut self) {
        if let Some(rules) = self.private_mut() {
            rules.is_blocked = true;
            rules.allowed.clear();
        }
    }

    /// Enter the public regime with an empty code set.
    ///
    /// `code` is accepted but not registered: the code set is reset, and a
    /// following [`allow_code`](Self::allow_code) is needed before any code
    /// is admitted. Calling this while already public also clears the codes.
    pub fn allow_public(&mut self, _code: &str) {
        self.regime = Regime::Public {
            codes: BTreeSet::new(),
        };
    }

    /// Register an access code. Only effective while public.
    pub fn allow_code(&mut self, code: &str) {
        if let Some(codes) = self.codes_mut() {
            codes.insert(code.to_string());
        }
    }

    /// Leave the public regime; the private rules apply again as they were.
    pub fn block_public(&mut self) {
        self.regime = Regime::Private;
    }

    /// Withdraw an access code. Only effective while public.
    pub fn block_code(&mut self, code: &str) {
        if let Some(codes) = self.codes_mut() {
            codes.remove(code);
        }
    }

    /// Whether `user` may access the file
    pub fn test_user(&self, user: &User) -> bool {
        self.test_name(&user.name)
    }

    /// Whether the principal called `name` may access the file
    pub fn test_name(&self, name: &str) -> bool {
        let rules = &self.private;
        self.is_public()
            || (rules.is_blocked && rules.allowed.contains(name))
            || (!rules.is_blocked && !rules.blocked.contains(name))
    }

    /// Whether `code` grants anonymous access. Always false while private.
    pub fn test_code(&self, code: &str) -> bool {
        self.codes().is_some_and(|codes| codes.contains(code))
    }
}

impl UserMetaRules for FilePermission {}

/// A grant or revoke request, as sent over the wire by file owners
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PermissionChange {
    AllowUser { name: String },
    BlockUser { name: String },
    AllowAllUsers,
    BlockAllUsers,
    AllowPublic {
        #[serde(default)]
        code: String,
    },
    AllowCode { code: String },
    BlockPublic,
    BlockCode { code: String },
    AllowUserMeta { key: String, value: String },
    BlockUserMeta { key: String, value: String },
}

impl PermissionChange {
    /// Apply this change; guarded no-ops follow the permission rules
    pub fn apply(&self, perm: &mut FilePermission) {
        match self {
            Self::AllowUser { name } => perm.allow_user(name),
            Self::BlockUser { name } => perm.block_user(name),
            Self::AllowAllUsers => perm.allow_all_users(),
            Self::BlockAllUsers => perm.block_all_users(),
            Self::AllowPublic { code } => perm.allow_public(code),
            Self::AllowCode { code } => perm.allow_code(code),
            Self::BlockPublic => perm.block_public(),
            Self::BlockCode { code } => perm.block_code(code),
            Self::AllowUserMeta { key, value } => perm.allow_user_meta(key, value),
            Self::BlockUserMeta { key, value } => perm.block_user_meta(key, value),
        }
    }
}

/// A [`FilePermission`] behind a reader/writer lock.
///
/// Tests take the read lock and mutations the write lock, so a half-applied
/// change (for example the mode flipped before the set is cleared) is never
/// observable. Decide once, then act: a result returned by `test_*` is not
/// revoked by a later change.
#[derive(Debug, Default)]
pub struct SharedPermission {
    inner: RwLock<FilePermission>,
}

impl SharedPermission {
    /// Wrap an existing permission
    pub fn new(permission: FilePermission) -> Self {
        Self {
            inner: RwLock::new(permission),
        }
    }

    pub fn allow_user(&self, name: &str) {
        self.inner.write().allow_user(name);
    }

    pub fn block_user(&self, name: &str) {
        self.inner.write().block_user(name);
    }

    pub fn allow_all_users(&self) {
        self.inner.write().allow_all_users();
    }

    pub fn block_all_users(&self) {
        self.inner.write().block_all_users();
    }

    pub fn allow_public(&self, code: &str) {
        self.inner.write().allow_public(code);
    }

    pub fn allow_code(&self, code: &str) {
        self.inner.write().allow_code(code);
    }

    pub fn block_public(&self) {
        self.inner.write().block_public();
    }

    pub fn block_code(&self, code: &str) {
        self.inner.write().block_code(code);
    }

    pub fn allow_user_meta(&self, key: &str, value: &str) {
        self.inner.write().allow_user_meta(key, value);
    }

    pub fn block_user_meta(&self, key: &str, value: &str) {
        self.inner.write().block_user_meta(key, value);
    }

    pub fn test_user(&self, user: &User) -> bool {
        self.inner.read().test_user(user)
    }

    pub fn test_name(&self, name: &str) -> bool {
        self.inner.read().test_name(name)
    }

    pub fn test_code(&self, code: &str) -> bool {
        self.inner.read().test_code(code)
    }

    /// Apply changes as one atomic step under the write lock
    pub fn apply_all<'a>(&self, changes: impl IntoIterator<Item = &'a PermissionChange>) {
        let mut guard = self.inner.write();
        for change in changes {
            change.apply(&mut guard);
        }
    }

    /// Run `f` with exclusive access
    pub fn update<R>(&self, f: impl FnOnce(&mut FilePermission) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> FilePermission {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::sync::Arc;

    fn user(name: &str) -> User {
        User::new(name, "key")
    }

    #[test]
    fn test_default_admits_everyone() {
        let perm = FilePermission::new();
        assert!(!perm.is_public());
        assert!(!perm.is_blocked());
        assert!(perm.test_user(&user("Sam")));
        assert!(perm.test_user(&user("")));
        assert!(!perm.test_code("anything"));
    }

    #[test]
    fn test_blacklist_blocks_single_user() {
        let mut perm = FilePermission::new();
        perm.allow_all_users();
        perm.block_user("Sam");

        assert!(!perm.test_user(&user("Sam")));
        assert!(perm.test_user(&user("Tom")));
    }

    #[test]
    fn test_block_user_ignored_in_whitelist_mode() {
        let mut perm = FilePermission::new();
        perm.block_all_users();
        let before = perm.clone();
        let sam_before = perm.test_user(&user("Sam"));

        perm.block_user("Sam");

        assert_eq!(perm, before);
        assert_eq!(perm.test_user(&user("Sam")), sam_before);
        assert!(perm.private_rules().blocked.is_empty());
    }

    #[test]
    fn test_whitelist_admits_single_user() {
        let mut perm = FilePermission::new();
        perm.block_all_users();
        perm.allow_user("Sam");

        assert!(perm.test_user(&user("Sam")));
        assert!(!perm.test_user(&user("Tom")));
    }

    #[test]
    fn test_allow_user_ignored_in_blacklist_mode() {
        let mut perm = FilePermission::new();
        perm.allow_user("Sam");
        assert_eq!(perm, FilePermission::new());
    }

    #[test]
    fn test_allow_all_clears_blocked() {
        let mut perm = FilePermission::new();
        perm.block_user("Sam");
        perm.allow_all_users();
        assert!(perm.test_user(&user("Sam")));
    }

    #[test]
    fn test_block_all_clears_allowed() {
        let mut perm = FilePermission::new();
        perm.block_all_users();
        perm.allow_user("Sam");
        perm.block_all_users();
        assert!(!perm.test_user(&user("Sam")));
    }

    #[test]
    fn test_allow_public_does_not_register_code() {
        let mut perm = FilePermission::new();
        perm.allow_public("secret");
        assert!(perm.is_public());
        assert!(!perm.test_code("secret"));

        perm.allow_code("secret");
        assert!(perm.test_code("secret"));
        assert!(!perm.test_code("other"));
    }

    #[test]
    fn test_allow_public_resets_codes() {
        let mut perm = FilePermission::new();
        perm.allow_public("");
        perm.allow_code("a");
        perm.allow_public("");
        assert!(!perm.test_code("a"));
    }

    #[test]
    fn test_block_code() {
        let mut perm = FilePermission::new();
        perm.allow_public("");
        perm.allow_code("a");
        perm.allow_code("b");
        perm.block_code("a");
        assert!(!perm.test_code("a"));
        assert!(perm.test_code("b"));
    }

    #[test]
    fn test_codes_ignored_while_private() {
        let mut perm = FilePermission::new();
        perm.allow_code("a");
        perm.block_code("a");
        assert_eq!(perm, FilePermission::new());
        assert!(!perm.test_code("a"));
    }

    #[test]
    fn test_public_admits_every_identity() {
        let mut perm = FilePermission::new();
        perm.block_all_users();
        perm.allow_public("");
        assert!(perm.test_user(&user("Sam")));
        assert!(perm.test_user(&user("Tom")));
    }

    #[test]
    fn test_private_mutations_ignored_while_public() {
        let mut perm = FilePermission::new();
        perm.allow_public("");
        let before = perm.clone();

        perm.block_user("Sam");
        perm.allow_user("Sam");
        perm.block_all_users();
        perm.allow_all_users();

        assert_eq!(perm, before);
    }

    #[test]
    fn test_block_public_restores_private_state() {
        let mut perm = FilePermission::new();
        perm.block_all_users();
        perm.allow_user("Sam");
        let private_before = perm.clone();

        perm.allow_public("x");
        perm.allow_code("x");
        perm.block_user("Sam");
        perm.block_public();

        assert_eq!(perm, private_before);
        assert!(perm.test_user(&user("Sam")));
        assert!(!perm.test_user(&user("Tom")));
        assert!(!perm.test_code("x"));
    }

    #[test]
    fn test_private_sets_stay_disjoint() {
        let mut perm = FilePermission::new();
        perm.block_user("Sam");
        perm.block_all_users();
        perm.allow_user("Sam");

        let rules = perm.private_rules();
        assert!(rules.allowed.contains("Sam"));
        assert!(!rules.blocked.contains("Sam"));
    }

    #[test]
    fn test_meta_rules_have_no_effect() {
        let mut perm = FilePermission::new();
        perm.allow_user_meta("group", "staff");
        perm.block_user_meta("group", "guests");
        assert_eq!(perm, FilePermission::new());
    }

    // (is_public, is_blocked, in_allowed, in_blocked) -> test_user
    #[rstest]
    #[case(false, false, false, false, true)]
    #[case(false, false, false, true, false)]
    #[case(false, true, false, false, false)]
    #[case(false, true, true, false, true)]
    #[case(true, false, false, true, true)]
    #[case(true, true, false, false, true)]
    #[case(true, true, true, false, true)]
    #[case(true, false, false, false, true)]
    fn test_user_truth_table(
        #[case] public: bool,
        #[case] whitelist: bool,
        #[case] in_allowed: bool,
        #[case] in_blocked: bool,
        #[case] expected: bool,
    ) {
        let mut perm = FilePermission::new();
        if whitelist {
            perm.block_all_users();
            if in_allowed {
                perm.allow_user("Sam");
            }
        } else if in_blocked {
            perm.block_user("Sam");
        }
        if public {
            perm.allow_public("");
        }
        assert_eq!(perm.test_user(&user("Sam")), expected);
    }

    #[rstest]
    #[case(r#"{"op":"allow_user","name":"Sam"}"#, PermissionChange::AllowUser { name: "Sam".into() })]
    #[case(r#"{"op":"block_all_users"}"#, PermissionChange::BlockAllUsers)]
    #[case(r#"{"op":"allow_public"}"#, PermissionChange::AllowPublic { code: String::new() })]
    #[case(r#"{"op":"block_code","code":"c"}"#, PermissionChange::BlockCode { code: "c".into() })]
    fn test_change_wire_format(#[case] json: &str, #[case] expected: PermissionChange) {
        let parsed: PermissionChange = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_apply_sequence() {
        let mut perm = FilePermission::new();
        for change in [
            PermissionChange::BlockAllUsers,
            PermissionChange::AllowUser { name: "Sam".into() },
        ] {
            change.apply(&mut perm);
        }
        assert!(perm.test_name("Sam"));
        assert!(!perm.test_name("Tom"));
    }

    #[test]
    fn test_shared_apply_all_is_atomic_batch() {
        let shared = SharedPermission::default();
        shared.apply_all(&[
            PermissionChange::AllowPublic { code: String::new() },
            PermissionChange::AllowCode { code: "c".into() },
        ]);
        assert!(shared.test_code("c"));
        assert!(shared.snapshot().is_public());
    }

    #[test]
    fn test_shared_concurrent_readers_never_see_partial_grant() {
        let shared = Arc::new(SharedPermission::default());
        shared.block_user("Sam");

        let writer = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    shared.update(|p| {
                        p.block_all_users();
                        p.allow_user("Tom");
                    });
                    shared.update(|p| {
                        p.allow_all_users();
                        p.block_user("Sam");
                    });
                }
            })
        };

        for _ in 0..1000 {
            let snap = shared.snapshot();
            // Both steady states admit Tom and refuse Sam
            assert!(snap.test_name("Tom"));
            assert!(!snap.test_name("Sam"));
        }
        writer.join().unwrap();
    }

    proptest! {
        #[test]
        fn prop_default_admits_any_name(name in ".*") {
            prop_assert!(FilePermission::new().test_name(&name));
        }

        #[test]
        fn prop_test_code_false_while_private(code in ".*", names in proptest::collection::vec("[a-z]{1,8}", 0..8)) {
            let mut perm = FilePermission::new();
            for name in &names {
                perm.block_user(name);
            }
            perm.allow_code(&code);
            prop_assert!(!perm.test_code(&code));
        }
    }
}
