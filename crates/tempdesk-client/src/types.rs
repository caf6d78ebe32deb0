//! Request and response types

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of a stored file, returned after writes and renames
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub owner: String,
    pub size: u64,
}

/// A downloaded file
#[derive(Clone, Debug)]
pub struct FileObject {
    pub data: Bytes,
    pub owner: String,
    /// Metadata sent as `x-desk-meta-*` headers
    pub meta: BTreeMap<String, String>,
}

#[derive(Serialize)]
pub(crate) struct SignUpRequest<'a> {
    pub name: &'a str,
    pub password: &'a str,
    pub meta: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
pub(crate) struct UpdateUserRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<&'a BTreeMap<String, String>>,
}
