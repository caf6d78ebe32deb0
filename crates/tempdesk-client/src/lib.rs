//! # tempdesk Client SDK
//!
//! Signs requests with a user's shared key and talks to the tempdesk
//! gateway's JSON API.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::collections::BTreeMap;
//! use tempdesk_client::{Config, DeskClient};
//! use tempdesk_core::PermissionChange;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DeskClient::new(
//!         Config::new("http://localhost:9000").with_credentials("Sam", "password"),
//!     )?;
//!
//!     client.sign_up("Sam", "password", &BTreeMap::new()).await?;
//!     client.put_file("notes.txt", "Hello, World!", &BTreeMap::new()).await?;
//!
//!     // Whitelist Tom only
//!     client
//!         .change_permission(
//!             "notes.txt",
//!             &[
//!                 PermissionChange::BlockAllUsers,
//!                 PermissionChange::AllowUser { name: "Tom".into() },
//!             ],
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::{sign_request, DeskClient};
pub use config::{Config, Credentials};
pub use error::{ClientError, Result};
pub use types::{FileInfo, FileObject};
