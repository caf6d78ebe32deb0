//! Signed session against an in-process gateway
//!
//! This demo:
//! - Starts a gateway on a random local port
//! - Signs up two users and uploads a file
//! - Whitelists one user, then publishes the file behind an access code
//!
//! Run with: cargo run --example signed_session

use std::collections::BTreeMap;
use std::sync::Arc;
use tempdesk::client::{Config, DeskClient};
use tempdesk::core::PermissionChange;
use tempdesk::gateway::{serve, AppState, GatewayConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let endpoint = format!("http://{}", listener.local_addr()?);
    let state = Arc::new(AppState::new(GatewayConfig::default()));
    tokio::spawn(serve(listener, state, std::future::pending::<()>()));

    println!("tempdesk - signed session demo ({})\n", endpoint);

    let sam = DeskClient::new(Config::new(&endpoint).with_credentials("Sam", "sam-secret"))?;
    let tom = DeskClient::new(Config::new(&endpoint).with_credentials("Tom", "tom-secret"))?;
    let ann = DeskClient::new(Config::new(&endpoint).with_credentials("Ann", "ann-secret"))?;
    let anonymous = DeskClient::with_endpoint(&endpoint)?;

    // ==================== Users ====================

    let mut meta = BTreeMap::new();
    meta.insert("team".to_string(), "ops".to_string());
    sam.sign_up("Sam", "sam-secret", &meta).await?;
    tom.sign_up("Tom", "tom-secret", &BTreeMap::new()).await?;
    ann.sign_up("Ann", "ann-secret", &BTreeMap::new()).await?;

    let me = sam.whoami().await?;
    println!("Signed in as {} {:?}", me.name, me.meta);

    // ==================== Files ====================

    let mut file_meta = BTreeMap::new();
    file_meta.insert("topic".to_string(), "rota".to_string());
    let info = sam.put_file("ops/rota.txt", "mon: sam\ntue: tom\n", &file_meta).await?;
    println!("Uploaded {} ({} bytes, owner {})", info.path, info.size, info.owner);

    // ==================== Permissions ====================

    sam.change_permission(
        "ops/rota.txt",
        &[
            PermissionChange::BlockAllUsers,
            PermissionChange::AllowUser { name: "Tom".into() },
        ],
    )
    .await?;

    let file = tom.get_file("ops/rota.txt").await?;
    println!("Tom reads {} bytes (topic: {:?})", file.data.len(), file.meta.get("topic"));

    match ann.get_file("ops/rota.txt").await {
        Err(e) if e.is_access_denied() => println!("Ann is refused: {}", e),
        Err(e) => return Err(e.into()),
        Ok(_) => println!("Ann unexpectedly read the file"),
    }

    let permission = sam
        .change_permission(
            "ops/rota.txt",
            &[
                PermissionChange::AllowPublic { code: String::new() },
                PermissionChange::AllowCode { code: "7421".into() },
            ],
        )
        .await?;
    println!("Public with codes {:?}", permission.codes());

    let file = anonymous.get_file_with_code("ops/rota.txt", "7421").await?;
    println!("Anonymous reader with a code gets:\n{}", String::from_utf8_lossy(&file.data));

    Ok(())
}
