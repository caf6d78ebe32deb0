//! tempdesk gateway - signed-request file sharing desk

use clap::Parser;
use tempdesk_gateway::{run_server_with_shutdown, GatewayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tempdesk")]
#[command(about = "File sharing desk with HMAC-signed requests")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "TEMPDESK_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "9000", env = "TEMPDESK_PORT")]
    port: u16,

    /// Accepted clock skew for signed requests, in seconds
    #[arg(long, default_value = "600", env = "TEMPDESK_AUTH_WINDOW_SECS")]
    auth_window_secs: u64,

    /// Maximum request body size in bytes
    #[arg(long, default_value = "67108864", env = "TEMPDESK_MAX_BODY_SIZE")]
    max_body_size: usize,

    /// Enable debug logging
    #[arg(short, long, env = "TEMPDESK_DEBUG")]
    debug: bool,

    /// Disable CORS
    #[arg(long, env = "TEMPDESK_NO_CORS")]
    no_cors: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tempdesk_gateway={},tower_http=debug", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting tempdesk gateway on {}:{}", args.host, args.port);

    if args.auth_window_secs == 0 {
        tracing::warn!("Replay window is zero - only requests dated this second will pass");
    }

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        auth_window_secs: args.auth_window_secs,
        max_body_size: args.max_body_size,
        cors_enabled: !args.no_cors,
        ..Default::default()
    };

    run_server_with_shutdown(config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
    })
    .await
}
