//! lux-server - Styling session service
//!
//! Serves the upload → session → chat flow: accepts photo and voice
//! uploads, stores per-owner preferences, and exposes the transcript and
//! status documents the chat view polls (or subscribes to over SSE).

use anyhow::Result;
use clap::Parser;
use lux_common::config::{resolve_data_root, ServerConfig};
use lux_server::responder::{CannedResponder, MessageBackend, MessageRelay};
use lux_server::store::gc::spawn_guest_sweeper;
use lux_server::store::SessionStore;
use lux_server::{build_router, AppState};
use std::time::Duration;
use tracing::info;

/// Environment variable naming the data root
const DATA_ROOT_ENV: &str = "LUX_DATA_ROOT";

#[derive(Debug, Parser)]
#[command(name = "lux-server", about = "Lux styling session service")]
struct Args {
    /// Data root holding the per-owner session directories
    #[arg(long)]
    data_root: Option<String>,

    /// Bind address, overriding the config file
    #[arg(long)]
    bind: Option<String>,

    /// External message backend URL; canned-responder mode when unset
    #[arg(long, env = "LUX_RELAY_URL")]
    relay_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Lux styling session service (lux-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let mut config = ServerConfig::load();
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.relay_url.is_some() {
        config.relay_url = args.relay_url;
    }

    let data_root = resolve_data_root(args.data_root.as_deref(), DATA_ROOT_ENV);
    info!("Data root: {}", data_root.display());

    let store = SessionStore::open(&data_root)?;

    let backend = match &config.relay_url {
        Some(url) => MessageBackend::Relay(MessageRelay::new(
            url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?),
        None => {
            info!("No relay configured, using canned responder");
            MessageBackend::Canned(CannedResponder::default())
        }
    };

    let state = AppState::new(store, backend);

    // Reclaim abandoned guest sessions in the background
    let _sweeper = spawn_guest_sweeper(
        state.store.clone(),
        Duration::from_secs(config.guest_ttl_secs),
        Duration::from_secs(config.sweep_interval_secs),
    );

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("lux-server listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
