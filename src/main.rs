//! relay-hub server binary - loads configuration, starts the hub, and serves
//! the WebSocket relay.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relay_hub::adapters::{app_router, build_policy, OriginPolicy, WebSocketState};
use relay_hub::application::{Hub, RelayContext};
use relay_hub::config::{AppConfig, RoutingMode};

/// WebSocket relay server.
///
/// Flags override values loaded from `RELAY_HUB__*` environment variables.
#[derive(Parser, Debug)]
#[command(name = "relay-hub", version, about)]
struct Cli {
    /// Listen address, e.g. `:8080` or `127.0.0.1:8080`.
    #[arg(long)]
    addr: Option<String>,

    /// Directory of static client files.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Routing policy for inbound messages.
    #[arg(long, value_enum)]
    mode: Option<RoutingMode>,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) -> Result<()> {
        if let Some(addr) = self.addr {
            config
                .server
                .set_addr(&addr)
                .with_context(|| format!("invalid --addr {addr}"))?;
        }
        if let Some(dir) = self.static_dir {
            config.server.static_dir = dir;
        }
        if let Some(mode) = self.mode {
            config.relay.mode = mode;
        }
        Ok(())
    }
}

fn init_tracing(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    if config.is_production() {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(true))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .with(filter)
            .init();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("failed to load configuration")?;
    cli.apply(&mut config)?;
    let config = config.validated().context("invalid configuration")?;

    init_tracing(&config)?;

    let hub = Hub::spawn(config.relay.hub_request_capacity);
    let policy = build_policy(config.relay.mode, hub.clone());
    let relay = RelayContext::new(
        hub,
        policy,
        config.relay.heartbeat(),
        config.relay.queue_capacity,
    );

    let origins = match config.server.allowed_origins_list() {
        list if list.is_empty() => OriginPolicy::permissive(),
        list => OriginPolicy::allow_list(list),
    };
    if origins.is_permissive() {
        tracing::warn!("accepting websocket connections from any origin");
    }

    let app = app_router(WebSocketState::new(relay, origins), &config.server.static_dir);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        addr = %addr,
        mode = %config.relay.mode,
        static_dir = %config.server.static_dir.display(),
        "relay hub listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    Ok(())
}
