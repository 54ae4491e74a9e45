//! GrooveBoard relay server entry point.

use anyhow::Context;
use clap::Parser;
use grooveboard_server::{AppState, DEFAULT_CHANNEL_CAPACITY, RelayConfig, router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// WebSocket relay for GrooveBoard drawing sessions.
#[derive(Debug, Parser)]
#[command(name = "grooveboard-server", version)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:3030", env = "GROOVEBOARD_BIND")]
    bind: SocketAddr,

    /// Messages buffered per room before slow clients start missing updates.
    #[arg(long, default_value_t = DEFAULT_CHANNEL_CAPACITY, env = "GROOVEBOARD_CHANNEL_CAPACITY")]
    channel_capacity: usize,
}

impl From<Args> for RelayConfig {
    fn from(args: Args) -> Self {
        Self {
            bind: args.bind,
            channel_capacity: args.channel_capacity,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grooveboard_server=info,tower_http=info".into()),
        )
        .init();

    let config = RelayConfig::from(Args::parse());
    let state = Arc::new(AppState::new(config.channel_capacity));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("GrooveBoard relay server listening on {}", config.bind);
    info!("WebSocket endpoint: ws://{}/ws", config.bind);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
