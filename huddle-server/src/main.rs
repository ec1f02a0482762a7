use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use huddle_server::{AppState, ServerConfig, SignalingRelay, SignalingService, ws_handler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env()?;

    let signaling = SignalingService::new();
    let (relay_tx, relay_rx) = mpsc::channel(256);

    let relay = SignalingRelay::new(relay_rx, Arc::new(signaling.clone()));
    tokio::spawn(relay.run());

    let state = Arc::new(AppState {
        signaling,
        relay_tx,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state);

    info!("Signaling server listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
