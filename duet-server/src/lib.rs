mod config;
mod registry;
mod room;
mod signaling;

pub use config::*;
pub use registry::*;
pub use room::*;
pub use signaling::*;

use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state handed to every WebSocket connection.
pub struct AppState {
    pub signaling: SignalingService,
    pub relay: Relay,
}

impl AppState {
    pub fn new(config: &RelayConfig) -> Arc<Self> {
        let signaling = SignalingService::new(config.ice_servers.clone());
        let directory = RoomDirectory::new(ConnectionRegistry::new());
        let relay = Relay::new(directory, Arc::new(signaling.clone()))
            .with_peer_left_notifications(config.notify_peer_left);

        Arc::new(Self { signaling, relay })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the relay on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, config: &RelayConfig) -> anyhow::Result<()> {
    let state = AppState::new(config);
    info!("Signaling relay listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
