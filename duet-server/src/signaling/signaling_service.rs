use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use duet_core::{ConnectionHandle, IceServerConfig, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

struct SignalingInner {
    peers: DashMap<ConnectionHandle, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Owns the outbound half of every client WebSocket.
///
/// Each connection gets one unbounded queue drained by its own send task, so
/// messages to the same connection go out in the order they were queued.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
            }),
        }
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_peer(&self, connection: ConnectionHandle, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(connection, tx);
    }

    pub fn remove_peer(&self, connection: &ConnectionHandle) {
        self.inner.peers.remove(connection);
    }

    pub fn is_connected(&self, connection: &ConnectionHandle) -> bool {
        self.inner.peers.contains_key(connection)
    }

    pub fn send_signal(&self, connection: ConnectionHandle, msg: &ServerMessage) {
        let Some(peer) = self.inner.peers.get(&connection) else {
            warn!(
                "Attempted to send signal to disconnected connection {}",
                connection
            );
            return;
        };

        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to send WS message to {}: {:?}", connection, e);
                }
            }
            Err(e) => error!("Failed to serialize signal message: {}", e),
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send(&self, to: ConnectionHandle, msg: ServerMessage) {
        self.send_signal(to, &msg);
    }
}
