use async_trait::async_trait;
use duet_core::{ConnectionHandle, ServerMessage};

/// Delivery side of the relay: whatever owns the client sockets implements
/// this so the relay can push messages to a connection.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Queue `msg` for `to`. Delivery is at-most-once; unknown connections
    /// are dropped by the implementation.
    async fn send(&self, to: ConnectionHandle, msg: ServerMessage);
}
