use async_trait::async_trait;
use duet_core::ClientMessage;

/// Where the client pushes messages bound for the relay.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn send(&self, message: ClientMessage);
}
