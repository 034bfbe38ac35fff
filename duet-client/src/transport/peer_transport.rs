use crate::error::TransportError;
use crate::media::MediaTrack;
use async_trait::async_trait;
use duet_core::SessionDescription;

/// The media connection to the remote peer.
///
/// Implementations report negotiation-needed, inbound tracks and connection
/// state on the [`TransportEvent`](crate::TransportEvent) channel they were
/// created with.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError>;

    async fn create_answer(&self) -> Result<SessionDescription, TransportError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), TransportError>;

    async fn set_remote_description(&self, desc: SessionDescription)
    -> Result<(), TransportError>;

    /// Discard whichever description is pending and return to the last
    /// stable one. A no-op when nothing is pending.
    async fn rollback(&self) -> Result<(), TransportError>;

    async fn add_track(&self, track: &MediaTrack) -> Result<(), TransportError>;

    async fn remove_track(&self, track_id: &str) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}
