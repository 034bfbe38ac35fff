use crate::media::BindingKind;
use crate::negotiation::NegotiationState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("webrtc: {0}")]
    WebRtc(#[from] webrtc::Error),

    #[error("no local track with id '{0}'")]
    UnknownTrack(String),

    #[error("transport rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("failed to apply session description: {0}")]
    DescriptionApplyFailure(#[source] TransportError),

    #[error("answer received while {0:?}")]
    UnexpectedAnswer(NegotiationState),

    #[error("{signal} carried a session description of the wrong type")]
    UnexpectedDescription { signal: &'static str },

    #[error("no remote peer to negotiate with")]
    NoRemotePeer,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("could not acquire {kind:?} media: {reason}")]
    AcquisitionFailure { kind: BindingKind, reason: String },

    #[error("stream '{active}' is already attached, refusing to attach '{requested}'")]
    BindingConflict { active: String, requested: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("signaling connection closed")]
    Closed,
}
