use crate::error::ErrorKind;
use crate::model::connection::ConnectionHandle;
use crate::model::room::RoomId;
use crate::model::session_description::SessionDescription;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Peer-to-peer payloads. The relay routes on the envelope and never opens
/// these.
///
/// `seq` numbers the offerer's offers. An answer echoes the `seq` of the
/// offer it answers, so an answer to an abandoned offer can be told apart
/// from the answer to the current one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d")]
pub enum PeerSignal {
    CallOffer {
        offer: SessionDescription,
        seq: u64,
    },
    CallAnswer {
        answer: SessionDescription,
        seq: u64,
    },
    NegotiationOffer {
        offer: SessionDescription,
        seq: u64,
    },
    NegotiationAnswer {
        answer: SessionDescription,
        seq: u64,
    },
    /// Informational only, does not trigger renegotiation by itself.
    ScreenShareStart,
}

impl PeerSignal {
    pub fn name(&self) -> &'static str {
        match self {
            PeerSignal::CallOffer { .. } => "CallOffer",
            PeerSignal::CallAnswer { .. } => "CallAnswer",
            PeerSignal::NegotiationOffer { .. } => "NegotiationOffer",
            PeerSignal::NegotiationAnswer { .. } => "NegotiationAnswer",
            PeerSignal::ScreenShareStart => "ScreenShareStart",
        }
    }

    /// The offer sequence number carried by offers and answers.
    pub fn seq(&self) -> Option<u64> {
        match self {
            PeerSignal::CallOffer { seq, .. }
            | PeerSignal::CallAnswer { seq, .. }
            | PeerSignal::NegotiationOffer { seq, .. }
            | PeerSignal::NegotiationAnswer { seq, .. } => Some(*seq),
            PeerSignal::ScreenShareStart => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeerInfo {
    pub connection: ConnectionHandle,
    pub display_identity: String,
}

/// Client → relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d")]
pub enum ClientMessage {
    Join {
        room: RoomId,
        display_identity: String,
    },
    Leave,
    Signal {
        to: ConnectionHandle,
        signal: PeerSignal,
    },
}

/// Relay → client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d")]
pub enum ServerMessage {
    Welcome {
        connection: ConnectionHandle,
        ice_servers: Vec<IceServerConfig>,
    },
    Joined {
        room: RoomId,
        connection: ConnectionHandle,
        peers: Vec<PeerInfo>,
    },
    PeerJoined {
        display_identity: String,
        connection: ConnectionHandle,
    },
    PeerLeft {
        connection: ConnectionHandle,
    },
    Signal {
        from: ConnectionHandle,
        signal: PeerSignal,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}
