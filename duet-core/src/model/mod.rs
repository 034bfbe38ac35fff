mod connection;
mod room;
mod session_description;
mod signaling;

pub use connection::{ConnectionHandle, InvalidHandle};
pub use room::RoomId;
pub use session_description::{SdpKind, SessionDescription};
pub use signaling::{ClientMessage, IceServerConfig, PeerInfo, PeerSignal, ServerMessage};
