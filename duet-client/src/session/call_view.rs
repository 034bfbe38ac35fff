use crate::media::MediaStream;
use crate::transport::{RemoteStream, RemoteTrack};
use duet_core::{ConnectionHandle, ErrorKind, PeerInfo, RoomId};

/// What the UI renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallView {
    /// A remote peer is known.
    pub connected: bool,
    pub local_stream: Option<MediaStream>,
    pub remote_stream: Option<RemoteStream>,
    pub screen_sharing: bool,
}

impl CallView {
    pub(crate) fn add_remote_track(&mut self, track: RemoteTrack) {
        match &mut self.remote_stream {
            Some(stream) if stream.id == track.stream_id => {
                if !stream.tracks.iter().any(|t| t.id == track.id) {
                    stream.tracks.push(track);
                }
            }
            _ => self.remote_stream = Some(RemoteStream::from_track(track)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Capture the camera and offer a call to the known peer.
    Call,
    /// Attach the local stream to the transport.
    SendStreams,
    /// Swap camera for screen or back.
    ToggleScreenShare,
    Hangup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Joined {
        room: RoomId,
        peers: Vec<PeerInfo>,
    },
    PeerJoined {
        display_identity: String,
        connection: ConnectionHandle,
    },
    PeerLeft {
        connection: ConnectionHandle,
    },
    ScreenShareStarted {
        from: ConnectionHandle,
    },
    RelayError {
        kind: ErrorKind,
        message: String,
    },
    NegotiationFailed(String),
    MediaFailed(String),
}
