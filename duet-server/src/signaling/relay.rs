use crate::room::RoomDirectory;
use crate::signaling::SignalingOutput;
use duet_core::{ConnectionHandle, PeerInfo, PeerSignal, RelayError, RoomId, ServerMessage};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Forwards signals between the two occupants of a room.
///
/// Holds no state of its own beyond the [`RoomDirectory`]; payloads are
/// passed through untouched.
#[derive(Clone)]
pub struct Relay {
    directory: RoomDirectory,
    output: Arc<dyn SignalingOutput>,
    notify_peer_left: bool,
}

impl Relay {
    pub fn new(directory: RoomDirectory, output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            directory,
            output,
            notify_peer_left: true,
        }
    }

    /// Whether the remaining member gets a `PeerLeft` when the other one goes.
    pub fn with_peer_left_notifications(mut self, enabled: bool) -> Self {
        self.notify_peer_left = enabled;
        self
    }

    pub fn directory(&self) -> &RoomDirectory {
        &self.directory
    }

    pub fn connect(&self, connection: ConnectionHandle) {
        if !self.directory.registry().register(connection) {
            warn!("Connection {} registered twice", connection);
        }
    }

    /// Join `room`, acknowledge to the joiner and announce the joiner to
    /// whoever is already inside.
    pub async fn join(
        &self,
        connection: ConnectionHandle,
        room: RoomId,
        display_identity: String,
    ) -> Result<Vec<PeerInfo>, RelayError> {
        let peers = self
            .directory
            .join(connection, room.clone(), display_identity.clone())?;

        self.output
            .send(
                connection,
                ServerMessage::Joined {
                    room,
                    connection,
                    peers: peers.clone(),
                },
            )
            .await;

        for peer in &peers {
            self.output
                .send(
                    peer.connection,
                    ServerMessage::PeerJoined {
                        display_identity: display_identity.clone(),
                        connection,
                    },
                )
                .await;
        }

        Ok(peers)
    }

    pub async fn relay(
        &self,
        sender: ConnectionHandle,
        target: ConnectionHandle,
        signal: PeerSignal,
    ) -> Result<(), RelayError> {
        if sender == target || !self.directory.shares_room(&sender, &target) {
            return Err(RelayError::NotInSameRoom { sender, target });
        }

        debug!("Relaying {} from {} to {}", signal.name(), sender, target);
        self.output
            .send(
                target,
                ServerMessage::Signal {
                    from: sender,
                    signal,
                },
            )
            .await;
        Ok(())
    }

    pub async fn leave(&self, connection: ConnectionHandle) -> Result<(), RelayError> {
        let departure = self
            .directory
            .leave(&connection)
            .ok_or(RelayError::NotInRoom(connection))?;

        if self.notify_peer_left {
            for remaining in departure.remaining {
                self.output
                    .send(remaining, ServerMessage::PeerLeft { connection })
                    .await;
            }
        }
        Ok(())
    }

    /// Drop every trace of `connection`. Any negotiation it had in flight is
    /// abandoned.
    pub async fn disconnect(&self, connection: ConnectionHandle) {
        match self.leave(connection).await {
            Ok(()) | Err(RelayError::NotInRoom(_)) => {}
            Err(e) => warn!("Leave on disconnect failed for {}: {}", connection, e),
        }
        self.directory.registry().unregister(&connection);
        info!("Connection {} unregistered", connection);
    }
}
