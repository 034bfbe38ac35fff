use crate::registry::ConnectionRegistry;
use crate::room::Room;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use duet_core::utils::ROOM_CAPACITY;
use duet_core::{ConnectionHandle, PeerInfo, RelayError, RoomId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of removing a connection from its room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub room: RoomId,
    pub remaining: Vec<ConnectionHandle>,
}

/// Room id → members.
///
/// Every membership change goes through the room's map entry, which holds the
/// shard write lock for the duration of the check-and-insert. Two concurrent
/// joins of the same room are therefore serialized and can never produce a
/// third member. Lock order is always rooms → registry.
#[derive(Clone)]
pub struct RoomDirectory {
    rooms: Arc<DashMap<RoomId, Room>>,
    registry: ConnectionRegistry,
    capacity: usize,
}

impl RoomDirectory {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            registry,
            capacity: ROOM_CAPACITY,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Add `handle` to `room_id`, creating the room on first join.
    ///
    /// Returns the members that were already there.
    pub fn join(
        &self,
        handle: ConnectionHandle,
        room_id: RoomId,
        display_identity: String,
    ) -> Result<Vec<PeerInfo>, RelayError> {
        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut entry) => {
                let room = entry.get_mut();
                if room.is_full() {
                    warn!("Connection {} rejected: room '{}' is full", handle, room_id);
                    return Err(RelayError::RoomFull(room_id));
                }

                self.registry
                    .assign(handle, room_id.clone(), display_identity)?;
                let peers = self.describe(room.members());
                room.insert(handle)?;

                info!("Connection {} joined room '{}'", handle, room_id);
                Ok(peers)
            }
            Entry::Vacant(entry) => {
                self.registry
                    .assign(handle, room_id.clone(), display_identity)?;
                let mut room = Room::new(room_id.clone(), self.capacity);
                room.insert(handle)?;
                entry.insert(room);

                info!("Connection {} created room '{}'", handle, room_id);
                Ok(Vec::new())
            }
        }
    }

    /// Remove `handle` from whatever room it is in. The room is destroyed
    /// once its last member is gone.
    pub fn leave(&self, handle: &ConnectionHandle) -> Option<Departure> {
        let room_id = self.registry.take_room(handle)?;

        let Entry::Occupied(mut entry) = self.rooms.entry(room_id.clone()) else {
            warn!(
                "Connection {} claimed room '{}' which no longer exists",
                handle, room_id
            );
            return None;
        };

        entry.get_mut().remove(handle);
        let remaining = entry.get().members().to_vec();

        if remaining.is_empty() {
            entry.remove();
            debug!("Room '{}' is empty, destroyed", room_id);
        }

        info!("Connection {} left room '{}'", handle, room_id);
        Some(Departure {
            room: room_id,
            remaining,
        })
    }

    /// True iff both connections are members of the same room right now.
    pub fn shares_room(&self, a: &ConnectionHandle, b: &ConnectionHandle) -> bool {
        let Some(room_id) = self.registry.room_of(a) else {
            return false;
        };
        self.rooms
            .get(&room_id)
            .is_some_and(|room| room.contains(a) && room.contains(b))
    }

    pub fn members(&self, room_id: &RoomId) -> Vec<ConnectionHandle> {
        self.rooms
            .get(room_id)
            .map(|room| room.members().to_vec())
            .unwrap_or_default()
    }

    /// Everyone in `handle`'s room except `handle`.
    pub fn others(&self, handle: &ConnectionHandle) -> Vec<ConnectionHandle> {
        let Some(room_id) = self.registry.room_of(handle) else {
            return Vec::new();
        };
        self.members(&room_id)
            .into_iter()
            .filter(|m| m != handle)
            .collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn describe(&self, members: &[ConnectionHandle]) -> Vec<PeerInfo> {
        members
            .iter()
            .map(|&connection| PeerInfo {
                connection,
                display_identity: self
                    .registry
                    .display_identity(&connection)
                    .unwrap_or_default(),
            })
            .collect()
    }
}
