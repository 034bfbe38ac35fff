use dashmap::DashMap;
use duet_core::{ConnectionHandle, RelayError, RoomId};
use std::sync::Arc;

/// Metadata of one connected participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub handle: ConnectionHandle,
    pub display_identity: Option<String>,
    pub room: Option<RoomId>,
}

impl Participant {
    fn new(handle: ConnectionHandle) -> Self {
        Self {
            handle,
            display_identity: None,
            room: None,
        }
    }
}

/// Handle → participant map. No I/O; every mutation is a single map
/// operation so it can be shared freely between connection tasks.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    participants: Arc<DashMap<ConnectionHandle, Participant>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the handle was already registered.
    pub fn register(&self, handle: ConnectionHandle) -> bool {
        if self.participants.contains_key(&handle) {
            return false;
        }
        self.participants.insert(handle, Participant::new(handle));
        true
    }

    pub fn unregister(&self, handle: &ConnectionHandle) -> Option<Participant> {
        self.participants.remove(handle).map(|(_, p)| p)
    }

    pub fn get(&self, handle: &ConnectionHandle) -> Option<Participant> {
        self.participants.get(handle).map(|p| p.clone())
    }

    pub fn contains(&self, handle: &ConnectionHandle) -> bool {
        self.participants.contains_key(handle)
    }

    pub fn room_of(&self, handle: &ConnectionHandle) -> Option<RoomId> {
        self.participants.get(handle).and_then(|p| p.room.clone())
    }

    pub fn display_identity(&self, handle: &ConnectionHandle) -> Option<String> {
        self.participants
            .get(handle)
            .and_then(|p| p.display_identity.clone())
    }

    /// Record room membership. A participant holds at most one room at a
    /// time; the room id has to be cleared with [`Self::take_room`] first.
    pub(crate) fn assign(
        &self,
        handle: ConnectionHandle,
        room: RoomId,
        display_identity: String,
    ) -> Result<(), RelayError> {
        let mut participant = self
            .participants
            .get_mut(&handle)
            .ok_or(RelayError::UnknownConnection(handle))?;

        if let Some(current) = &participant.room {
            return Err(RelayError::AlreadyInRoom(current.clone()));
        }

        participant.room = Some(room);
        participant.display_identity = Some(display_identity);
        Ok(())
    }

    pub(crate) fn take_room(&self, handle: &ConnectionHandle) -> Option<RoomId> {
        self.participants
            .get_mut(handle)
            .and_then(|mut p| p.room.take())
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
