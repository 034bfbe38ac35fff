use duet_core::{ConnectionHandle, RelayError, RoomId};

/// Members of one room, in join order.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    members: Vec<ConnectionHandle>,
    capacity: usize,
}

impl Room {
    pub fn new(id: RoomId, capacity: usize) -> Self {
        Self {
            id,
            members: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn members(&self) -> &[ConnectionHandle] {
        &self.members
    }

    pub fn contains(&self, handle: &ConnectionHandle) -> bool {
        self.members.contains(handle)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn insert(&mut self, handle: ConnectionHandle) -> Result<(), RelayError> {
        if self.is_full() {
            return Err(RelayError::RoomFull(self.id.clone()));
        }
        if !self.contains(&handle) {
            self.members.push(handle);
        }
        Ok(())
    }

    pub(crate) fn remove(&mut self, handle: &ConnectionHandle) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != handle);
        before != self.members.len()
    }
}
