use crate::model::{ConnectionHandle, RoomId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error category reported to clients in `ServerMessage::Error`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RoomFull,
    NotInSameRoom,
    NotInRoom,
    AlreadyInRoom,
    UnknownConnection,
    InvalidMessage,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("room '{0}' is full")]
    RoomFull(RoomId),

    #[error("{sender} and {target} do not share a room")]
    NotInSameRoom {
        sender: ConnectionHandle,
        target: ConnectionHandle,
    },

    #[error("connection {0} is not in a room")]
    NotInRoom(ConnectionHandle),

    #[error("connection is already in room '{0}'")]
    AlreadyInRoom(RoomId),

    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionHandle),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::RoomFull(_) => ErrorKind::RoomFull,
            RelayError::NotInSameRoom { .. } => ErrorKind::NotInSameRoom,
            RelayError::NotInRoom(_) => ErrorKind::NotInRoom,
            RelayError::AlreadyInRoom(_) => ErrorKind::AlreadyInRoom,
            RelayError::UnknownConnection(_) => ErrorKind::UnknownConnection,
        }
    }
}
