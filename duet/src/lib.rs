pub use duet_core::{ConnectionHandle, RoomId};

pub mod model {
    pub use duet_core::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use duet_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use duet_client::*;
}
