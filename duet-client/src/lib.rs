mod config;
mod error;
mod media;
mod negotiation;
mod session;
mod signaling;
mod tracks;
mod transport;

pub use config::*;
pub use error::*;
pub use media::*;
pub use negotiation::*;
pub use session::*;
pub use signaling::*;
pub use tracks::*;
pub use transport::*;
