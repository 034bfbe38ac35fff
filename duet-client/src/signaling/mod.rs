mod signal_sink;
mod signaling_client;

pub use signal_sink::*;
pub use signaling_client::*;
