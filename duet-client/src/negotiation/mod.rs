mod negotiation_engine;
mod negotiation_state;

pub use negotiation_engine::*;
pub use negotiation_state::*;
