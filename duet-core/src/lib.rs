pub mod error;
pub mod model;
pub mod utils;

pub use error::{ErrorKind, RelayError};
pub use model::*;
