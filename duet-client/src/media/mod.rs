mod media_capture;
mod media_stream;

pub use media_capture::*;
pub use media_stream::*;
