mod call_session;
mod call_view;

pub use call_session::*;
pub use call_view::*;
