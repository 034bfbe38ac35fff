mod track_manager;

pub use track_manager::*;
