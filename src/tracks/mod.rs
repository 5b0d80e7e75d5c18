//! Track lists and durations

pub mod duration;
pub mod track;

pub use duration::Duration;
pub use track::{tracks_from, FileType, Track};
