//! Musical timing: exact measure fractions and ordered event lists.

pub mod time;
pub mod timeline;

pub use time::{MusicalTime, BEATS_PER_MEASURE};
pub use timeline::{FrameEvent, Groove, TimedEvent, Timeline};
