//! Music theory: spelled pitch names, modes, scales and triads.
//!
//! Everything here is pure and allocation-light; the composer builds on it
//! but it knows nothing about tracks or timing.

pub mod chord;
pub mod mode;
pub mod pitch;

pub use chord::{Chord, Triad, TriadQuality, CHORD_OCTAVE};
pub use mode::{Mode, Scale, Tonality};
pub use pitch::{Letter, PitchName};
