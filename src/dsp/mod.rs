//! Low-level DSP primitives used by instrument patches and sample players.
//!
//! These components are allocation-free once built, so they can live inside
//! voice structs and be driven block by block.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter with four responses.
pub mod filter;
/// Band-limited oscillator waveforms and seeded noise.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeSpec, EnvelopeStage};
pub use filter::{FilterKind, FilterSpec, SVFilter};
pub use oscillator::{Oscillator, Waveform};

/// Linear gain for a level in decibels.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}
