// Voice management: polyphonic instrument pools and looping sample players.
// This layer sits above graph nodes and below the render transport.

pub mod message;
pub mod poly;
pub mod sampler;
pub mod voice;

pub use message::SynthMessage;
pub use poly::PolySynth;
pub use sampler::SamplePlayer;
pub use voice::{Voice, VoiceState};
