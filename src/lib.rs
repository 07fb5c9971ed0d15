pub mod catalog; // Sample groups and instrument descriptors
pub mod compose; // Parameters to Track
pub mod config;
pub mod dsp;
pub mod error;
pub mod graph; // Instrument voices as render nodes
pub mod io;
pub mod prng;
pub mod render; // Track to audio
pub mod sequencing; // Musical time and event timelines
pub mod synth; // Voice management and polyphony
pub mod theory;

pub use catalog::Catalog;
pub use compose::{Composer, Composition, Parameters, Track};
pub use config::EngineConfig;
pub use error::{Error, RenderStage, Result};
pub use prng::Seed;
pub use render::{RenderEngine, RenderedAudio};

pub const MAX_BLOCK_SIZE: usize = 2048;
