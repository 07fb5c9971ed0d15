//! Offline rendering: a Track in, a mono sample buffer out.

pub mod engine;
pub mod fade;
pub mod loader;
pub mod mixer;
pub mod recorder;
pub mod session;
pub mod transport;

pub use engine::{CancelHandle, RenderEngine, RenderState};
pub use fade::{FadeOut, FADE_DEPTH_DB, MAINTENANCE_INTERVAL};
pub use loader::{FileSampleSource, SampleSource, SynthesizedSamples};
pub use session::{ResourceKind, ResourceLedger};
pub use transport::{Action, Playback, Transport};

/// Mono samples of a finished render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAudio {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
    pub duration_seconds: f64,
}

impl RenderedAudio {
    pub fn frames(&self) -> usize {
        self.samples.len()
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0, |peak, s| peak.max(s.abs()))
    }
}
