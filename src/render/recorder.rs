use crate::error::{Error, RenderStage, Result};
use crate::render::RenderedAudio;

/// Collects the mix bus for exactly `frame_count` frames.
#[derive(Debug)]
pub struct Recorder {
    sample_rate: u32,
    frame_count: usize,
    samples: Vec<f32>,
}

impl Recorder {
    pub fn new(sample_rate: u32, frame_count: u64) -> Self {
        let frame_count = frame_count as usize;
        Self {
            sample_rate,
            frame_count,
            samples: Vec::with_capacity(frame_count),
        }
    }

    /// Append a block. Anything past the target length is dropped.
    pub fn capture(&mut self, block: &[f32]) {
        let room = self.remaining();
        self.samples.extend_from_slice(&block[..block.len().min(room)]);
    }

    pub fn remaining(&self) -> usize {
        self.frame_count - self.samples.len()
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    pub fn finish(self) -> Result<RenderedAudio> {
        if !self.is_complete() {
            return Err(Error::render(
                RenderStage::Recording,
                format!(
                    "recorded {} of {} frames",
                    self.samples.len(),
                    self.frame_count
                ),
            ));
        }
        let duration_seconds = self.frame_count as f64 / self.sample_rate as f64;
        Ok(RenderedAudio {
            sample_rate: self.sample_rate,
            samples: self.samples,
            duration_seconds,
        })
    }
}
