use std::sync::Arc;

use crate::{
    catalog::SampleGroup,
    dsp::{db_to_gain, SVFilter},
    io::sample_buffer::SampleBuffer,
    MAX_BLOCK_SIZE,
};

/// Length of the fade applied when a loop starts or stops, in seconds.
const EDGE_FADE_SECONDS: f32 = 0.005;

/// Plays one decoded sample, looping it while gated.
///
/// Start and stop ramp over a few milliseconds so loop windows opening and
/// closing mid-waveform do not click.
pub struct SamplePlayer {
    buffer: Arc<SampleBuffer>,
    filter: Option<SVFilter>,
    looping: bool,
    volume_db: f32,
    fade_db: f32,
    position: usize,
    playing: bool,
    ramp: f32,
    ramp_step: f32,
    scratch: Vec<f32>,
}

impl SamplePlayer {
    pub fn new(buffer: Arc<SampleBuffer>, group: &SampleGroup) -> Self {
        let ramp_step = 1.0 / (EDGE_FADE_SECONDS * buffer.sample_rate() as f32).max(1.0);
        Self {
            buffer,
            filter: group.filter.map(|spec| spec.build()),
            looping: group.looping,
            volume_db: group.volume_db,
            fade_db: 0.0,
            position: 0,
            playing: false,
            ramp: 0.0,
            ramp_step,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn start(&mut self) {
        self.position = 0;
        self.playing = true;
        self.ramp = 0.0;
        if let Some(filter) = &mut self.filter {
            filter.reset();
        }
    }

    /// Gate off. The player keeps rendering until its ramp reaches zero.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_sounding(&self) -> bool {
        self.playing || self.ramp > 0.0
    }

    pub fn set_fade_db(&mut self, fade_db: f32) {
        self.fade_db = fade_db.max(0.0);
    }

    pub fn gain(&self) -> f32 {
        db_to_gain(self.volume_db - self.fade_db)
    }

    /// Add the player's output into `out`.
    pub fn render_block(&mut self, out: &mut [f32]) {
        if !self.is_sounding() || self.buffer.is_empty() {
            return;
        }
        let gain = self.gain();
        let sample_rate = self.buffer.sample_rate() as f32;
        let frames = self.buffer.frames();

        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let scratch = &mut self.scratch[..chunk.len()];
            for sample in scratch.iter_mut() {
                let target = if self.playing { 1.0 } else { 0.0 };
                if self.ramp < target {
                    self.ramp = (self.ramp + self.ramp_step).min(1.0);
                } else if self.ramp > target {
                    self.ramp = (self.ramp - self.ramp_step).max(0.0);
                }

                if self.position >= frames.len() {
                    if self.looping {
                        self.position = 0;
                    } else {
                        self.playing = false;
                        self.ramp = 0.0;
                    }
                }
                *sample = match frames.get(self.position) {
                    Some(value) if self.ramp > 0.0 => *value * self.ramp,
                    _ => 0.0,
                };
                self.position += 1;
            }
            if let Some(filter) = &mut self.filter {
                filter.process(scratch, sample_rate);
            }
            for (o, s) in chunk.iter_mut().zip(scratch.iter()) {
                *o += s * gain;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(frames: Vec<f32>, looping: bool) -> SamplePlayer {
        let mut group = SampleGroup::new("test", vec!["a.wav".into()]);
        group.looping = looping;
        SamplePlayer::new(Arc::new(SampleBuffer::new(1_000, frames)), &group)
    }

    #[test]
    fn silent_until_started() {
        let mut p = player(vec![1.0; 100], true);
        let mut out = vec![0.0f32; 32];
        p.render_block(&mut out);
        assert!(out.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn loops_while_gated() {
        let mut p = player(vec![1.0; 10], true);
        p.start();
        let mut out = vec![0.0f32; 200];
        p.render_block(&mut out);
        // 5 ms ramp at 1 kHz is 5 samples.
        assert!(out[10..].iter().all(|x| (*x - 1.0).abs() < 1e-6));
    }

    #[test]
    fn one_shot_stops_at_end() {
        let mut p = player(vec![1.0; 10], false);
        p.start();
        let mut out = vec![0.0f32; 40];
        p.render_block(&mut out);
        assert!(out[20..].iter().all(|x| *x == 0.0));
        assert!(!p.is_sounding());
    }

    #[test]
    fn stop_ramps_down() {
        let mut p = player(vec![1.0; 10], true);
        p.start();
        let mut out = vec![0.0f32; 50];
        p.render_block(&mut out);
        p.stop();

        let mut tail = vec![0.0f32; 20];
        p.render_block(&mut tail);
        assert!(tail[0] > 0.0 && tail[0] < 1.0);
        assert!(tail.windows(2).all(|w| w[1] <= w[0]));
        assert!(!p.is_sounding());
    }
}
