use serde::{Deserialize, Serialize};

/// Shortest stage time, one frame at 48 kHz.
const MIN_TIME: f32 = 1.0 / 48_000.0;

/*
Linear ADSR
===========

    Level
      1.0 ┐     ╱╲
          │    ╱  ╲___________
      S   │   ╱               ╲
          │  ╱                 ╲
      0.0 └─╱───────────────────╲──→ Time
            A    D      S        R

Each stage moves `level` by a fixed increment per sample:

    increment = change / (seconds * sample_rate)

note_off starts Release from wherever the level currently is, so releasing
during the attack does not click. Release interpolates from a snapshot of that
level to exactly zero over a precomputed sample count, then the envelope goes
Idle and the owning voice can be reused.
*/

/// ADSR shape in milliseconds, as stored in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeSpec {
    pub attack_ms: f32,
    pub decay_ms: f32,
    pub sustain_level: f32,
    pub release_ms: f32,
}

impl EnvelopeSpec {
    pub const fn new(attack_ms: f32, decay_ms: f32, sustain_level: f32, release_ms: f32) -> Self {
        Self {
            attack_ms,
            decay_ms,
            sustain_level,
            release_ms,
        }
    }
}

impl Default for EnvelopeSpec {
    fn default() -> Self {
        Self::new(10.0, 100.0, 0.7, 300.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct Envelope {
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,

    stage: EnvelopeStage,
    level: f32,

    release_from: f32,
    release_samples: u32,
    release_elapsed: u32,
}

impl Envelope {
    /// Times in seconds.
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.max(MIN_TIME),
            decay: decay.max(MIN_TIME),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(MIN_TIME),
            stage: EnvelopeStage::Idle,
            level: 0.0,
            release_from: 0.0,
            release_samples: 1,
            release_elapsed: 0,
        }
    }

    pub fn from_spec(spec: &EnvelopeSpec) -> Self {
        Self::adsr(
            spec.attack_ms / 1000.0,
            spec.decay_ms / 1000.0,
            spec.sustain_level,
            spec.release_ms / 1000.0,
        )
    }

    /// Retrigger from zero.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeStage::Attack;
        self.release_elapsed = 0;
    }

    pub fn note_off(&mut self, sample_rate: f32) {
        if self.stage == EnvelopeStage::Idle {
            return;
        }
        self.release_from = self.level;
        self.release_samples = (self.release * sample_rate).round().max(1.0) as u32;
        self.release_elapsed = 0;
        self.stage = EnvelopeStage::Release;
    }

    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }
            EnvelopeStage::Attack => {
                self.level += 1.0 / (self.attack * sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }
            EnvelopeStage::Decay => {
                let drop = (1.0 - self.sustain) / (self.decay * sample_rate);
                self.level -= drop;
                if self.level <= self.sustain {
                    self.level = self.sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            EnvelopeStage::Sustain => {
                self.level = self.sustain;
            }
            EnvelopeStage::Release => {
                let progress = self.release_elapsed as f32 / self.release_samples as f32;
                self.level = (self.release_from * (1.0 - progress)).max(0.0);
                self.release_elapsed = self.release_elapsed.saturating_add(1);
                if self.release_elapsed >= self.release_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }
        self.level
    }

    /// Multiply `buffer` in place by the envelope.
    pub fn apply(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample *= self.next_sample(sample_rate);
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.release_from = 0.0;
        self.release_elapsed = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}
