use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::prng::Prng;

/*
Phase-accumulator oscillator.

    phase    in [0, 1), advanced by frequency / sample_rate each sample
    sine     sin(2π · phase)
    saw      2 · phase - 1, with a PolyBLEP correction at the wrap
    square   ±1, PolyBLEP at both edges
    triangle 1 - 4 · |phase - 0.5|, naive (its discontinuity is in the slope)
    noise    white, drawn from a seeded generator so renders repeat exactly

PolyBLEP subtracts a two-sample polynomial residual around each jump, which
removes most of the aliasing a naive saw produces at high notes.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Triangle,
    Noise,
}

pub struct Oscillator {
    waveform: Waveform,
    phase: f32,
    rng: Prng,
}

impl Oscillator {
    pub fn new(waveform: Waveform, seed: u64) -> Self {
        Self {
            waveform,
            phase: 0.0,
            rng: Prng::new(seed),
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let dt = (frequency / sample_rate).clamp(0.0, 0.5);
        let t = self.phase;

        let value = match self.waveform {
            Waveform::Sine => (TAU * t).sin(),
            Waveform::Saw => 2.0 * t - 1.0 - poly_blep(t, dt),
            Waveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, dt) - poly_blep((t + 0.5).fract(), dt)
            }
            Waveform::Triangle => 1.0 - 4.0 * (t - 0.5).abs(),
            Waveform::Noise => self.rng.next_bipolar(),
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        value
    }

    /// Overwrite `out` with the waveform at `frequency` Hz.
    pub fn render(&mut self, out: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }
}

#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if t < dt {
        let x = t / dt;
        x + x - x * x - 1.0
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt;
        x * x + x + x + 1.0
    } else {
        0.0
    }
}

/// Frequency ratio for a detune in cents.
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    2.0_f32.powf(cents / 1200.0)
}
