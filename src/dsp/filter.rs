use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/*
Trapezoidal state-variable filter (Simper / Cytomic form). One pass produces
all four responses; `FilterKind` picks which one is written back.

| kind      | passes          | rejects      |
| --------- | --------------- | ------------ |
| low-pass  | below cutoff    | above cutoff |
| high-pass | above cutoff    | below cutoff |
| band-pass | around cutoff   | elsewhere    |
| notch     | everything else | at cutoff    |

    g = tan(π · cutoff / sample_rate)
    k = 2 - 2 · resonance
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

/// A filter stage as declared in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub cutoff_hz: f32,
    #[serde(default)]
    pub resonance: f32,
}

impl FilterSpec {
    pub const fn low_pass(cutoff_hz: f32) -> Self {
        Self {
            kind: FilterKind::LowPass,
            cutoff_hz,
            resonance: 0.0,
        }
    }

    pub const fn high_pass(cutoff_hz: f32) -> Self {
        Self {
            kind: FilterKind::HighPass,
            cutoff_hz,
            resonance: 0.0,
        }
    }

    pub const fn band_pass(cutoff_hz: f32, resonance: f32) -> Self {
        Self {
            kind: FilterKind::BandPass,
            cutoff_hz,
            resonance,
        }
    }

    pub fn build(&self) -> SVFilter {
        let mut filter = SVFilter::new(self.kind, self.cutoff_hz);
        filter.set_resonance(self.resonance);
        filter
    }
}

struct Outputs {
    lowpass: f32,
    bandpass: f32,
    highpass: f32,
    notch: f32,
}

pub struct SVFilter {
    ic1eq: f32,
    ic2eq: f32,
    cutoff_hz: f32,
    resonance: f32,
    kind: FilterKind,
}

impl SVFilter {
    pub fn new(kind: FilterKind, cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            resonance: 0.0,
            kind,
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz;
    }

    /// 0 is flat, values toward 1 ring at the cutoff.
    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, 0.98);
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    #[inline]
    fn tick(&mut self, input: f32, g: f32, k: f32) -> Outputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = input - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        Outputs {
            lowpass: v2,
            bandpass: v1,
            highpass: input - k * v1 - v2,
            notch: input - k * v1,
        }
    }

    /// Filter `buffer` in place.
    pub fn process(&mut self, buffer: &mut [f32], sample_rate: f32) {
        // Keep the cutoff below Nyquist or tan() blows up.
        let cutoff = self.cutoff_hz.clamp(1.0, sample_rate * 0.49);
        let g = (PI * cutoff / sample_rate).tan();
        let k = 2.0 - 2.0 * self.resonance;

        for sample in buffer.iter_mut() {
            let out = self.tick(*sample, g, k);
            *sample = match self.kind {
                FilterKind::LowPass => out.lowpass,
                FilterKind::HighPass => out.highpass,
                FilterKind::BandPass => out.bandpass,
                FilterKind::Notch => out.notch,
            };
        }
    }
}
