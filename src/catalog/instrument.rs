//! Instrument descriptors: the recipe a voice pool is built from.
//!
//! A descriptor is plain data (oscillator stack, amplitude envelope, filter
//! chain, level, polyphony) so it can live in the catalog file and be
//! compared. `graph::patch::InstrumentPatch` turns one into a playable node.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dsp::{EnvelopeSpec, FilterSpec, Waveform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentId {
    Piano,
    ElectricPiano,
    Pad,
    Bass,
    Pluck,
    Lead,
}

impl InstrumentId {
    pub const ALL: [InstrumentId; 6] = [
        InstrumentId::Piano,
        InstrumentId::ElectricPiano,
        InstrumentId::Pad,
        InstrumentId::Bass,
        InstrumentId::Pluck,
        InstrumentId::Lead,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InstrumentId::Piano => "piano",
            InstrumentId::ElectricPiano => "electric_piano",
            InstrumentId::Pad => "pad",
            InstrumentId::Bass => "bass",
            InstrumentId::Pluck => "pluck",
            InstrumentId::Lead => "lead",
        }
    }
}

impl FromStr for InstrumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstrumentId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| format!("unknown instrument `{s}`"))
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatorSpec {
    pub waveform: Waveform,
    #[serde(default)]
    pub detune_cents: f32,
    #[serde(default = "unit_gain")]
    pub gain: f32,
}

fn unit_gain() -> f32 {
    1.0
}

impl OscillatorSpec {
    pub const fn new(waveform: Waveform, detune_cents: f32, gain: f32) -> Self {
        Self {
            waveform,
            detune_cents,
            gain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentDescriptor {
    pub oscillators: Vec<OscillatorSpec>,
    pub envelope: EnvelopeSpec,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(default)]
    pub volume_db: f32,
    #[serde(default = "default_polyphony")]
    pub polyphony: usize,
}

fn default_polyphony() -> usize {
    8
}

impl InstrumentDescriptor {
    /// Built-in sound for `id`.
    pub fn builtin(id: InstrumentId) -> Self {
        match id {
            InstrumentId::Piano => piano(),
            InstrumentId::ElectricPiano => electric_piano(),
            InstrumentId::Pad => pad(),
            InstrumentId::Bass => bass(),
            InstrumentId::Pluck => pluck(),
            InstrumentId::Lead => lead(),
        }
    }
}

// Triangle plus a quiet octave sine, fast decay to a low sustain.
fn piano() -> InstrumentDescriptor {
    InstrumentDescriptor {
        oscillators: vec![
            OscillatorSpec::new(Waveform::Triangle, 0.0, 0.8),
            OscillatorSpec::new(Waveform::Sine, 1200.0, 0.2),
        ],
        envelope: EnvelopeSpec::new(3.0, 600.0, 0.25, 400.0),
        filters: vec![FilterSpec::low_pass(2_400.0)],
        volume_db: -9.0,
        polyphony: 8,
    }
}

fn electric_piano() -> InstrumentDescriptor {
    InstrumentDescriptor {
        oscillators: vec![
            OscillatorSpec::new(Waveform::Sine, 0.0, 0.7),
            OscillatorSpec::new(Waveform::Triangle, 4.0, 0.3),
        ],
        envelope: EnvelopeSpec::new(8.0, 900.0, 0.35, 500.0),
        filters: vec![FilterSpec::low_pass(1_800.0)],
        volume_db: -10.0,
        polyphony: 12,
    }
}

// Two detuned saws, slow attack, long release, darkened.
fn pad() -> InstrumentDescriptor {
    InstrumentDescriptor {
        oscillators: vec![
            OscillatorSpec::new(Waveform::Saw, 0.0, 0.5),
            OscillatorSpec::new(Waveform::Saw, 8.0, 0.5),
        ],
        envelope: EnvelopeSpec::new(300.0, 100.0, 0.8, 500.0),
        filters: vec![FilterSpec::low_pass(1_500.0)],
        volume_db: -16.0,
        polyphony: 12,
    }
}

fn bass() -> InstrumentDescriptor {
    InstrumentDescriptor {
        oscillators: vec![
            OscillatorSpec::new(Waveform::Square, 0.0, 0.6),
            OscillatorSpec::new(Waveform::Sine, -1200.0, 0.4),
        ],
        envelope: EnvelopeSpec::new(10.0, 100.0, 0.7, 150.0),
        filters: vec![FilterSpec::low_pass(500.0)],
        volume_db: -8.0,
        polyphony: 4,
    }
}

fn pluck() -> InstrumentDescriptor {
    InstrumentDescriptor {
        oscillators: vec![OscillatorSpec::new(Waveform::Triangle, 0.0, 1.0)],
        envelope: EnvelopeSpec::new(1.0, 150.0, 0.0, 100.0),
        filters: vec![FilterSpec::low_pass(4_000.0)],
        volume_db: -12.0,
        polyphony: 8,
    }
}

fn lead() -> InstrumentDescriptor {
    InstrumentDescriptor {
        oscillators: vec![OscillatorSpec::new(Waveform::Saw, 0.0, 1.0)],
        envelope: EnvelopeSpec::new(10.0, 100.0, 0.6, 200.0),
        filters: vec![FilterSpec::low_pass(2_500.0)],
        volume_db: -14.0,
        polyphony: 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_is_playable() {
        for id in InstrumentId::ALL {
            let descriptor = InstrumentDescriptor::builtin(id);
            assert!(!descriptor.oscillators.is_empty(), "{id} has no oscillators");
            assert!(descriptor.polyphony > 0);
            assert!(descriptor.volume_db <= 0.0);
        }
    }

    #[test]
    fn descriptor_defaults_fill_in_from_toml() {
        let source = r#"
            oscillators = [{ waveform = "sine" }]
            envelope = { attack_ms = 5.0, decay_ms = 50.0, sustain_level = 0.5, release_ms = 100.0 }
        "#;
        let descriptor: InstrumentDescriptor = toml::from_str(source).unwrap();
        assert_eq!(descriptor.polyphony, 8);
        assert_eq!(descriptor.oscillators[0].gain, 1.0);
        assert!(descriptor.filters.is_empty());
    }

    #[test]
    fn ids_use_snake_case_names() {
        let json = serde_json::to_string(&InstrumentId::ElectricPiano).unwrap();
        assert_eq!(json, "\"electric_piano\"");
        assert_eq!(InstrumentId::ElectricPiano.to_string(), "electric_piano");
        assert_eq!("pluck".parse::<InstrumentId>(), Ok(InstrumentId::Pluck));
        assert!("tuba".parse::<InstrumentId>().is_err());
    }
}
