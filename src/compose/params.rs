//! The input parameter vector and its normalization.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::theory::{Mode, PitchName, Tonality};

pub const MIN_BPM: u32 = 70;
pub const MAX_BPM: u32 = 100;
pub const BPM_STEP: u32 = 5;

/// Raw analysis output, exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 1 = C ... 12 = B.
    pub key: i64,
    /// 1 = ionian ... 7 = locrian.
    pub mode: i64,
    pub bpm: f64,
    pub energy: f64,
    pub valence: f64,
    pub swing: f64,
    /// Scale degrees, 1-based. Anything outside 1..=7 is a rest.
    pub chords: Vec<i64>,
    /// One contour per chord slot. Entries >= 1 are scale degrees, anything
    /// else is silence.
    #[serde(default)]
    pub melodies: Vec<Vec<i64>>,
}

impl Parameters {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|err| Error::invalid("parameters", err.to_string()))
    }

    pub fn normalize(&self) -> Result<Normalized> {
        let tonic = PitchName::from_key_number(self.key)
            .ok_or_else(|| Error::invalid("key", format!("{} is outside 1..=12", self.key)))?;
        let mode = Mode::from_number(self.mode)
            .ok_or_else(|| Error::invalid("mode", format!("{} is outside 1..=7", self.mode)))?;
        let bpm = quantize_bpm(self.bpm)?;
        let energy = unit("energy", self.energy)?;
        let valence = unit("valence", self.valence)?;
        let swing = unit("swing", self.swing)?;
        if self.chords.is_empty() {
            return Err(Error::invalid("chords", "at least one chord slot is required"));
        }

        let parameters = Parameters {
            bpm: bpm as f64,
            energy,
            valence,
            swing,
            ..self.clone()
        };

        Ok(Normalized {
            parameters,
            tonality: Tonality::new(tonic, mode),
            bpm,
            swing: swing > 0.5,
        })
    }
}

/// Canonical parameters plus the musical identifiers derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Clamped and quantized copy of the input. Normalizing it again yields
    /// this same value.
    pub parameters: Parameters,
    pub tonality: Tonality,
    pub bpm: u32,
    pub swing: bool,
}

impl Normalized {
    pub fn energy(&self) -> f64 {
        self.parameters.energy
    }

    pub fn valence(&self) -> f64 {
        self.parameters.valence
    }

    pub fn chords(&self) -> &[i64] {
        &self.parameters.chords
    }

    /// The melody for chord slot `slot`, empty when none was supplied.
    pub fn melody(&self, slot: usize) -> &[i64] {
        self.parameters
            .melodies
            .get(slot)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Round to the nearest multiple of 5, then clamp to 70..=100.
pub fn quantize_bpm(bpm: f64) -> Result<u32> {
    if !bpm.is_finite() || bpm <= 0.0 {
        return Err(Error::invalid("bpm", format!("{bpm} is not a positive tempo")));
    }
    let step = BPM_STEP as f64;
    let rounded = (bpm / step).round() * step;
    Ok(rounded.clamp(MIN_BPM as f64, MAX_BPM as f64) as u32)
}

fn unit(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value.clamp(0.0, 1.0))
    } else {
        Err(Error::invalid(field, format!("{value} is not a finite number")))
    }
}
