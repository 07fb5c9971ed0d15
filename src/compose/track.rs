//! The Track: one fully timed, immutable description of a generated piece.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, InstrumentId};
use crate::compose::params::Parameters;
use crate::compose::selector::SampleSelection;
use crate::error::{Error, Result};
use crate::sequencing::{Groove, MusicalTime};
use crate::theory::PitchName;

/// A scheduled playback window of one sample variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleLoop {
    pub group: String,
    pub index: usize,
    pub start: MusicalTime,
    pub stop: MusicalTime,
}

/// A scheduled synthesized note, possibly a chord.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentNote {
    pub instrument: InstrumentId,
    /// MIDI pitches sounding together.
    pub pitches: Vec<u8>,
    /// `None` holds the note until the end of the track.
    pub duration: Option<MusicalTime>,
    pub onset: MusicalTime,
    pub velocity: f32,
}

impl InstrumentNote {
    /// When the note is released, given the track length.
    pub fn release(&self, length: MusicalTime) -> MusicalTime {
        match self.duration {
            Some(duration) => (self.onset + duration).min(length),
            None => length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub bpm: u32,
    pub swing: bool,
    pub tonic: PitchName,
    pub mode: String,
    pub measures: u64,
    pub samples: Vec<SampleSelection>,
    pub loops: Vec<SampleLoop>,
    pub instruments: Vec<InstrumentId>,
    pub notes: Vec<InstrumentNote>,
    /// `#rrggbb`.
    pub color: String,
    /// The input exactly as received.
    pub parameters: Parameters,
}

impl Track {
    pub fn length(&self) -> MusicalTime {
        MusicalTime::measures(self.measures)
    }

    pub fn groove(&self) -> Groove {
        Groove::new(self.bpm as f64, self.swing)
    }

    /// Length in seconds. Swing never moves measure boundaries, so this is
    /// the straight-time length.
    pub fn duration_seconds(&self) -> f64 {
        self.length().to_seconds(self.bpm as f64)
    }

    /// Output length in frames: `round(duration × sample_rate)`.
    pub fn frame_count(&self, sample_rate: u32) -> u64 {
        (self.duration_seconds() * sample_rate as f64).round() as u64
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| Error::invalid("track", err.to_string()))
    }

    /// Check loop and note invariants against the catalog they were drawn
    /// from.
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        let length = self.length();

        for lp in &self.loops {
            if lp.stop <= lp.start {
                return Err(Error::invalid(
                    "loops",
                    format!("`{}` window {}..{} is empty", lp.group, lp.start, lp.stop),
                ));
            }
            if lp.stop > length {
                return Err(Error::invalid(
                    "loops",
                    format!("`{}` window ends at {} past {}", lp.group, lp.stop, length),
                ));
            }
            let size = catalog.sample_group(&lp.group)?.size();
            if lp.index >= size {
                return Err(Error::invalid(
                    "loops",
                    format!("`{}` index {} out of {}", lp.group, lp.index, size),
                ));
            }
        }

        for note in &self.notes {
            if note.onset >= length {
                return Err(Error::invalid(
                    "notes",
                    format!("{} note at {} starts after the track ends", note.instrument, note.onset),
                ));
            }
            if !note.velocity.is_finite() || !(0.0..=1.0).contains(&note.velocity) {
                return Err(Error::invalid(
                    "notes",
                    format!("{} note at {} has velocity {}", note.instrument, note.onset, note.velocity),
                ));
            }
            if note.pitches.is_empty() || note.duration.is_some_and(|d| d.is_zero()) {
                return Err(Error::invalid(
                    "notes",
                    format!("{} note at {} is silent", note.instrument, note.onset),
                ));
            }
            if !self.instruments.contains(&note.instrument) {
                return Err(Error::invalid(
                    "instruments",
                    format!("{} is used but not listed", note.instrument),
                ));
            }
        }
        Ok(())
    }
}
