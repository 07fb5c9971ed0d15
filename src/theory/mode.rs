// Modes, tonalities and spelled diatonic scales.
//
// A mode is a rotation of the major scale. Each mode's tonic sits a fixed
// distance from its parent major key on the line of fifths (Dorian is the
// second degree of its parent, two fifths above it, and so on), which gives
// the key signature of any tonic/mode pair without tables of keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pitch::PitchName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
}

const MAJOR_STEPS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Ionian,
        Mode::Dorian,
        Mode::Phrygian,
        Mode::Lydian,
        Mode::Mixolydian,
        Mode::Aeolian,
        Mode::Locrian,
    ];

    /// Input mode numbers 1..=7, ionian first.
    pub fn from_number(mode: i64) -> Option<Self> {
        if (1..=7).contains(&mode) {
            Some(Mode::ALL[(mode - 1) as usize])
        } else {
            None
        }
    }

    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Semitones from the tonic to each of the seven degrees.
    pub fn intervals(self) -> [u8; 7] {
        let rotation = self as usize;
        let base = MAJOR_STEPS[rotation];
        let mut out = [0u8; 7];
        for (i, slot) in out.iter_mut().enumerate() {
            let step = MAJOR_STEPS[(rotation + i) % 7];
            *slot = (step + 12 - base) % 12;
        }
        out
    }

    /// Fifths between the parent major tonic and this mode's tonic.
    fn fifths_from_parent(self) -> i32 {
        [0, 2, 4, -1, 1, 3, 5][self as usize]
    }

    /// The mode that ordinary major/minor collapse to.
    pub fn is_major_or_minor(self) -> bool {
        matches!(self, Mode::Ionian | Mode::Aeolian)
    }

    pub fn is_minor_family(self) -> bool {
        self == Mode::Aeolian
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Ionian => "ionian",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
            Mode::Aeolian => "aeolian",
            Mode::Locrian => "locrian",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of sharps or flats in the key signature of `tonic` in `mode`.
pub fn key_signature_accidentals(tonic: PitchName, mode: Mode) -> u32 {
    (tonic.fifths() - mode.fifths_from_parent()).unsigned_abs()
}

/// A tonic and mode after key-signature simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tonality {
    pub tonic: PitchName,
    pub mode: Mode,
    /// Set when the mode is reported as plain major/minor.
    pub simplified: bool,
}

impl Tonality {
    /// Build a tonality, simplifying ionian/aeolian keys.
    ///
    /// For those two modes the enharmonic tonic replaces the original when its
    /// key signature carries no more accidentals (C# major becomes Db major,
    /// F# major becomes Gb major on a tie), and the mode is renamed
    /// `major`/`minor`.
    pub fn new(tonic: PitchName, mode: Mode) -> Self {
        if !mode.is_major_or_minor() {
            return Self {
                tonic,
                mode,
                simplified: false,
            };
        }

        let alternative = tonic.enharmonic();
        let tonic = if key_signature_accidentals(alternative, mode)
            <= key_signature_accidentals(tonic, mode)
        {
            alternative
        } else {
            tonic
        };

        Self {
            tonic,
            mode,
            simplified: true,
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match (self.simplified, self.mode) {
            (true, Mode::Ionian) => "major",
            (true, Mode::Aeolian) => "minor",
            (_, mode) => mode.name(),
        }
    }

    pub fn scale(&self) -> Scale {
        Scale::new(self.tonic, self.mode)
    }
}

impl fmt::Display for Tonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode_name())
    }
}

/// Seven spelled scale notes, one per letter, starting at the tonic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scale {
    tonic: PitchName,
    intervals: [u8; 7],
    notes: [PitchName; 7],
}

impl Scale {
    pub fn new(tonic: PitchName, mode: Mode) -> Self {
        let intervals = mode.intervals();
        let mut notes = [tonic; 7];
        for (i, note) in notes.iter_mut().enumerate() {
            let letter = tonic.letter.offset(i);
            let target = tonic.pitch_class() as i32 + intervals[i] as i32;
            let mut accidental = (target - letter.natural_pc()).rem_euclid(12);
            if accidental > 6 {
                accidental -= 12;
            }
            *note = PitchName::new(letter, accidental as i8);
        }
        Self {
            tonic,
            intervals,
            notes,
        }
    }

    pub fn notes(&self) -> &[PitchName; 7] {
        &self.notes
    }

    /// Spelled note for a 0-based scale index (wraps every 7).
    pub fn note(&self, index: usize) -> PitchName {
        self.notes[index % 7]
    }

    /// MIDI pitch of a 0-based scale index counted upward from the tonic in
    /// `octave`. Index 7 is the tonic an octave up. Saturates at the top
    /// of the MIDI range.
    pub fn pitch(&self, index: usize, octave: i32) -> u8 {
        let base = i64::from(self.tonic.midi(octave)) + i64::from(self.intervals[index % 7]);
        let octaves = i64::try_from(index / 7).unwrap_or(i64::MAX);
        base.saturating_add(octaves.saturating_mul(12)).clamp(0, 127) as u8
    }

    /// Semitones from scale index `from` up to scale index `to` (`to >= from`).
    pub fn span(&self, from: usize, to: usize) -> u8 {
        self.pitch(to, 4) - self.pitch(from, 4)
    }
}
