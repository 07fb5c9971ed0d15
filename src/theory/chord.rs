use serde::{Deserialize, Serialize};

use super::mode::Scale;
use super::pitch::PitchName;

/// Octave the root of every resolved chord lands in (C3..B3).
pub const CHORD_OCTAVE: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriadQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
}

impl TriadQuality {
    /// Classify by semitones from root to third and root to fifth.
    pub fn from_intervals(third: u8, fifth: u8) -> Option<Self> {
        match (third, fifth) {
            (4, 7) => Some(TriadQuality::Major),
            (3, 7) => Some(TriadQuality::Minor),
            (3, 6) => Some(TriadQuality::Diminished),
            (4, 8) => Some(TriadQuality::Augmented),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triad {
    /// 1-based scale degree of the root.
    pub degree: u8,
    pub root: PitchName,
    pub quality: TriadQuality,
    /// Root, third, fifth as ascending MIDI pitches.
    pub notes: [u8; 3],
}

impl Triad {
    /// The diatonic triad built on a 1-based `degree` of `scale`.
    pub fn diatonic(scale: &Scale, degree: u8) -> Option<Self> {
        if !(1..=7).contains(&degree) {
            return None;
        }
        let index = (degree - 1) as usize;
        let root = scale.note(index);
        let third = scale.span(index, index + 2);
        let fifth = scale.span(index, index + 4);
        let quality = TriadQuality::from_intervals(third, fifth)?;

        let root_midi = root.midi(CHORD_OCTAVE) as i32;
        // Keep the root inside the reference octave even for B# / Cb spellings.
        let low = 12 * (CHORD_OCTAVE + 1);
        let root_midi = low + (root_midi - low).rem_euclid(12);
        let notes = [
            root_midi as u8,
            (root_midi + third as i32) as u8,
            (root_midi + fifth as i32) as u8,
        ];

        Some(Self {
            degree,
            root,
            quality,
            notes,
        })
    }
}

/// A resolved chord slot. `Rest` is silence, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Chord {
    Rest,
    Triad(Triad),
}

impl Chord {
    pub fn is_rest(&self) -> bool {
        matches!(self, Chord::Rest)
    }

    pub fn triad(&self) -> Option<&Triad> {
        match self {
            Chord::Rest => None,
            Chord::Triad(triad) => Some(triad),
        }
    }

    pub fn notes(&self) -> &[u8] {
        match self {
            Chord::Rest => &[],
            Chord::Triad(triad) => &triad.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::mode::Mode;

    fn scale(tonic: &str, mode: Mode) -> Scale {
        Scale::new(tonic.parse().unwrap(), mode)
    }

    #[test]
    fn c_major_triads() {
        let s = scale("C", Mode::Ionian);
        let qualities: Vec<TriadQuality> = (1..=7)
            .map(|d| Triad::diatonic(&s, d).unwrap().quality)
            .collect();
        assert_eq!(
            qualities,
            [
                TriadQuality::Major,
                TriadQuality::Minor,
                TriadQuality::Minor,
                TriadQuality::Major,
                TriadQuality::Major,
                TriadQuality::Minor,
                TriadQuality::Diminished,
            ]
        );
    }

    #[test]
    fn triads_sit_in_reference_octave() {
        let s = scale("C", Mode::Ionian);
        assert_eq!(Triad::diatonic(&s, 1).unwrap().notes, [48, 52, 55]);
        assert_eq!(Triad::diatonic(&s, 5).unwrap().notes, [55, 59, 62]);

        let s = scale("A", Mode::Aeolian);
        let tonic = Triad::diatonic(&s, 1).unwrap();
        assert_eq!(tonic.root.to_string(), "A");
        assert_eq!(tonic.notes, [57, 60, 64]);
    }

    #[test]
    fn out_of_range_degrees_do_not_resolve() {
        let s = scale("C", Mode::Ionian);
        assert!(Triad::diatonic(&s, 0).is_none());
        assert!(Triad::diatonic(&s, 8).is_none());
    }

    #[test]
    fn rest_chord_is_silent() {
        assert!(Chord::Rest.is_rest());
        assert!(Chord::Rest.notes().is_empty());
        assert!(Chord::Rest.triad().is_none());
    }
}
