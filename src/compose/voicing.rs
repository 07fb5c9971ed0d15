//! Turns chord slots into instrument notes for each preset layer.

use crate::compose::arrangement::{Section, Slot};
use crate::compose::harmony::Harmony;
use crate::compose::preset::{ArpeggioLayer, Layer, MelodyLayer, Preset};
use crate::compose::track::InstrumentNote;
use crate::prng::Seed;
use crate::sequencing::MusicalTime;
use crate::theory::{Triad, CHORD_OCTAVE};

/// Rhythms a bass line can play across one measure, as `(offset, length)`
/// pairs in measures.
pub const BASS_PATTERNS: [&[(MusicalTime, MusicalTime)]; 4] = [
    &[(MusicalTime::ZERO, MusicalTime::MEASURE)],
    &[(MusicalTime::ZERO, MusicalTime::HALF), (MusicalTime::HALF, MusicalTime::HALF)],
    &[
        (MusicalTime::ZERO, MusicalTime::new(3, 8)),
        (MusicalTime::new(3, 8), MusicalTime::new(5, 8)),
    ],
    &[
        (MusicalTime::ZERO, MusicalTime::BEAT),
        (MusicalTime::HALF, MusicalTime::BEAT),
        (MusicalTime::new(3, 4), MusicalTime::BEAT),
    ],
];

/// Octave melody degrees are counted from.
pub const MELODY_OCTAVE: i32 = 4;

/// Highest scale index a melody degree may reach, ten octaves up. Anything
/// above already lands on the top MIDI note.
const MAX_DEGREE_INDEX: i64 = 7 * 10;

pub struct Voicer<'a> {
    preset: &'static Preset,
    harmony: &'a Harmony,
    melodies: &'a [Vec<i64>],
    seed: Seed,
}

impl<'a> Voicer<'a> {
    pub fn new(preset: &'static Preset, harmony: &'a Harmony, melodies: &'a [Vec<i64>], seed: Seed) -> Self {
        Self {
            preset,
            harmony,
            melodies,
            seed,
        }
    }

    /// Every note a slot contributes. Rest slots contribute nothing.
    pub fn voice_slot(&self, slot: Slot) -> Vec<InstrumentNote> {
        let Some(triad) = self.harmony.chords.get(slot.chord).and_then(|c| c.triad()) else {
            return Vec::new();
        };
        let onset = slot.onset();
        let mut notes = Vec::new();

        if let Some(layer) = self.preset.bass {
            notes.extend(self.bass(layer, triad, slot.measure, onset));
        }
        if let Some(layer) = self.preset.pad {
            notes.push(pad(layer, triad, onset, Some(MusicalTime::MEASURE)));
        }
        if slot.section == Section::Outro {
            return notes;
        }
        if let Some(arpeggio) = self.preset.arpeggio {
            notes.extend(self.arpeggio(arpeggio, triad, onset));
        }
        if let Some(melody) = self.preset.melody {
            let contour = self.melodies.get(slot.chord).map(Vec::as_slice).unwrap_or(&[]);
            notes.extend(self.melody(melody, contour, onset));
        }
        notes
    }

    /// The held tonic chord that closes the track.
    pub fn tail(&self, onset: MusicalTime) -> Option<InstrumentNote> {
        let layer = self.preset.pad?;
        let tonic = self.harmony.tonic_triad()?;
        Some(pad(layer, tonic, onset, None))
    }

    /// Index into [`BASS_PATTERNS`] for the slot starting at `measure`.
    pub fn bass_pattern(&self, measure: u64) -> usize {
        self.seed
            .derive(b"bass", measure)
            .rng()
            .index(BASS_PATTERNS.len())
    }

    fn bass(&self, layer: Layer, triad: &Triad, measure: u64, onset: MusicalTime) -> Vec<InstrumentNote> {
        let pitch = shift(triad.notes[0], -12 + 12 * layer.octave_shift);
        BASS_PATTERNS[self.bass_pattern(measure)]
            .iter()
            .map(|&(offset, length)| note(layer, vec![pitch], onset + offset, Some(length)))
            .collect()
    }

    fn arpeggio(&self, arpeggio: ArpeggioLayer, triad: &Triad, onset: MusicalTime) -> Vec<InstrumentNote> {
        let pattern = arpeggio.pattern;
        if pattern.is_empty() {
            return Vec::new();
        }
        let step = MusicalTime::BEAT.divided_by(pattern.len() as u64);
        let root = (triad.degree - 1) as usize;
        let octave = CHORD_OCTAVE + arpeggio.layer.octave_shift;

        pattern
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree >= 1)
            .map(|(i, &degree)| {
                let pitch = self.harmony.scale.pitch(root + degree as usize - 1, octave);
                note(arpeggio.layer, vec![pitch], onset + step.times(i as u64), Some(step))
            })
            .collect()
    }

    fn melody(&self, melody: MelodyLayer, contour: &[i64], onset: MusicalTime) -> Vec<InstrumentNote> {
        if contour.is_empty() {
            return Vec::new();
        }
        let unit = MusicalTime::MEASURE.divided_by(contour.len() as u64);
        let octave = MELODY_OCTAVE + melody.layer.octave_shift;

        let mut notes = Vec::new();
        let mut start = 0usize;
        while start < contour.len() {
            let value = contour[start];
            let run = contour[start..].iter().take_while(|&&v| v == value).count();
            if value >= 1 {
                let index = (value - 1).min(MAX_DEGREE_INDEX) as usize;
                let pitch = self.harmony.scale.pitch(index, octave);
                let mut pitches = vec![pitch];
                if melody.double_below {
                    pitches.push(shift(pitch, -12));
                }
                notes.push(note(
                    melody.layer,
                    pitches,
                    onset + unit.times(start as u64),
                    Some(unit.times(run as u64)),
                ));
            }
            start += run;
        }
        notes
    }
}

fn pad(layer: Layer, triad: &Triad, onset: MusicalTime, duration: Option<MusicalTime>) -> InstrumentNote {
    let offset = 12 * layer.octave_shift;
    let [root, third, fifth] = triad.notes;
    let pitches = vec![shift(root, offset), shift(third, offset), shift(fifth, offset + 12)];
    note(layer, pitches, onset, duration)
}

fn note(layer: Layer, pitches: Vec<u8>, onset: MusicalTime, duration: Option<MusicalTime>) -> InstrumentNote {
    InstrumentNote {
        instrument: layer.instrument,
        pitches,
        duration,
        onset,
        velocity: layer.volume,
    }
}

fn shift(pitch: u8, semitones: i32) -> u8 {
    (pitch as i32 + semitones).clamp(0, 127) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InstrumentId;
    use crate::compose::preset::PresetTag;
    use crate::theory::{Mode, PitchName, Tonality};

    fn harmony(degrees: &[i64]) -> Harmony {
        let tonic: PitchName = "C".parse().unwrap();
        Harmony::resolve(Tonality::new(tonic, Mode::Ionian), degrees)
    }

    fn main_slot(measure: u64, chord: usize) -> Slot {
        Slot {
            measure,
            chord,
            section: Section::Main,
        }
    }

    fn of(notes: &[InstrumentNote], instrument: InstrumentId) -> Vec<&InstrumentNote> {
        notes.iter().filter(|n| n.instrument == instrument).collect()
    }

    #[test]
    fn rest_slots_are_silent() {
        let h = harmony(&[1, 0]);
        let melodies = vec![vec![1, 2], vec![3, 4]];
        let voicer = Voicer::new(Preset::for_tag(PresetTag::Upbeat), &h, &melodies, Seed(1));
        assert!(voicer.voice_slot(main_slot(2, 1)).is_empty());
        assert!(!voicer.voice_slot(main_slot(1, 0)).is_empty());
    }

    #[test]
    fn bass_sits_an_octave_under_the_chord() {
        let h = harmony(&[5]);
        let voicer = Voicer::new(Preset::for_tag(PresetTag::Melancholic), &h, &[], Seed(9));
        let notes = voicer.voice_slot(main_slot(3, 0));
        let bass = of(&notes, InstrumentId::Bass);
        assert!(!bass.is_empty());
        // G3 = 55, so the bass plays G2.
        assert!(bass.iter().all(|n| n.pitches == [43]));
        assert_eq!(bass[0].onset, MusicalTime::measures(3));

        let total = bass
            .iter()
            .map(|n| n.duration.unwrap())
            .fold(MusicalTime::ZERO, |a, b| a + b);
        assert!(total <= MusicalTime::MEASURE);
    }

    #[test]
    fn bass_pattern_is_a_function_of_mood_and_measure() {
        let h = harmony(&[1]);
        let a = Voicer::new(Preset::for_tag(PresetTag::Serene), &h, &[], Seed::from_mood(0.2, 0.7));
        let b = Voicer::new(Preset::for_tag(PresetTag::Serene), &h, &[], Seed::from_mood(0.2, 0.7));
        for measure in 0..32 {
            assert_eq!(a.bass_pattern(measure), b.bass_pattern(measure));
        }
        let used: std::collections::HashSet<usize> = (0..64).map(|m| a.bass_pattern(m)).collect();
        assert!(used.len() > 1);
    }

    #[test]
    fn pad_lifts_the_fifth() {
        let h = harmony(&[1]);
        let voicer = Voicer::new(Preset::for_tag(PresetTag::Melancholic), &h, &[], Seed(0));
        let notes = voicer.voice_slot(main_slot(1, 0));
        let pad = of(&notes, InstrumentId::ElectricPiano);
        assert_eq!(pad.len(), 1);
        assert_eq!(pad[0].pitches, [48, 52, 67]);
        assert_eq!(pad[0].duration, Some(MusicalTime::MEASURE));
        assert_eq!(pad[0].velocity, 0.45);
    }

    #[test]
    fn arpeggio_fits_in_the_first_beat() {
        let h = harmony(&[2]);
        let voicer = Voicer::new(Preset::for_tag(PresetTag::Restless), &h, &[], Seed(0));
        let notes = voicer.voice_slot(main_slot(1, 0));
        let arp = of(&notes, InstrumentId::Pluck);
        assert_eq!(arp.len(), 4);
        // D dorian degrees 1, 3, 5, 8 from D4.
        let pitches: Vec<u8> = arp.iter().map(|n| n.pitches[0]).collect();
        assert_eq!(pitches, [62, 65, 69, 74]);
        assert_eq!(arp[3].onset, MusicalTime::measures(1) + MusicalTime::new(3, 16));
        assert!(arp.iter().all(|n| n.duration == Some(MusicalTime::SIXTEENTH)));
    }

    #[test]
    fn melody_merges_repeated_values_and_skips_silence() {
        let h = harmony(&[1]);
        let melodies = vec![vec![1, 1, 0, 5]];
        let voicer = Voicer::new(Preset::for_tag(PresetTag::Melancholic), &h, &melodies, Seed(0));
        let notes = voicer.voice_slot(main_slot(4, 0));
        let melody = of(&notes, InstrumentId::Piano);
        assert_eq!(melody.len(), 2);
        assert_eq!(melody[0].pitches, [60]);
        assert_eq!(melody[0].duration, Some(MusicalTime::HALF));
        assert_eq!(melody[1].pitches, [67]);
        assert_eq!(melody[1].onset, MusicalTime::measures(4) + MusicalTime::new(3, 4));
    }

    #[test]
    fn doubled_melody_adds_the_lower_octave() {
        let h = harmony(&[1]);
        let melodies = vec![vec![3]];
        let voicer = Voicer::new(Preset::for_tag(PresetTag::Upbeat), &h, &melodies, Seed(0));
        let notes = voicer.voice_slot(main_slot(1, 0));
        let melody = of(&notes, InstrumentId::Piano);
        assert_eq!(melody[0].pitches, [64, 52]);
    }

    #[test]
    fn huge_melody_degrees_saturate() {
        let h = harmony(&[1]);
        let melodies = vec![vec![1_000_000_000_000, i64::MAX, i64::MIN, 8]];
        let voicer = Voicer::new(Preset::for_tag(PresetTag::Upbeat), &h, &melodies, Seed(0));
        let notes = voicer.voice_slot(main_slot(1, 0));
        let melody = of(&notes, InstrumentId::Piano);
        assert_eq!(melody.len(), 3);
        assert_eq!(melody[0].pitches, [127, 115]);
        assert_eq!(melody[1].pitches, [127, 115]);
        assert_eq!(melody[2].pitches, [72, 60]);
        assert!(notes.iter().flat_map(|n| &n.pitches).all(|&p| p <= 127));
    }

    #[test]
    fn outro_plays_bass_and_pad_only() {
        let h = harmony(&[1]);
        let melodies = vec![vec![1, 2, 3]];
        let voicer = Voicer::new(Preset::for_tag(PresetTag::Upbeat), &h, &melodies, Seed(0));
        let slot = Slot {
            measure: 25,
            chord: 0,
            section: Section::Outro,
        };
        let notes = voicer.voice_slot(slot);
        assert!(notes
            .iter()
            .all(|n| n.instrument == InstrumentId::Bass || n.instrument == InstrumentId::ElectricPiano));
    }

    #[test]
    fn tail_holds_the_tonic_to_the_end() {
        let h = harmony(&[4, 5]);
        let voicer = Voicer::new(Preset::for_tag(PresetTag::Serene), &h, &[], Seed(0));
        let tail = voicer.tail(MusicalTime::measures(29)).unwrap();
        assert_eq!(tail.instrument, InstrumentId::Pad);
        assert_eq!(tail.pitches, [48, 52, 67]);
        assert_eq!(tail.duration, None);
    }
}
