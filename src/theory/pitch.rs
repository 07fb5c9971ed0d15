/*
Pitch Names
===========

A pitch name is a letter plus an accidental count: C, C#, Db, Bbb. Two names
can share a pitch class (C# and Db) while implying different key signatures,
which is why names are kept spelled rather than collapsed to 0..12.

Circle of fifths position
-------------------------

Every spelled name sits at a fixed position on the line of fifths:

    ... Bb  F  C  G  D  A  E  B  F# C# G# ...
        -2 -1  0  1  2  3  4  5  6  7  8

    fifths(letter, accidental) = LETTER_FIFTHS[letter] + 7 * accidental

The key signature of a major key has |fifths(tonic)| accidentals, which makes
key-signature comparisons a subtraction instead of a table lookup.

MIDI
----

    midi = 12 * (octave + 1) + natural_pc(letter) + accidental

so C4 = 60 and A4 = 69 (the A440 reference).
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Pitch class of the unaltered letter.
    pub fn natural_pc(self) -> i32 {
        [0, 2, 4, 5, 7, 9, 11][self.index()]
    }

    fn fifths(self) -> i32 {
        [0, 2, 4, -1, 1, 3, 5][self.index()]
    }

    /// The letter `steps` positions above this one (wrapping B -> C).
    pub fn offset(self, steps: usize) -> Letter {
        Letter::ALL[(self.index() + steps) % 7]
    }

    fn as_char(self) -> char {
        ['C', 'D', 'E', 'F', 'G', 'A', 'B'][self.index()]
    }

    fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }
}

/// A spelled pitch without octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PitchName {
    pub letter: Letter,
    /// Positive = sharps, negative = flats.
    pub accidental: i8,
}

/// Input key numbers 1..=12 map onto this table (sharps spelling).
const KEY_TABLE: [PitchName; 12] = [
    PitchName::new(Letter::C, 0),
    PitchName::new(Letter::C, 1),
    PitchName::new(Letter::D, 0),
    PitchName::new(Letter::D, 1),
    PitchName::new(Letter::E, 0),
    PitchName::new(Letter::F, 0),
    PitchName::new(Letter::F, 1),
    PitchName::new(Letter::G, 0),
    PitchName::new(Letter::G, 1),
    PitchName::new(Letter::A, 0),
    PitchName::new(Letter::A, 1),
    PitchName::new(Letter::B, 0),
];

impl PitchName {
    pub const fn new(letter: Letter, accidental: i8) -> Self {
        Self { letter, accidental }
    }

    /// Look up the tonic for an input key number (1 = C ... 12 = B).
    pub fn from_key_number(key: i64) -> Option<Self> {
        if (1..=12).contains(&key) {
            Some(KEY_TABLE[(key - 1) as usize])
        } else {
            None
        }
    }

    pub fn pitch_class(self) -> u8 {
        (self.letter.natural_pc() + self.accidental as i32).rem_euclid(12) as u8
    }

    /// Position on the line of fifths (C = 0, G = 1, F = -1, ...).
    pub fn fifths(self) -> i32 {
        self.letter.fifths() + 7 * self.accidental as i32
    }

    /// The same pitch class spelled with the neighbouring letter.
    ///
    /// Sharps move up a letter (C# -> Db), flats move down (Db -> C#), and
    /// naturals are their own equivalent.
    pub fn enharmonic(self) -> Self {
        let letter = match self.accidental.signum() {
            1 => self.letter.offset(1),
            -1 => self.letter.offset(6),
            _ => return self,
        };
        let mut accidental = self.pitch_class() as i32 - letter.natural_pc();
        if accidental > 6 {
            accidental -= 12;
        } else if accidental < -6 {
            accidental += 12;
        }
        Self::new(letter, accidental as i8)
    }

    /// MIDI note number at the given octave (C4 = 60).
    pub fn midi(self, octave: i32) -> u8 {
        let note = 12 * (octave + 1) + self.letter.natural_pc() + self.accidental as i32;
        note.clamp(0, 127) as u8
    }
}

impl fmt::Display for PitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        let symbol = if self.accidental > 0 { "#" } else { "b" };
        for _ in 0..self.accidental.unsigned_abs() {
            f.write_str(symbol)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePitchError(String);

impl fmt::Display for ParsePitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a pitch name", self.0)
    }
}

impl std::error::Error for ParsePitchError {}

impl FromStr for PitchName {
    type Err = ParsePitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = chars
            .next()
            .and_then(Letter::from_char)
            .ok_or_else(|| ParsePitchError(s.to_string()))?;
        let mut accidental: i8 = 0;
        for c in chars {
            match c {
                '#' => accidental += 1,
                'b' => accidental -= 1,
                _ => return Err(ParsePitchError(s.to_string())),
            }
        }
        Ok(Self::new(letter, accidental))
    }
}

impl From<PitchName> for String {
    fn from(name: PitchName) -> Self {
        name.to_string()
    }
}

impl TryFrom<String> for PitchName {
    type Error = ParsePitchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PitchName {
        s.parse().unwrap()
    }

    #[test]
    fn key_table_uses_sharps() {
        assert_eq!(PitchName::from_key_number(1), Some(name("C")));
        assert_eq!(PitchName::from_key_number(2), Some(name("C#")));
        assert_eq!(PitchName::from_key_number(12), Some(name("B")));
        assert_eq!(PitchName::from_key_number(0), None);
        assert_eq!(PitchName::from_key_number(13), None);
    }

    #[test]
    fn enharmonics_swap_spelling() {
        assert_eq!(name("C#").enharmonic(), name("Db"));
        assert_eq!(name("Db").enharmonic(), name("C#"));
        assert_eq!(name("A#").enharmonic(), name("Bb"));
        assert_eq!(name("E#").enharmonic(), name("F"));
        assert_eq!(name("G").enharmonic(), name("G"));
    }

    #[test]
    fn fifths_positions() {
        assert_eq!(name("C").fifths(), 0);
        assert_eq!(name("F#").fifths(), 6);
        assert_eq!(name("Gb").fifths(), -6);
        assert_eq!(name("Bb").fifths(), -2);
    }

    #[test]
    fn midi_numbers() {
        assert_eq!(name("C").midi(4), 60);
        assert_eq!(name("A").midi(4), 69);
        assert_eq!(name("Cb").midi(4), 59);
        assert_eq!(name("C#").midi(3), 49);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for s in ["C", "F#", "Bb", "Ebb", "G##"] {
            assert_eq!(name(s).to_string(), s);
        }
        assert!("H".parse::<PitchName>().is_err());
        assert!("C+".parse::<PitchName>().is_err());
    }
}
