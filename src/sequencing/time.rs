//! Musical position or length, measured in 4/4 measures, as an exact reduced
//! fraction. Tracks are built entirely in this unit so that every note lands
//! on an exact subdivision. Seconds and frames only appear at render time.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const BEATS_PER_MEASURE: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MusicalTime {
    numerator: u64,
    denominator: u64,
}

impl MusicalTime {
    pub const ZERO: MusicalTime = MusicalTime::new(0, 1);
    pub const MEASURE: MusicalTime = MusicalTime::new(1, 1);
    pub const HALF: MusicalTime = MusicalTime::new(1, 2);
    pub const BEAT: MusicalTime = MusicalTime::new(1, 4);
    pub const EIGHTH: MusicalTime = MusicalTime::new(1, 8);
    pub const SIXTEENTH: MusicalTime = MusicalTime::new(1, 16);

    /// `numerator / denominator` measures, reduced. A zero denominator is
    /// treated as one.
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        let denominator = if denominator == 0 { 1 } else { denominator };
        let gcd = const_gcd(numerator, denominator);
        MusicalTime {
            numerator: numerator / gcd,
            denominator: denominator / gcd,
        }
    }

    pub const fn measures(count: u64) -> Self {
        MusicalTime::new(count, 1)
    }

    pub const fn numerator(self) -> u64 {
        self.numerator
    }

    pub const fn denominator(self) -> u64 {
        self.denominator
    }

    pub const fn is_zero(self) -> bool {
        self.numerator == 0
    }

    pub const fn times(self, factor: u64) -> Self {
        MusicalTime::new(self.numerator * factor, self.denominator)
    }

    pub const fn divided_by(self, parts: u64) -> Self {
        MusicalTime::new(self.numerator, self.denominator * parts)
    }

    pub fn as_measures(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    pub fn as_beats(self) -> f64 {
        self.as_measures() * BEATS_PER_MEASURE as f64
    }

    /// Wall-clock seconds at a straight (unswung) tempo.
    pub fn to_seconds(self, bpm: f64) -> f64 {
        self.as_beats() * 60.0 / bpm
    }

    /// Whole measures contained, rounding down.
    pub fn whole_measures(self) -> u64 {
        self.numerator / self.denominator
    }
}

impl Add for MusicalTime {
    type Output = MusicalTime;

    fn add(self, other: Self) -> Self {
        MusicalTime::new(
            self.numerator * other.denominator + other.numerator * self.denominator,
            self.denominator * other.denominator,
        )
    }
}

/// Saturates at zero.
impl Sub for MusicalTime {
    type Output = MusicalTime;

    fn sub(self, other: Self) -> Self {
        let left = self.numerator * other.denominator;
        let right = other.numerator * self.denominator;
        MusicalTime::new(left.saturating_sub(right), self.denominator * other.denominator)
    }
}

impl Ord for MusicalTime {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = self.numerator as u128 * other.denominator as u128;
        let right = other.numerator as u128 * self.denominator as u128;
        left.cmp(&right)
    }
}

impl PartialOrd for MusicalTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for MusicalTime {
    fn default() -> Self {
        MusicalTime::ZERO
    }
}

impl fmt::Display for MusicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl FromStr for MusicalTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u64>()
                .map_err(|_| format!("`{s}` is not a measure fraction"))
        };
        match s.split_once('/') {
            Some((n, d)) => {
                let d = parse(d)?;
                if d == 0 {
                    return Err(format!("`{s}` has a zero denominator"));
                }
                Ok(MusicalTime::new(parse(n)?, d))
            }
            None => Ok(MusicalTime::measures(parse(s)?)),
        }
    }
}

impl From<MusicalTime> for String {
    fn from(time: MusicalTime) -> Self {
        time.to_string()
    }
}

impl TryFrom<String> for MusicalTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

const fn const_gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let temp = b;
        b = a % b;
        a = temp;
    }
    if a == 0 {
        1
    } else {
        a
    }
}
