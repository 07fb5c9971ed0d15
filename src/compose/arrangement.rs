/*
Arrangement
===========

Every chord slot lasts one measure. With n slots:

    | intro |  main: n × r measures                    | outro     | tail |
    |   1   |  rep 0  |  rep 1  | ... |  rep r-1       | min(n, 4) |  1   |

where r is the smallest repeat count with n × r >= 24.

Drum loop windows
-----------------

Each repetition of the main region starts its loop p measures late
(p = 1 for n <= 8, else 2). Inside a repetition the loop runs to the end,
except the last repetition, which also stops p measures early. A rest
chord closes the window at its slot; the next non-rest slot reopens it.

    n = 4, p = 1, chords [I, rest, V, I]

    rep k:    | I  | -- | V  | I  |
    loop:     .....      [=========)        window starts at slot 2
    rep r-1:  | I  | -- | V  | I  |
    loop:     .....      [====)             stops p early
*/

use crate::sequencing::MusicalTime;
use crate::theory::Chord;

pub const INTRO_MEASURES: u64 = 1;
pub const MIN_MAIN_MEASURES: u64 = 24;
pub const MAX_OUTRO_SLOTS: u64 = 4;
pub const TAIL_MEASURES: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Main,
    Outro,
}

/// One measure-long chord slot placed in the arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Absolute measure the slot starts on.
    pub measure: u64,
    /// Index into the chord progression.
    pub chord: usize,
    pub section: Section,
}

impl Slot {
    pub fn onset(&self) -> MusicalTime {
        MusicalTime::measures(self.measure)
    }
}

/// A half-open `[start, stop)` span in measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: MusicalTime,
    pub stop: MusicalTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrangement {
    pub slots_per_pass: u64,
    pub repeats: u64,
    pub padding: u64,
    pub main_measures: u64,
    pub outro_slots: u64,
    pub total_measures: u64,
    pub rhythm_windows: Vec<Window>,
}

impl Arrangement {
    /// Lay out a progression. `chords` must not be empty.
    pub fn plan(chords: &[Chord]) -> Self {
        let n = chords.len().max(1) as u64;
        let repeats = MIN_MAIN_MEASURES.div_ceil(n);
        let main_measures = n * repeats;
        let outro_slots = n.min(MAX_OUTRO_SLOTS);
        let padding = if n <= 8 { 1 } else { 2 };
        let total_measures = INTRO_MEASURES + main_measures + outro_slots + TAIL_MEASURES;

        let rhythm_windows = rhythm_windows(chords, repeats, padding);

        Self {
            slots_per_pass: n,
            repeats,
            padding,
            main_measures,
            outro_slots,
            total_measures,
            rhythm_windows,
        }
    }

    pub fn main_start(&self) -> u64 {
        INTRO_MEASURES
    }

    pub fn outro_start(&self) -> u64 {
        INTRO_MEASURES + self.main_measures
    }

    pub fn tail_start(&self) -> u64 {
        self.outro_start() + self.outro_slots
    }

    pub fn length(&self) -> MusicalTime {
        MusicalTime::measures(self.total_measures)
    }

    /// Every main and outro slot in playing order.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        let n = self.slots_per_pass;
        let main = (0..self.main_measures).map(move |i| Slot {
            measure: INTRO_MEASURES + i,
            chord: (i % n) as usize,
            section: Section::Main,
        });
        let outro_start = self.outro_start();
        let outro = (0..self.outro_slots).map(move |i| Slot {
            measure: outro_start + i,
            chord: i as usize,
            section: Section::Outro,
        });
        main.chain(outro)
    }
}

fn rhythm_windows(chords: &[Chord], repeats: u64, padding: u64) -> Vec<Window> {
    let n = chords.len() as u64;
    let mut windows = Vec::new();

    for rep in 0..repeats {
        let rep_start = INTRO_MEASURES + rep * n;
        let first = rep_start + padding;
        let end = if rep + 1 == repeats {
            (rep_start + n).saturating_sub(padding)
        } else {
            rep_start + n
        };

        let mut open: Option<u64> = None;
        for measure in first..end {
            let rest = chords[(measure - rep_start) as usize].is_rest();
            match (open, rest) {
                (Some(start), true) => {
                    windows.push(window(start, measure));
                    open = None;
                }
                (None, false) => open = Some(measure),
                _ => {}
            }
        }
        if let Some(start) = open {
            windows.push(window(start, end));
        }
    }

    windows.retain(|w| w.stop > w.start);
    windows
}

fn window(start: u64, stop: u64) -> Window {
    Window {
        start: MusicalTime::measures(start),
        stop: MusicalTime::measures(stop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::{Mode, PitchName, Scale, Triad};

    fn progression(degrees: &[i64]) -> Vec<Chord> {
        let scale = Scale::new(PitchName::from_key_number(1).unwrap(), Mode::Ionian);
        degrees
            .iter()
            .map(|&d| match u8::try_from(d).ok().and_then(|d| Triad::diatonic(&scale, d)) {
                Some(triad) => Chord::Triad(triad),
                None => Chord::Rest,
            })
            .collect()
    }

    fn spans(arrangement: &Arrangement) -> Vec<(u64, u64)> {
        arrangement
            .rhythm_windows
            .iter()
            .map(|w| (w.start.whole_measures(), w.stop.whole_measures()))
            .collect()
    }

    #[test]
    fn four_chords_fill_twenty_four_measures() {
        let a = Arrangement::plan(&progression(&[1, 4, 5, 1]));
        assert_eq!(a.repeats, 6);
        assert_eq!(a.main_measures, 24);
        assert_eq!(a.outro_slots, 4);
        assert_eq!(a.total_measures, 1 + 24 + 4 + 1);
        assert_eq!(a.outro_start(), 25);
        assert_eq!(a.tail_start(), 29);
    }

    #[test]
    fn main_region_rounds_up_to_whole_passes() {
        let a = Arrangement::plan(&progression(&[1, 2, 3, 4, 5]));
        assert_eq!(a.repeats, 5);
        assert_eq!(a.main_measures, 25);

        let a = Arrangement::plan(&progression(&[1; 30]));
        assert_eq!(a.repeats, 1);
        assert_eq!(a.main_measures, 30);
        assert_eq!(a.padding, 2);
    }

    #[test]
    fn loop_starts_late_each_pass_and_stops_early_at_the_end() {
        let a = Arrangement::plan(&progression(&[1, 4, 5, 1]));
        let windows = spans(&a);
        assert_eq!(windows.len(), 6);
        assert_eq!(windows[0], (2, 5));
        assert_eq!(windows[1], (6, 9));
        assert_eq!(windows[5], (22, 24));
    }

    #[test]
    fn rest_chord_cuts_a_gap() {
        let a = Arrangement::plan(&progression(&[1, 0, 5, 1]));
        let windows = spans(&a);
        // Slot 1 is the rest, which is also where each pass's loop would
        // start, so the window opens at slot 2.
        assert_eq!(windows[0], (3, 5));
        for w in &a.rhythm_windows {
            for rep in 0..a.repeats {
                let rest_measure = MusicalTime::measures(1 + rep * 4 + 1);
                let inside = w.start <= rest_measure && rest_measure < w.stop;
                assert!(!inside, "rest measure covered by {w:?}");
            }
        }
    }

    #[test]
    fn rest_mid_window_closes_at_its_onset() {
        let a = Arrangement::plan(&progression(&[1, 2, 3, 0, 5, 6]));
        let windows = spans(&a);
        // Pass 0 covers measures 1..7; the loop opens at 2 and the rest in
        // slot 3 (measure 4) closes it, then slot 4 reopens it.
        assert_eq!(windows[0], (2, 4));
        assert_eq!(windows[1], (5, 7));
    }

    #[test]
    fn windows_stay_inside_main_region() {
        for degrees in [&[1][..], &[1, 0][..], &[0, 0, 0][..], &[1, 2, 3, 4, 5, 6, 7, 1, 2][..]] {
            let a = Arrangement::plan(&progression(degrees));
            for w in &a.rhythm_windows {
                assert!(w.start < w.stop);
                assert!(w.start >= MusicalTime::measures(a.main_start()));
                assert!(w.stop <= MusicalTime::measures(a.outro_start()));
            }
        }
    }

    #[test]
    fn slots_cover_main_and_outro() {
        let a = Arrangement::plan(&progression(&[1, 4, 5, 1, 6, 2]));
        let slots: Vec<Slot> = a.slots().collect();
        assert_eq!(slots.len() as u64, a.main_measures + a.outro_slots);
        assert_eq!(slots[0].measure, 1);
        assert_eq!(slots[7].chord, 1);
        let outro: Vec<usize> = slots
            .iter()
            .filter(|s| s.section == Section::Outro)
            .map(|s| s.chord)
            .collect();
        assert_eq!(outro, [0, 1, 2, 3]);
    }
}
