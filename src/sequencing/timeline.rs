//! Generic ordered event list.
//!
//! A `Timeline` holds `(time, action)` pairs in musical time. It knows
//! nothing about what the actions do: the render transport fills one with
//! loop and note triggers, tests fill one with plain markers. `Groove` maps
//! musical time to wall-clock time at a tempo, with optional swing.

use super::time::MusicalTime;

/// Where the off-beat eighth lands inside a swung beat.
pub const SWING_OFFBEAT: f64 = 2.0 / 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent<A> {
    pub at: MusicalTime,
    pub action: A,
}

/// An event placed on the sample clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEvent<A> {
    pub frame: u64,
    pub action: A,
}

#[derive(Debug, Clone)]
pub struct Timeline<A> {
    events: Vec<TimedEvent<A>>,
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<A> Timeline<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at: MusicalTime, action: A) {
        self.events.push(TimedEvent { at, action });
    }

    /// Sort by time, then by `rank` for events sharing a time. Stable, so
    /// equal-ranked events keep insertion order.
    pub fn sort_by_rank<F>(&mut self, rank: F)
    where
        F: Fn(&A) -> u8,
    {
        self.events
            .sort_by(|a, b| a.at.cmp(&b.at).then_with(|| rank(&a.action).cmp(&rank(&b.action))));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedEvent<A>> {
        self.events.iter()
    }

    /// Place every event on the sample clock. Warping is monotonic, so the
    /// sorted order carries over unchanged.
    pub fn to_frames(&self, groove: &Groove, sample_rate: u32) -> Vec<FrameEvent<A>>
    where
        A: Clone,
    {
        self.events
            .iter()
            .map(|event| FrameEvent {
                frame: groove.frame(event.at, sample_rate),
                action: event.action.clone(),
            })
            .collect()
    }
}

/// Tempo plus swing feel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Groove {
    pub bpm: f64,
    pub swing: bool,
}

impl Groove {
    pub fn new(bpm: f64, swing: bool) -> Self {
        Self { bpm, swing }
    }

    pub fn straight(bpm: f64) -> Self {
        Self::new(bpm, false)
    }

    /// Position in beats after swing.
    ///
    /// With swing, the first half of each beat is stretched over
    /// `[0, SWING_OFFBEAT)` and the second half squeezed into the rest, so a
    /// pair of eighths plays long-short. Beat boundaries never move.
    pub fn warp(&self, at: MusicalTime) -> f64 {
        let beats = at.as_beats();
        if !self.swing {
            return beats;
        }
        let whole = beats.floor();
        let frac = beats - whole;
        let warped = if frac < 0.5 {
            frac * 2.0 * SWING_OFFBEAT
        } else {
            SWING_OFFBEAT + (frac - 0.5) * 2.0 * (1.0 - SWING_OFFBEAT)
        };
        whole + warped
    }

    pub fn seconds(&self, at: MusicalTime) -> f64 {
        self.warp(at) * 60.0 / self.bpm
    }

    pub fn frame(&self, at: MusicalTime, sample_rate: u32) -> u64 {
        (self.seconds(at) * sample_rate as f64).round() as u64
    }
}
