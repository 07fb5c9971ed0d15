//! Transport - sample-accurate playback of a Track
//!
//! The transport turns a Track's loops and notes into frame-stamped
//! triggers and walks the sample clock block by block, firing triggers at
//! their exact frame and running the fade maintenance every
//! [`MAINTENANCE_INTERVAL`] of track time. What a trigger *does* is up to the
//! [`Playback`] sink it drives.

use crate::compose::Track;
use crate::render::fade::{FadeOut, MAINTENANCE_INTERVAL};
use crate::sequencing::{FrameEvent, Timeline};

/// A scheduled trigger. Indices point into `Track::loops` / `Track::notes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoopStart(usize),
    LoopStop(usize),
    NoteOn(usize),
    NoteOff(usize),
}

impl Action {
    /// Ordering among actions on the same frame: stops before starts, so a
    /// window closing and reopening on one boundary ends up open.
    fn rank(&self) -> u8 {
        match self {
            Action::LoopStop(_) | Action::NoteOff(_) => 0,
            Action::LoopStart(_) | Action::NoteOn(_) => 1,
        }
    }
}

/// The receiving end of a transport.
pub trait Playback {
    fn trigger(&mut self, action: Action);

    /// Periodic housekeeping with the current fade attenuation in dB.
    fn maintain(&mut self, fade_db: f32);

    /// Add the next `out.len()` frames into `out`.
    fn render(&mut self, out: &mut [f32]);
}

/// Build the ordered trigger list for a track.
pub fn schedule(track: &Track) -> Timeline<Action> {
    let length = track.length();
    let mut timeline = Timeline::new();

    for (i, lp) in track.loops.iter().enumerate() {
        timeline.push(lp.start, Action::LoopStart(i));
        timeline.push(lp.stop, Action::LoopStop(i));
    }
    for (i, note) in track.notes.iter().enumerate() {
        timeline.push(note.onset, Action::NoteOn(i));
        timeline.push(note.release(length), Action::NoteOff(i));
    }

    timeline.sort_by_rank(Action::rank);
    timeline
}

pub struct Transport {
    /// Triggers on the sample clock, in firing order
    events: Vec<FrameEvent<Action>>,
    /// Next trigger to fire
    cursor: usize,
    /// Current position in frames
    position: u64,
    /// Total frames to run
    frame_count: u64,
    /// Maximum frames per `process` call
    block_size: usize,
    sample_rate: u32,
    fade: FadeOut,
    /// Frame of the next maintenance tick
    next_maintenance: u64,
    maintenance_frames: u64,
    running: bool,
}

impl Transport {
    pub fn new(track: &Track, sample_rate: u32, block_size: usize, fade_seconds: f64) -> Self {
        let events = schedule(track).to_frames(&track.groove(), sample_rate);
        let maintenance_frames =
            ((MAINTENANCE_INTERVAL.as_secs_f64() * sample_rate as f64).round() as u64).max(1);

        Self {
            events,
            cursor: 0,
            position: 0,
            frame_count: track.frame_count(sample_rate),
            block_size: block_size.max(1),
            sample_rate,
            fade: FadeOut::new(track.duration_seconds(), fade_seconds),
            next_maintenance: 0,
            maintenance_frames,
            running: true,
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn events(&self) -> &[FrameEvent<Action>] {
        &self.events
    }

    pub fn is_finished(&self) -> bool {
        !self.running || self.position >= self.frame_count
    }

    /// Stop and clear the schedule.
    pub fn stop(&mut self) {
        self.running = false;
        self.events.clear();
        self.cursor = 0;
    }

    /// Run one block into `out`, which must be zeroed. Returns the number of
    /// frames written, at most `block_size` and never past the end.
    pub fn process<P: Playback>(&mut self, sink: &mut P, out: &mut [f32]) -> usize {
        if self.is_finished() {
            return 0;
        }
        let remaining = (self.frame_count - self.position) as usize;
        let len = out.len().min(self.block_size).min(remaining);
        let end = self.position + len as u64;
        let block_start = self.position;

        while self.position < end {
            while let Some(event) = self.events.get(self.cursor) {
                if event.frame > self.position {
                    break;
                }
                sink.trigger(event.action);
                self.cursor += 1;
            }

            if self.position >= self.next_maintenance {
                let t = self.position as f64 / self.sample_rate as f64;
                sink.maintain(self.fade.offset_db(t));
                self.next_maintenance += self.maintenance_frames;
            }

            let next_event = self.events.get(self.cursor).map_or(u64::MAX, |e| e.frame);
            let stop = end.min(next_event).min(self.next_maintenance);
            let from = (self.position - block_start) as usize;
            let to = (stop - block_start) as usize;
            sink.render(&mut out[from..to]);
            self.position = stop;
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{Composer, Parameters};

    /// Records what it was asked to do instead of making sound.
    #[derive(Default)]
    struct Log {
        frame: u64,
        triggers: Vec<(u64, Action)>,
        fades: Vec<(u64, f32)>,
    }

    impl Playback for Log {
        fn trigger(&mut self, action: Action) {
            self.triggers.push((self.frame, action));
        }

        fn maintain(&mut self, fade_db: f32) {
            self.fades.push((self.frame, fade_db));
        }

        fn render(&mut self, out: &mut [f32]) {
            out.fill(1.0);
            self.frame += out.len() as u64;
        }
    }

    fn track(swing: f64) -> Track {
        track_with_energy(swing, 0.4)
    }

    fn track_with_energy(swing: f64, energy: f64) -> Track {
        let parameters = Parameters {
            title: None,
            key: 3,
            mode: 6,
            bpm: 90.0,
            energy,
            valence: 0.3,
            swing,
            chords: vec![1, 0, 4, 5],
            melodies: vec![vec![1, 3, 5, 3], vec![], vec![4, 4], vec![5, 0]],
        };
        Composer::default().compose(&parameters).unwrap().track
    }

    fn run(track: &Track, sample_rate: u32) -> (Log, u64) {
        let mut transport = Transport::new(track, sample_rate, 512, 4.0);
        let mut log = Log::default();
        let mut out = vec![0.0; 512];
        let mut total = 0;
        while !transport.is_finished() {
            out.fill(0.0);
            total += transport.process(&mut log, &mut out) as u64;
        }
        (log, total)
    }

    #[test]
    fn schedule_pairs_every_start_with_a_stop() {
        let t = track(0.0);
        let timeline = schedule(&t);
        assert_eq!(timeline.len(), 2 * (t.loops.len() + t.notes.len()));
        let events: Vec<_> = timeline.iter().collect();
        assert!(events.windows(2).all(|w| w[0].at <= w[1].at));
    }

    #[test]
    fn stops_fire_before_starts_on_the_same_frame() {
        let t = track(0.0);
        let mut transport = Transport::new(&t, 8_000, 256, 4.0);
        let events = transport.events().to_vec();
        for pair in events.windows(2) {
            if pair[0].frame == pair[1].frame {
                assert!(pair[0].action.rank() <= pair[1].action.rank());
            }
        }
        transport.stop();
        assert!(transport.is_finished());
        assert!(transport.events().is_empty());
    }

    #[test]
    fn runs_for_exactly_the_track_length() {
        let t = track(0.0);
        let (log, total) = run(&t, 8_000);
        assert_eq!(total, t.frame_count(8_000));
        assert_eq!(log.frame, total);
    }

    #[test]
    fn triggers_land_on_their_frames() {
        let t = track(0.0);
        let transport = Transport::new(&t, 8_000, 512, 4.0);
        let expected: Vec<(u64, Action)> = transport
            .events()
            .iter()
            .filter(|e| e.frame < t.frame_count(8_000))
            .map(|e| (e.frame, e.action))
            .collect();
        let (log, _) = run(&t, 8_000);
        assert_eq!(log.triggers, expected);
    }

    #[test]
    fn maintenance_ticks_every_100ms() {
        let t = track(0.0);
        let (log, total) = run(&t, 8_000);
        assert_eq!(log.fades[0], (0, 0.0));
        assert!(log.fades.windows(2).all(|w| w[1].0 - w[0].0 == 800));
        assert_eq!(log.fades.len() as u64, total.div_ceil(800));
    }

    #[test]
    fn fade_only_deepens() {
        let t = track(0.0);
        let (log, total) = run(&t, 8_000);
        let fade_start = total - 4 * 8_000;
        for &(frame, db) in &log.fades {
            if frame <= fade_start {
                assert_eq!(db, 0.0);
            }
        }
        assert!(log.fades.windows(2).all(|w| w[1].1 >= w[0].1));
        assert!(log.fades.last().unwrap().1 > 50.0);
    }

    #[test]
    fn swing_moves_offbeats_not_measures() {
        // High energy brings in the arpeggio, which has offbeat eighths.
        let straight = Transport::new(&track_with_energy(0.0, 0.8), 8_000, 512, 4.0);
        let swung = Transport::new(&track_with_energy(0.9, 0.8), 8_000, 512, 4.0);
        assert_eq!(straight.frame_count(), swung.frame_count());

        let loop_frames = |t: &Transport| -> Vec<u64> {
            t.events()
                .iter()
                .filter(|e| matches!(e.action, Action::LoopStart(_)))
                .map(|e| e.frame)
                .collect()
        };
        assert_eq!(loop_frames(&straight), loop_frames(&swung));
        let differs = straight
            .events()
            .iter()
            .zip(swung.events())
            .any(|(a, b)| a.frame != b.frame);
        assert!(differs);
    }
}
