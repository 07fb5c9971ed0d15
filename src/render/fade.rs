use std::time::Duration;

/// How far below baseline every voice sits when the track ends.
pub const FADE_DEPTH_DB: f32 = 60.0;

/// How often, in track time, the transport recomputes the fade.
pub const MAINTENANCE_INTERVAL: Duration = Duration::from_millis(100);

/// A linear-in-dB fade over the last `length` seconds of a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeOut {
    start: f64,
    end: f64,
    depth_db: f32,
}

impl FadeOut {
    /// Fade covering the last `fade_seconds` of `duration`. A fade longer
    /// than the track starts at zero.
    pub fn new(duration: f64, fade_seconds: f64) -> Self {
        let end = duration.max(0.0);
        let start = (end - fade_seconds.max(0.0)).max(0.0);
        Self {
            start,
            end,
            depth_db: FADE_DEPTH_DB,
        }
    }

    pub fn start_seconds(&self) -> f64 {
        self.start
    }

    /// Attenuation in dB at track time `t`. Zero before the window, then
    /// rising linearly to the full depth at the end.
    pub fn offset_db(&self, t: f64) -> f32 {
        if t <= self.start {
            return 0.0;
        }
        let span = self.end - self.start;
        if span <= 0.0 {
            return self.depth_db;
        }
        let progress = ((t - self.start) / span).clamp(0.0, 1.0);
        self.depth_db * progress as f32
    }
}
