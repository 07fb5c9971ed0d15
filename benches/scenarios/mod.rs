//! End-to-end scenarios: full instrument pools, composing a track and
//! rendering one.

mod compose;
mod instruments;
mod render;

pub use compose::bench_compose;
pub use instruments::bench_instruments;
pub use render::bench_render;

use moodtrack::Parameters;

/// A typical four-chord request.
pub fn parameters() -> Parameters {
    Parameters {
        title: None,
        key: 10,
        mode: 6,
        bpm: 84.0,
        energy: 0.65,
        valence: 0.35,
        swing: 0.7,
        chords: vec![1, 6, 3, 7],
        melodies: vec![vec![5, 4, 3, 3], vec![1, 0, 2, 3], vec![5, 5, 5, 0], vec![2, 1]],
    }
}
