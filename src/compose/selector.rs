//! Sample selection: a tempo-matched drum loop and a mood-matched ambience
//! bed, each with a variant drawn from the mood seed.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{drum_loop_group, Catalog, LOOP_TEMPOS, RAIN_GROUP, VINYL_GROUP};
use crate::error::Error;
use crate::prng::Seed;
use crate::theory::Mode;

/// A chosen variant of a sample group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSelection {
    pub group: String,
    pub index: usize,
}

#[derive(Debug, Default)]
pub struct Selection {
    pub rhythm: Option<SampleSelection>,
    pub ambience: Option<SampleSelection>,
    /// One `MissingSampleGroup` per layer that had to be dropped.
    pub warnings: Vec<Error>,
}

/// Loop tempo nearest to `bpm`; ties go to the slower loop.
pub fn nearest_loop_tempo(bpm: u32) -> u32 {
    LOOP_TEMPOS
        .into_iter()
        .min_by_key(|tempo| (tempo.abs_diff(bpm), *tempo))
        .unwrap_or(bpm)
}

pub fn rhythm_group(bpm: u32) -> String {
    drum_loop_group(nearest_loop_tempo(bpm))
}

pub fn ambience_group(valence: f64, mode: Mode) -> &'static str {
    if valence < 0.5 && mode.is_minor_family() {
        RAIN_GROUP
    } else {
        VINYL_GROUP
    }
}

pub fn select(catalog: &Catalog, bpm: u32, valence: f64, mode: Mode, seed: Seed) -> Selection {
    let mut warnings = Vec::new();
    let rhythm = pick(catalog, &rhythm_group(bpm), seed, &mut warnings);
    let ambience = pick(catalog, ambience_group(valence, mode), seed, &mut warnings);
    Selection {
        rhythm,
        ambience,
        warnings,
    }
}

fn pick(catalog: &Catalog, name: &str, seed: Seed, warnings: &mut Vec<Error>) -> Option<SampleSelection> {
    match catalog.sample_group(name) {
        Ok(group) => {
            let index = seed.derive(name.as_bytes(), 0).rng().index(group.size());
            Some(SampleSelection {
                group: group.name.clone(),
                index,
            })
        }
        Err(err) => {
            warn!(group = name, "sample group missing, layer dropped");
            warnings.push(err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tempo_matching_prefers_slower_on_ties() {
        assert_eq!(nearest_loop_tempo(70), 70);
        assert_eq!(nearest_loop_tempo(75), 70);
        assert_eq!(nearest_loop_tempo(80), 80);
        assert_eq!(nearest_loop_tempo(85), 80);
        assert_eq!(nearest_loop_tempo(95), 90);
        assert_eq!(nearest_loop_tempo(100), 100);
        assert_eq!(rhythm_group(85), "drumloop80");
    }

    #[test]
    fn ambience_follows_mood() {
        assert_eq!(ambience_group(0.3, Mode::Aeolian), RAIN_GROUP);
        assert_eq!(ambience_group(0.3, Mode::Dorian), VINYL_GROUP);
        assert_eq!(ambience_group(0.8, Mode::Aeolian), VINYL_GROUP);
        assert_eq!(ambience_group(0.5, Mode::Aeolian), VINYL_GROUP);
    }

    #[test]
    fn same_mood_same_variant() {
        let catalog = Catalog::builtin();
        let seed = Seed::from_mood(0.4, 0.6);
        let a = select(&catalog, 90, 0.6, Mode::Ionian, seed);
        let b = select(&catalog, 90, 0.6, Mode::Ionian, seed);
        assert_eq!(a.rhythm, b.rhythm);
        assert_eq!(a.ambience, b.ambience);

        let rhythm = a.rhythm.unwrap();
        assert_eq!(rhythm.group, "drumloop90");
        assert!(rhythm.index < 4);
    }

    #[test]
    fn missing_group_becomes_a_warning() {
        let catalog = Catalog::builtin().without_group(RAIN_GROUP);
        let selection = select(&catalog, 70, 0.1, Mode::Aeolian, Seed(3));
        assert!(selection.rhythm.is_some());
        assert!(selection.ambience.is_none());
        assert_eq!(selection.warnings.len(), 1);
        assert!(!selection.warnings[0].is_fatal());
    }
}
