use crate::theory::{Chord, Scale, Tonality, Triad};

/// The scale, its diatonic triads and the resolved chord for every slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Harmony {
    pub tonality: Tonality,
    pub scale: Scale,
    pub triads: Vec<Triad>,
    pub chords: Vec<Chord>,
}

impl Harmony {
    /// Resolve each chord degree against `tonality`. Degrees outside 1..=7
    /// become [`Chord::Rest`].
    pub fn resolve(tonality: Tonality, degrees: &[i64]) -> Self {
        let scale = tonality.scale();
        let triads: Vec<Triad> = (1..=7).filter_map(|d| Triad::diatonic(&scale, d)).collect();

        let chords = degrees
            .iter()
            .map(|&degree| {
                u8::try_from(degree)
                    .ok()
                    .and_then(|d| triads.iter().find(|t| t.degree == d))
                    .map(|triad| Chord::Triad(triad.clone()))
                    .unwrap_or(Chord::Rest)
            })
            .collect();

        Self {
            tonality,
            scale,
            triads,
            chords,
        }
    }

    pub fn tonic_triad(&self) -> Option<&Triad> {
        self.triads.first()
    }

    pub fn slot_count(&self) -> usize {
        self.chords.len()
    }

    pub fn is_rest(&self, slot: usize) -> bool {
        self.chords.get(slot).map_or(true, Chord::is_rest)
    }
}
