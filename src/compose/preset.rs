//! Mood presets: which layers play, on what, and how loud.
//!
//! Presets are a static table indexed by a pure quadrant classifier, so each
//! one can be inspected and tested on its own.

use serde::Serialize;

use crate::catalog::InstrumentId;

/// Quadrant boundary on both axes.
pub const MOOD_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetTag {
    /// Low valence, low energy.
    Melancholic,
    /// Low valence, high energy.
    Restless,
    /// High valence, low energy.
    Serene,
    /// High valence, high energy.
    Upbeat,
}

pub fn classify(valence: f64, energy: f64) -> PresetTag {
    match (valence >= MOOD_THRESHOLD, energy >= MOOD_THRESHOLD) {
        (false, false) => PresetTag::Melancholic,
        (false, true) => PresetTag::Restless,
        (true, false) => PresetTag::Serene,
        (true, true) => PresetTag::Upbeat,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub instrument: InstrumentId,
    /// Whole octaves added to the layer's base octave.
    pub octave_shift: i32,
    /// Note velocity, 0..=1.
    pub volume: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArpeggioLayer {
    pub layer: Layer,
    /// Scale degrees counted from the chord root (1 = root).
    pub pattern: &'static [u8],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MelodyLayer {
    pub layer: Layer,
    pub double_below: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub tag: PresetTag,
    pub bass: Option<Layer>,
    pub pad: Option<Layer>,
    pub arpeggio: Option<ArpeggioLayer>,
    pub melody: Option<MelodyLayer>,
}

const fn layer(instrument: InstrumentId, octave_shift: i32, volume: f32) -> Layer {
    Layer {
        instrument,
        octave_shift,
        volume,
    }
}

pub const PRESETS: [Preset; 4] = [
    Preset {
        tag: PresetTag::Melancholic,
        bass: Some(layer(InstrumentId::Bass, 0, 0.55)),
        pad: Some(layer(InstrumentId::ElectricPiano, 0, 0.45)),
        arpeggio: None,
        melody: Some(MelodyLayer {
            layer: layer(InstrumentId::Piano, 0, 0.6),
            double_below: false,
        }),
    },
    Preset {
        tag: PresetTag::Restless,
        bass: Some(layer(InstrumentId::Bass, 0, 0.7)),
        pad: Some(layer(InstrumentId::Pad, 0, 0.4)),
        arpeggio: Some(ArpeggioLayer {
            layer: layer(InstrumentId::Pluck, 1, 0.35),
            pattern: &[1, 3, 5, 8],
        }),
        melody: Some(MelodyLayer {
            layer: layer(InstrumentId::Lead, 0, 0.45),
            double_below: true,
        }),
    },
    Preset {
        tag: PresetTag::Serene,
        bass: Some(layer(InstrumentId::Bass, 0, 0.5)),
        pad: Some(layer(InstrumentId::Pad, 0, 0.5)),
        arpeggio: Some(ArpeggioLayer {
            layer: layer(InstrumentId::Pluck, 1, 0.3),
            pattern: &[1, 5, 8],
        }),
        melody: Some(MelodyLayer {
            layer: layer(InstrumentId::ElectricPiano, 1, 0.5),
            double_below: false,
        }),
    },
    Preset {
        tag: PresetTag::Upbeat,
        bass: Some(layer(InstrumentId::Bass, 0, 0.75)),
        pad: Some(layer(InstrumentId::ElectricPiano, 0, 0.4)),
        arpeggio: Some(ArpeggioLayer {
            layer: layer(InstrumentId::Pluck, 1, 0.4),
            pattern: &[1, 3, 5, 3],
        }),
        melody: Some(MelodyLayer {
            layer: layer(InstrumentId::Piano, 0, 0.6),
            double_below: true,
        }),
    },
];

impl Preset {
    pub fn for_tag(tag: PresetTag) -> &'static Preset {
        match tag {
            PresetTag::Melancholic => &PRESETS[0],
            PresetTag::Restless => &PRESETS[1],
            PresetTag::Serene => &PRESETS[2],
            PresetTag::Upbeat => &PRESETS[3],
        }
    }

    pub fn for_mood(valence: f64, energy: f64) -> &'static Preset {
        Self::for_tag(classify(valence, energy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrants() {
        assert_eq!(classify(0.2, 0.2), PresetTag::Melancholic);
        assert_eq!(classify(0.2, 0.9), PresetTag::Restless);
        assert_eq!(classify(0.9, 0.1), PresetTag::Serene);
        assert_eq!(classify(0.5, 0.5), PresetTag::Upbeat);
    }

    #[test]
    fn table_is_indexed_by_tag() {
        for preset in &PRESETS {
            assert_eq!(Preset::for_tag(preset.tag), preset);
        }
    }

    #[test]
    fn every_preset_can_play_the_outro() {
        // Outro and tail rely on bass and pad.
        for preset in &PRESETS {
            assert!(preset.bass.is_some() && preset.pad.is_some(), "{:?}", preset.tag);
        }
    }

    #[test]
    fn volumes_are_velocities() {
        for preset in &PRESETS {
            let layers = [
                preset.bass,
                preset.pad,
                preset.arpeggio.map(|a| a.layer),
                preset.melody.map(|m| m.layer),
            ];
            for layer in layers.into_iter().flatten() {
                assert!((0.0..=1.0).contains(&layer.volume));
            }
        }
    }
}
