//! Composition: parameter vector in, fully timed [`Track`] out.
//!
//! Every stage is pure and synchronous. The only randomness comes from the
//! [`Seed`] handed to [`Composer::compose_with_seed`], which
//! [`Composer::compose`] derives from energy and valence.

pub mod arrangement;
pub mod color;
pub mod harmony;
pub mod params;
pub mod preset;
pub mod selector;
pub mod track;
pub mod voicing;

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::catalog::{Catalog, InstrumentId};
use crate::error::{Error, Result};
use crate::prng::Seed;
use crate::sequencing::MusicalTime;

pub use arrangement::{Arrangement, Section, Slot, Window};
pub use harmony::Harmony;
pub use params::{Normalized, Parameters};
pub use preset::{classify, Preset, PresetTag};
pub use selector::{SampleSelection, Selection};
pub use track::{InstrumentNote, SampleLoop, Track};
pub use voicing::Voicer;

/// A composed track plus the recoverable problems met on the way.
#[derive(Debug)]
pub struct Composition {
    pub track: Track,
    /// `MissingSampleGroup` warnings for layers that were left out.
    pub warnings: Vec<Error>,
}

#[derive(Debug, Clone)]
pub struct Composer {
    catalog: Arc<Catalog>,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(Arc::new(Catalog::builtin()))
    }
}

impl Composer {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Compose with the seed keyed by the normalized mood.
    pub fn compose(&self, parameters: &Parameters) -> Result<Composition> {
        let normalized = parameters.normalize()?;
        let seed = Seed::from_mood(normalized.energy(), normalized.valence());
        self.compose_normalized(parameters, &normalized, seed)
    }

    pub fn compose_with_seed(&self, parameters: &Parameters, seed: Seed) -> Result<Composition> {
        let normalized = parameters.normalize()?;
        self.compose_normalized(parameters, &normalized, seed)
    }

    #[instrument(skip_all, fields(bpm = normalized.bpm, key = %normalized.tonality, seed = seed.0))]
    fn compose_normalized(&self, raw: &Parameters, normalized: &Normalized, seed: Seed) -> Result<Composition> {
        let harmony = Harmony::resolve(normalized.tonality, normalized.chords());
        let arrangement = Arrangement::plan(&harmony.chords);
        let selection = selector::select(
            &self.catalog,
            normalized.bpm,
            normalized.valence(),
            normalized.tonality.mode,
            seed,
        );
        let preset = Preset::for_mood(normalized.valence(), normalized.energy());
        debug!(
            preset = ?preset.tag,
            slots = arrangement.slots_per_pass,
            repeats = arrangement.repeats,
            windows = arrangement.rhythm_windows.len(),
            "arrangement planned"
        );

        let length = arrangement.length();
        let mut samples = Vec::new();
        let mut loops = Vec::new();

        if let Some(ambience) = selection.ambience {
            loops.push(SampleLoop {
                group: ambience.group.clone(),
                index: ambience.index,
                start: MusicalTime::ZERO,
                stop: length,
            });
            samples.push(ambience);
        }
        if let Some(rhythm) = selection.rhythm {
            loops.extend(arrangement.rhythm_windows.iter().map(|w| SampleLoop {
                group: rhythm.group.clone(),
                index: rhythm.index,
                start: w.start,
                stop: w.stop,
            }));
            samples.push(rhythm);
        }
        loops.sort_by_key(|lp| lp.start);

        let voicer = Voicer::new(preset, &harmony, &normalized.parameters.melodies, seed);
        let mut notes: Vec<InstrumentNote> = arrangement.slots().flat_map(|slot| voicer.voice_slot(slot)).collect();
        notes.extend(voicer.tail(MusicalTime::measures(arrangement.tail_start())));
        notes.sort_by_key(|note| note.onset);

        let mut instruments: Vec<InstrumentId> = Vec::new();
        for note in &notes {
            if !instruments.contains(&note.instrument) {
                instruments.push(note.instrument);
            }
        }

        let tonic = normalized.tonality.tonic;
        let mode = normalized.tonality.mode_name().to_string();
        let title = raw
            .title
            .clone()
            .unwrap_or_else(|| format!("{tonic} {mode} lofi"));

        let track = Track {
            title,
            bpm: normalized.bpm,
            swing: normalized.swing,
            tonic,
            mode,
            measures: arrangement.total_measures,
            samples,
            loops,
            instruments,
            notes,
            color: color::mood_color(normalized.energy(), normalized.valence()),
            parameters: raw.clone(),
        };
        track.validate(&self.catalog)?;

        info!(
            title = %track.title,
            measures = track.measures,
            notes = track.notes.len(),
            loops = track.loops.len(),
            warnings = selection.warnings.len(),
            "track composed"
        );

        Ok(Composition {
            track,
            warnings: selection.warnings,
        })
    }
}
