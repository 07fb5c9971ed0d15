//! The asset catalog: named sample groups and instrument descriptors.
//!
//! A catalog is built once (from the built-in table, optionally overlaid by a
//! TOML file) and then shared read-only, usually behind an `Arc`. Nothing in
//! the crate mutates a catalog after construction.
//!
//! ```toml
//! [[sample_groups]]
//! name = "drumloop80"
//! files = ["drumloop80/01.wav", "drumloop80/02.wav"]
//! volume_db = -6.0
//! bpm = 80
//! filter = { kind = "low_pass", cutoff_hz = 6000.0 }
//!
//! [instruments.bass]
//! oscillators = [{ waveform = "square" }]
//! envelope = { attack_ms = 10.0, decay_ms = 100.0, sustain_level = 0.7, release_ms = 150.0 }
//! volume_db = -8.0
//! ```

pub mod instrument;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dsp::FilterSpec;
use crate::error::{Error, Result};

pub use instrument::{InstrumentDescriptor, InstrumentId, OscillatorSpec};

/// Tempos the built-in drum loops were recorded at.
pub const LOOP_TEMPOS: [u32; 4] = [70, 80, 90, 100];
pub const RAIN_GROUP: &str = "rain";
pub const VINYL_GROUP: &str = "vinyl";

/// Name of the drum loop group recorded at `tempo`.
pub fn drum_loop_group(tempo: u32) -> String {
    format!("drumloop{tempo}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleGroup {
    pub name: String,
    /// Paths relative to the sample root, one per variant.
    pub files: Vec<String>,
    #[serde(default)]
    pub volume_db: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSpec>,
    /// Recorded tempo, for rhythm loops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u32>,
    #[serde(default = "default_looping")]
    pub looping: bool,
}

fn default_looping() -> bool {
    true
}

impl SampleGroup {
    pub fn new(name: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            name: name.into(),
            files,
            volume_db: 0.0,
            filter: None,
            bpm: None,
            looping: true,
        }
    }

    pub fn size(&self) -> usize {
        self.files.len()
    }

    pub fn file(&self, index: usize) -> Option<&str> {
        self.files.get(index).map(String::as_str)
    }

    fn numbered(name: &str, count: usize) -> Self {
        let files = (1..=count).map(|i| format!("{name}/{i:02}.wav")).collect();
        Self::new(name, files)
    }

    fn with_volume(mut self, volume_db: f32) -> Self {
        self.volume_db = volume_db;
        self
    }

    fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }

    fn with_bpm(mut self, bpm: u32) -> Self {
        self.bpm = Some(bpm);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    groups: BTreeMap<String, SampleGroup>,
    instruments: BTreeMap<InstrumentId, InstrumentDescriptor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    sample_groups: Vec<SampleGroup>,
    instruments: BTreeMap<String, InstrumentDescriptor>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self {
            groups: BTreeMap::new(),
            instruments: BTreeMap::new(),
        }
    }

    /// Four tempo-matched drum loop groups, two ambience layers and every
    /// built-in instrument.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for tempo in LOOP_TEMPOS {
            let name = drum_loop_group(tempo);
            catalog = catalog.with_group(
                SampleGroup::numbered(&name, 4)
                    .with_volume(-6.0)
                    .with_filter(FilterSpec::low_pass(6_000.0))
                    .with_bpm(tempo),
            );
        }
        catalog = catalog
            .with_group(
                SampleGroup::numbered(RAIN_GROUP, 3)
                    .with_volume(-18.0)
                    .with_filter(FilterSpec::high_pass(400.0)),
            )
            .with_group(
                SampleGroup::numbered(VINYL_GROUP, 2)
                    .with_volume(-20.0)
                    .with_filter(FilterSpec::band_pass(3_000.0, 0.2)),
            );
        for id in InstrumentId::ALL {
            catalog = catalog.with_instrument(id, InstrumentDescriptor::builtin(id));
        }
        catalog
    }

    /// Built-in catalog overlaid by the entries in `source`. Entries replace
    /// built-ins of the same name.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(source).map_err(|err| Error::Config(format!("catalog: {err}")))?;

        let mut catalog = Self::builtin();
        for group in file.sample_groups {
            catalog = catalog.with_group(group);
        }
        for (key, descriptor) in file.instruments {
            let id = key
                .parse::<InstrumentId>()
                .map_err(|err| Error::Config(format!("catalog: {err}")))?;
            catalog = catalog.with_instrument(id, descriptor);
        }
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("failed to read {}: {err}", path.display())))?;
        let catalog = Self::from_toml_str(&source)?;
        debug!(
            path = %path.display(),
            groups = catalog.groups.len(),
            instruments = catalog.instruments.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn with_group(mut self, group: SampleGroup) -> Self {
        self.groups.insert(group.name.clone(), group);
        self
    }

    pub fn without_group(mut self, name: &str) -> Self {
        self.groups.remove(name);
        self
    }

    pub fn with_instrument(mut self, id: InstrumentId, descriptor: InstrumentDescriptor) -> Self {
        self.instruments.insert(id, descriptor);
        self
    }

    /// A group with at least one file. Anything else is reported as missing.
    pub fn sample_group(&self, name: &str) -> Result<&SampleGroup> {
        self.groups
            .get(name)
            .filter(|group| group.size() > 0)
            .ok_or_else(|| Error::MissingSampleGroup {
                group: name.to_string(),
            })
    }

    pub fn instrument(&self, id: InstrumentId) -> Option<&InstrumentDescriptor> {
        self.instruments.get(&id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &SampleGroup> {
        self.groups.values()
    }

    fn validate(&self) -> Result<()> {
        for (id, descriptor) in &self.instruments {
            if descriptor.oscillators.is_empty() {
                return Err(Error::Config(format!("instrument `{id}` has no oscillators")));
            }
            if descriptor.polyphony == 0 {
                return Err(Error::Config(format!("instrument `{id}` has zero polyphony")));
            }
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
