//! Sample loading.
//!
//! A [`SampleSource`] turns one variant of a sample group into a decoded
//! buffer. [`load_samples`] fans every referenced variant out onto tokio's
//! blocking pool and waits for all of them together.

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, instrument};

use crate::catalog::{Catalog, SampleGroup, RAIN_GROUP, VINYL_GROUP};
use crate::compose::SampleSelection;
use crate::error::{Error, RenderStage, Result};
use crate::io::SampleBuffer;
use crate::prng::{Prng, Seed};
use crate::render::session::SampleKey;

/// Where sample audio comes from. Called on a blocking thread.
pub trait SampleSource: Send + Sync {
    fn load(&self, group: &SampleGroup, index: usize, sample_rate: u32) -> Result<SampleBuffer>;
}

/// Reads WAV files relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileSampleSource {
    root: PathBuf,
}

impl FileSampleSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SampleSource for FileSampleSource {
    fn load(&self, group: &SampleGroup, index: usize, sample_rate: u32) -> Result<SampleBuffer> {
        let file = group.file(index).ok_or_else(|| {
            Error::render(
                RenderStage::Loading,
                format!("`{}` has no variant {index}", group.name),
            )
        })?;
        let path = self.root.join(file);
        SampleBuffer::load_wav(&path, sample_rate).map_err(|err| {
            Error::render(
                RenderStage::Loading,
                format!("{}: {err}", path.display()),
            )
        })
    }
}

/// Generates stand-in audio for every group, so the engine renders without
/// any files on disk. Output depends only on the group, variant and rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SynthesizedSamples;

/// Tempo assumed for a drum group that does not declare one.
const DEFAULT_LOOP_BPM: u32 = 90;
const BED_SECONDS: f32 = 3.0;

impl SampleSource for SynthesizedSamples {
    fn load(&self, group: &SampleGroup, index: usize, sample_rate: u32) -> Result<SampleBuffer> {
        if index >= group.size() {
            return Err(Error::render(
                RenderStage::Loading,
                format!("`{}` has no variant {index}", group.name),
            ));
        }
        let mut rng = Seed(0x5a4d_504c).derive(group.name.as_bytes(), index as u64).rng();
        let sr = sample_rate as f32;
        let frames = match group.name.as_str() {
            RAIN_GROUP => rain(&mut rng, sr),
            VINYL_GROUP => vinyl(&mut rng, sr),
            _ => drum_loop(&mut rng, group.bpm.unwrap_or(DEFAULT_LOOP_BPM), index, sr),
        };
        Ok(SampleBuffer::new(sample_rate, frames))
    }
}

/// Two measures of kick, snare and eighth-note hats.
fn drum_loop(rng: &mut Prng, bpm: u32, variant: usize, sr: f32) -> Vec<f32> {
    let beat = 60.0 / bpm.max(1) as f32 * sr;
    let mut out = vec![0.0; (beat * 8.0).round() as usize];

    for eighth in 0..16 {
        let start = (eighth as f32 * beat / 2.0).round() as usize;
        let in_measure = eighth % 8;
        let kick = in_measure == 0 || in_measure == 4 || (variant % 2 == 1 && in_measure == 5);
        let snare = in_measure == 2 || in_measure == 6;

        if kick {
            hit(&mut out, start, 0.25, sr, rng, |t, _| {
                let freq = 45.0 + 70.0 * (-t * 30.0).exp();
                (TAU * freq * t).sin() * (-t * 12.0).exp() * 0.9
            });
        }
        if snare {
            hit(&mut out, start, 0.18, sr, rng, |t, noise| {
                (noise * 0.6 + (TAU * 190.0 * t).sin() * 0.3) * (-t * 22.0).exp()
            });
        }
        let accent = if eighth % 2 == 0 { 0.25 } else { 0.15 };
        hit(&mut out, start, 0.04, sr, rng, |t, noise| noise * accent * (-t * 90.0).exp());
    }
    out
}

/// Filtered noise with scattered droplets.
fn rain(rng: &mut Prng, sr: f32) -> Vec<f32> {
    let len = (BED_SECONDS * sr) as usize;
    let mut out = Vec::with_capacity(len);
    let mut smooth = 0.0f32;
    let mut drop = 0.0f32;
    let drop_chance = 40.0 / sr as f64;
    for _ in 0..len {
        smooth += 0.2 * (rng.next_bipolar() - smooth);
        if rng.next_f64() < drop_chance {
            drop = 0.3 * rng.next_f64() as f32;
        }
        drop *= 0.995;
        out.push(smooth * 0.4 + drop * rng.next_bipolar());
    }
    out
}

/// Surface hiss with sparse crackle.
fn vinyl(rng: &mut Prng, sr: f32) -> Vec<f32> {
    let len = (BED_SECONDS * sr) as usize;
    let mut out = Vec::with_capacity(len);
    let mut pop = 0.0f32;
    let pop_chance = 8.0 / sr as f64;
    let decay = (-1.0 / (0.002 * sr)).exp();
    for _ in 0..len {
        if rng.next_f64() < pop_chance {
            pop = rng.next_bipolar();
        }
        pop *= decay;
        out.push(rng.next_bipolar() * 0.03 + pop * 0.5);
    }
    out
}

/// Mix `seconds` of `voice(t, noise)` into `out` from frame `start`.
fn hit<F>(out: &mut [f32], start: usize, seconds: f32, sr: f32, rng: &mut Prng, voice: F)
where
    F: Fn(f32, f32) -> f32,
{
    let end = (start + (seconds * sr) as usize).min(out.len());
    if start >= end {
        return;
    }
    for (i, sample) in out[start..end].iter_mut().enumerate() {
        *sample += voice(i as f32 / sr, rng.next_bipolar());
    }
}

/// Load every selected variant concurrently. The first failure aborts the
/// rest.
#[instrument(skip_all, fields(count = selections.len()))]
pub async fn load_samples(
    source: Arc<dyn SampleSource>,
    catalog: &Catalog,
    selections: &[SampleSelection],
    sample_rate: u32,
) -> Result<HashMap<SampleKey, Arc<SampleBuffer>>> {
    let mut tasks = JoinSet::new();
    for selection in selections {
        let group = catalog
            .sample_group(&selection.group)
            .map_err(|err| Error::render(RenderStage::Loading, err))?
            .clone();
        let source = Arc::clone(&source);
        let index = selection.index;
        tasks.spawn_blocking(move || -> Result<(SampleKey, Arc<SampleBuffer>)> {
            let buffer = source.load(&group, index, sample_rate)?;
            Ok(((group.name, index), Arc::new(buffer)))
        });
    }

    let mut loaded = HashMap::new();
    while let Some(joined) = tasks.join_next().await {
        let (key, buffer) = joined.map_err(|err| Error::render(RenderStage::Loading, err))??;
        debug!(group = %key.0, index = key.1, frames = buffer.len(), "sample loaded");
        loaded.insert(key, buffer);
    }
    Ok(loaded)
}
