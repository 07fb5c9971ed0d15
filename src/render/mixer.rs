//! The synthesis sink a [`Transport`](super::transport::Transport) drives:
//! one voice pool per instrument and one sample player per loop window,
//! summed onto a single mono bus.

use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::{Catalog, InstrumentId};
use crate::compose::{InstrumentNote, Track};
use crate::error::{Error, RenderStage, Result};
use crate::io::SampleBuffer;
use crate::prng::Seed;
use crate::render::session::SampleKey;
use crate::render::transport::{Action, Playback};
use crate::synth::{PolySynth, SamplePlayer, SynthMessage};

/// Note ids carry the note index in the high bits and the chord tone in the
/// low byte.
const TONE_BITS: u32 = 8;

pub struct Mixer {
    synths: Vec<(InstrumentId, PolySynth)>,
    players: Vec<SamplePlayer>,
    /// (synth index, pitches, velocity) per track note.
    notes: Vec<(usize, Vec<u8>, f32)>,
    fade_db: f32,
}

impl Mixer {
    pub fn build(
        track: &Track,
        catalog: &Catalog,
        samples: &HashMap<SampleKey, Arc<SampleBuffer>>,
        sample_rate: u32,
    ) -> Result<Self> {
        let seed = Seed::from_mood(track.parameters.energy, track.parameters.valence);

        let mut synths = Vec::with_capacity(track.instruments.len());
        for (i, &id) in track.instruments.iter().enumerate() {
            let descriptor = catalog.instrument(id).ok_or_else(|| {
                Error::render(RenderStage::Scheduling, format!("instrument `{id}` is not in the catalog"))
            })?;
            let voice_seed = seed.derive(id.name().as_bytes(), i as u64).0;
            let synth = PolySynth::from_descriptor(descriptor, sample_rate as f32, voice_seed);
            synths.push((id, synth));
        }

        let mut players = Vec::with_capacity(track.loops.len());
        for lp in &track.loops {
            let group = catalog
                .sample_group(&lp.group)
                .map_err(|err| Error::render(RenderStage::Scheduling, err))?;
            let buffer = samples.get(&(lp.group.clone(), lp.index)).ok_or_else(|| {
                Error::render(
                    RenderStage::Scheduling,
                    format!("sample `{}` #{} was never loaded", lp.group, lp.index),
                )
            })?;
            players.push(SamplePlayer::new(Arc::clone(buffer), group));
        }

        let notes = track
            .notes
            .iter()
            .map(|note| {
                let synth = synth_index(&synths, note)?;
                Ok((synth, note.pitches.clone(), note.velocity))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            synths,
            players,
            notes,
            fade_db: 0.0,
        })
    }

    /// Voices across every pool.
    pub fn voice_count(&self) -> usize {
        self.synths.iter().map(|(_, s)| s.polyphony()).sum()
    }

    pub fn fade_db(&self) -> f32 {
        self.fade_db
    }

    /// Release every voice and gate off every loop.
    pub fn silence(&mut self) {
        for (_, synth) in &mut self.synths {
            synth.handle(SynthMessage::AllNotesOff);
        }
        for player in &mut self.players {
            player.stop();
        }
    }
}

fn synth_index(synths: &[(InstrumentId, PolySynth)], note: &InstrumentNote) -> Result<usize> {
    synths
        .iter()
        .position(|(id, _)| *id == note.instrument)
        .ok_or_else(|| {
            Error::render(
                RenderStage::Scheduling,
                format!("note uses unlisted instrument `{}`", note.instrument),
            )
        })
}

fn note_id(note: usize, tone: usize) -> u64 {
    ((note as u64) << TONE_BITS) | tone as u64
}

impl Playback for Mixer {
    fn trigger(&mut self, action: Action) {
        match action {
            Action::LoopStart(i) => {
                if let Some(player) = self.players.get_mut(i) {
                    player.start();
                }
            }
            Action::LoopStop(i) => {
                if let Some(player) = self.players.get_mut(i) {
                    player.stop();
                }
            }
            Action::NoteOn(i) => {
                if let Some((synth, pitches, velocity)) = self.notes.get(i) {
                    let synth = &mut self.synths[*synth].1;
                    for (tone, &pitch) in pitches.iter().enumerate() {
                        synth.handle(SynthMessage::NoteOn {
                            id: note_id(i, tone),
                            note: pitch,
                            velocity: *velocity,
                        });
                    }
                }
            }
            Action::NoteOff(i) => {
                if let Some((synth, pitches, _)) = self.notes.get(i) {
                    let synth = &mut self.synths[*synth].1;
                    for tone in 0..pitches.len() {
                        synth.handle(SynthMessage::NoteOff { id: note_id(i, tone) });
                    }
                }
            }
        }
    }

    fn maintain(&mut self, fade_db: f32) {
        self.fade_db = fade_db;
        for (_, synth) in &mut self.synths {
            synth.set_fade_db(fade_db);
        }
        for player in &mut self.players {
            player.set_fade_db(fade_db);
        }
    }

    fn render(&mut self, out: &mut [f32]) {
        for (_, synth) in &mut self.synths {
            synth.render_block(out);
        }
        for player in &mut self.players {
            player.render_block(out);
        }
    }
}
