use crate::{
    catalog::InstrumentDescriptor,
    dsp::db_to_gain,
    graph::{node::GraphNode, patch::InstrumentPatch},
    synth::{
        message::SynthMessage,
        voice::{Voice, VoiceState},
    },
    MAX_BLOCK_SIZE,
};

/// A fixed pool of voices playing one instrument.
///
/// The pool never allocates after construction. When every voice is busy, a
/// new note steals the oldest releasing voice, or failing that the oldest
/// held one.
pub struct PolySynth<T: GraphNode = InstrumentPatch> {
    voices: Vec<Voice<T>>,
    temp_buffer: Vec<f32>,
    frame_counter: u64,
    volume_db: f32,
    fade_db: f32,
}

impl PolySynth<InstrumentPatch> {
    pub fn from_descriptor(descriptor: &InstrumentDescriptor, sample_rate: f32, seed: u64) -> Self {
        let voices = (0..descriptor.polyphony.max(1))
            .map(|i| InstrumentPatch::from_descriptor(descriptor, seed.wrapping_add(i as u64 * 64)))
            .collect();
        Self::new(voices, sample_rate, descriptor.volume_db)
    }
}

impl<T: GraphNode> PolySynth<T> {
    pub fn new(graphs: Vec<T>, sample_rate: f32, volume_db: f32) -> Self {
        Self {
            voices: graphs
                .into_iter()
                .map(|graph| Voice::new(graph, sample_rate))
                .collect(),
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
            frame_counter: 0,
            volume_db,
            fade_db: 0.0,
        }
    }

    pub fn handle(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn { id, note, velocity } => {
                let age = self.frame_counter;
                if let Some(voice) = self.allocate_voice() {
                    voice.start(id, note, velocity, age);
                }
            }
            SynthMessage::NoteOff { id } => {
                for voice in self.voices.iter_mut().filter(|v| v.id() == id && v.is_active()) {
                    voice.release();
                }
            }
            SynthMessage::AllNotesOff => {
                for voice in &mut self.voices {
                    voice.release();
                }
            }
        }
    }

    /// Attenuation in dB subtracted from the baseline volume.
    pub fn set_fade_db(&mut self, fade_db: f32) {
        self.fade_db = fade_db.max(0.0);
    }

    pub fn gain(&self) -> f32 {
        db_to_gain(self.volume_db - self.fade_db)
    }

    /// Add this pool's output into `out`.
    pub fn render_block(&mut self, out: &mut [f32]) {
        let gain = self.gain();
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            for voice in &mut self.voices {
                if voice.is_active() {
                    let temp = &mut self.temp_buffer[..chunk.len()];
                    voice.render(temp);
                    for (o, v) in chunk.iter_mut().zip(temp.iter()) {
                        *o += v * gain;
                    }
                }
            }
        }
        self.frame_counter += out.len() as u64;
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn polyphony(&self) -> usize {
        self.voices.len()
    }

    fn allocate_voice(&mut self) -> Option<&mut Voice<T>> {
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return Some(&mut self.voices[idx]);
        }

        let oldest_in = |state: VoiceState, voices: &[Voice<T>]| {
            voices
                .iter()
                .enumerate()
                .filter(|(_, v)| v.state() == state)
                .min_by_key(|(_, v)| v.age())
                .map(|(idx, _)| idx)
        };

        let steal_idx = oldest_in(VoiceState::Releasing, &self.voices)
            .or_else(|| oldest_in(VoiceState::Active, &self.voices));
        steal_idx.map(|idx| &mut self.voices[idx])
    }
}
