/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// What a node is asked to render: the pitch and strength of the note
/// currently held by its voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frequency: f32,
    /// 0.0 to 1.0.
    pub velocity: f32,
}

impl RenderCtx {
    pub fn from_note(sample_rate: f32, note: u8, velocity: f32) -> Self {
        Self {
            sample_rate,
            frequency: midi_note_to_freq(note),
            velocity,
        }
    }
}

/// Anything a voice can play.
pub trait GraphNode: Send {
    /// Overwrite `out` with the next block.
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    fn note_on(&mut self, _ctx: &RenderCtx) {}

    fn note_off(&mut self, _ctx: &RenderCtx) {}

    /// False once the node has fallen silent after a note-off, which lets
    /// the voice pool reuse it.
    fn is_active(&self) -> bool {
        true
    }
}
