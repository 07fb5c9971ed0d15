/// Control messages a voice pool understands.
///
/// `id` identifies one scheduled note so a note-off releases exactly the
/// voice its note-on started, even when two notes share a pitch.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { id: u64, note: u8, velocity: f32 },
    NoteOff { id: u64 },
    AllNotesOff,
}
