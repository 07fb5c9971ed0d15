use crate::graph::node::{GraphNode, RenderCtx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Gate held
    Releasing, // Gate released, envelope still sounding
}

/// A single voice that can play any GraphNode
pub struct Voice<T: GraphNode> {
    id: u64,
    note: u8,
    velocity: f32,
    state: VoiceState,
    age: u64,
    sample_rate: f32,
    graph: T,
}

impl<T: GraphNode> Voice<T> {
    pub fn new(graph: T, sample_rate: f32) -> Self {
        Self {
            id: 0,
            note: 0,
            velocity: 0.0,
            state: VoiceState::Free,
            age: 0,
            sample_rate,
            graph,
        }
    }

    fn ctx(&self) -> RenderCtx {
        RenderCtx::from_note(self.sample_rate, self.note, self.velocity)
    }

    /// Start (or steal and restart) this voice.
    pub fn start(&mut self, id: u64, note: u8, velocity: f32, age: u64) {
        self.id = id;
        self.note = note;
        self.velocity = velocity;
        self.state = VoiceState::Active;
        self.age = age;
        let ctx = self.ctx();
        self.graph.note_on(&ctx);
    }

    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            let ctx = self.ctx();
            self.graph.note_off(&ctx);
        }
    }

    /// Overwrite `out` with this voice's next block.
    pub fn render(&mut self, out: &mut [f32]) {
        let ctx = self.ctx();
        self.graph.render_block(out, &ctx);

        if self.state == VoiceState::Releasing && !self.graph.is_active() {
            self.free();
        }
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.id = 0;
        self.note = 0;
        self.velocity = 0.0;
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sounds for a fixed number of samples after note-off.
    struct Tail {
        remaining: usize,
        gate: bool,
    }

    impl GraphNode for Tail {
        fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
            out.fill(1.0);
            if !self.gate {
                self.remaining = self.remaining.saturating_sub(out.len());
            }
        }

        fn note_on(&mut self, _ctx: &RenderCtx) {
            self.gate = true;
            self.remaining = 64;
        }

        fn note_off(&mut self, _ctx: &RenderCtx) {
            self.gate = false;
        }

        fn is_active(&self) -> bool {
            self.gate || self.remaining > 0
        }
    }

    #[test]
    fn lifecycle_free_active_releasing_free() {
        let mut voice = Voice::new(Tail { remaining: 0, gate: false }, 48_000.0);
        assert!(voice.is_free());

        voice.start(7, 60, 1.0, 0);
        assert_eq!(voice.state(), VoiceState::Active);
        assert_eq!(voice.id(), 7);

        voice.release();
        assert_eq!(voice.state(), VoiceState::Releasing);

        let mut block = vec![0.0f32; 32];
        voice.render(&mut block);
        assert_eq!(voice.state(), VoiceState::Releasing);
        voice.render(&mut block);
        assert!(voice.is_free());
    }

    #[test]
    fn release_only_affects_held_voices() {
        let mut voice = Voice::new(Tail { remaining: 0, gate: false }, 48_000.0);
        voice.release();
        assert!(voice.is_free());
    }
}
