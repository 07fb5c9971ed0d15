use crate::catalog::InstrumentDescriptor;
use crate::dsp::oscillator::cents_to_ratio;
use crate::dsp::{Envelope, Oscillator, SVFilter};
use crate::graph::node::{GraphNode, RenderCtx};
use crate::MAX_BLOCK_SIZE;

/// One playable voice built from an [`InstrumentDescriptor`]:
///
/// ```text
/// osc 1 ─┐
/// osc 2 ─┼─ sum ── filter chain ── × envelope ── × velocity
/// ...   ─┘
/// ```
pub struct InstrumentPatch {
    oscillators: Vec<(Oscillator, f32, f32)>,
    filters: Vec<SVFilter>,
    envelope: Envelope,
    scratch: Vec<f32>,
}

impl InstrumentPatch {
    /// `seed` feeds any noise oscillators, so two patches built with the
    /// same seed render identically.
    pub fn from_descriptor(descriptor: &InstrumentDescriptor, seed: u64) -> Self {
        let oscillators = descriptor
            .oscillators
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let osc = Oscillator::new(spec.waveform, seed.wrapping_add(i as u64));
                (osc, cents_to_ratio(spec.detune_cents), spec.gain)
            })
            .collect();

        Self {
            oscillators,
            filters: descriptor.filters.iter().map(|f| f.build()).collect(),
            envelope: Envelope::from_spec(&descriptor.envelope),
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl GraphNode for InstrumentPatch {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let scratch = &mut self.scratch[..chunk.len()];
            for (osc, ratio, gain) in &mut self.oscillators {
                osc.render(scratch, ctx.frequency * *ratio, ctx.sample_rate);
                for (o, s) in chunk.iter_mut().zip(scratch.iter()) {
                    *o += *s * *gain;
                }
            }
            for filter in &mut self.filters {
                filter.process(chunk, ctx.sample_rate);
            }
            self.envelope.apply(chunk, ctx.sample_rate);
            for sample in chunk.iter_mut() {
                *sample *= ctx.velocity;
            }
        }
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        for (osc, _, _) in &mut self.oscillators {
            osc.reset();
        }
        for filter in &mut self.filters {
            filter.reset();
        }
        self.envelope.note_on();
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.envelope.note_off(ctx.sample_rate);
    }

    fn is_active(&self) -> bool {
        self.envelope.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InstrumentId;

    fn patch(id: InstrumentId) -> InstrumentPatch {
        InstrumentPatch::from_descriptor(&InstrumentDescriptor::builtin(id), 1)
    }

    #[test]
    fn silent_until_note_on() {
        let mut p = patch(InstrumentId::Piano);
        let ctx = RenderCtx::from_note(44_100.0, 60, 1.0);
        let mut buffer = vec![1.0f32; 256];
        p.render_block(&mut buffer, &ctx);
        assert!(buffer.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn sounds_then_releases() {
        let mut p = patch(InstrumentId::Pluck);
        let ctx = RenderCtx::from_note(44_100.0, 64, 0.8);
        let mut buffer = vec![0.0f32; 1024];

        p.note_on(&ctx);
        p.render_block(&mut buffer, &ctx);
        assert!(buffer.iter().any(|x| x.abs() > 0.01));

        p.note_off(&ctx);
        // Pluck release is 100 ms.
        for _ in 0..8 {
            p.render_block(&mut buffer, &ctx);
        }
        assert!(!p.is_active());
    }

    #[test]
    fn velocity_scales_output() {
        let ctx_loud = RenderCtx::from_note(44_100.0, 48, 1.0);
        let ctx_soft = RenderCtx::from_note(44_100.0, 48, 0.25);

        let mut loud = patch(InstrumentId::Bass);
        let mut soft = patch(InstrumentId::Bass);
        loud.note_on(&ctx_loud);
        soft.note_on(&ctx_soft);

        let mut a = vec![0.0f32; 512];
        let mut b = vec![0.0f32; 512];
        loud.render_block(&mut a, &ctx_loud);
        soft.render_block(&mut b, &ctx_soft);

        for (x, y) in a.iter().zip(&b) {
            assert!((x * 0.25 - y).abs() < 1e-5);
        }
    }

    #[test]
    fn long_blocks_are_chunked() {
        let mut p = patch(InstrumentId::Pad);
        let ctx = RenderCtx::from_note(48_000.0, 57, 1.0);
        p.note_on(&ctx);
        let mut buffer = vec![0.0f32; MAX_BLOCK_SIZE * 2 + 17];
        p.render_block(&mut buffer, &ctx);
        assert!(buffer.iter().all(|x| x.is_finite()));
    }
}
