use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use moodtrack::catalog::{InstrumentDescriptor, InstrumentId};
use moodtrack::synth::{PolySynth, SynthMessage};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// A held triad on every built-in instrument.
pub fn bench_instruments(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/instruments");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        for id in InstrumentId::ALL {
            let mut synth = PolySynth::from_descriptor(&InstrumentDescriptor::builtin(id), SAMPLE_RATE, 1);
            for (i, note) in [57u8, 60, 64].into_iter().enumerate() {
                synth.handle(SynthMessage::NoteOn {
                    id: i as u64,
                    note,
                    velocity: 0.8,
                });
            }
            group.bench_with_input(BenchmarkId::new(id.name(), size), &size, |b, _| {
                b.iter(|| {
                    buffer.fill(0.0);
                    synth.render_block(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
