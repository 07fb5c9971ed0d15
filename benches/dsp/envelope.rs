use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use moodtrack::dsp::Envelope;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![1.0f32; size];

        let mut env = Envelope::adsr(0.1, 0.1, 0.7, 0.3);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| env.apply(black_box(&mut buffer), SAMPLE_RATE))
        });

        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 0.3);
        env.note_on();
        for _ in 0..200 {
            env.next_sample(SAMPLE_RATE);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| env.apply(black_box(&mut buffer), SAMPLE_RATE))
        });
    }

    group.finish();
}
