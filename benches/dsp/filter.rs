use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use moodtrack::dsp::{FilterKind, SVFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp as input
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for (name, kind) in [
            ("low_pass", FilterKind::LowPass),
            ("high_pass", FilterKind::HighPass),
            ("band_pass", FilterKind::BandPass),
            ("notch", FilterKind::Notch),
        ] {
            let mut filter = SVFilter::new(kind, 1_000.0);
            filter.set_resonance(0.5);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.process(black_box(&mut buffer), SAMPLE_RATE);
                })
            });
        }
    }

    group.finish();
}
