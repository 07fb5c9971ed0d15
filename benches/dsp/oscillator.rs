use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use moodtrack::dsp::{Oscillator, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    let waveforms = [
        ("sine", Waveform::Sine),
        // PolyBLEP correction near each wrap
        ("saw", Waveform::Saw),
        ("square", Waveform::Square),
        ("triangle", Waveform::Triangle),
        ("noise", Waveform::Noise),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        for (name, waveform) in waveforms {
            let mut osc = Oscillator::new(waveform, 7);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| osc.render(black_box(&mut buffer), black_box(220.0), SAMPLE_RATE))
            });
        }
    }

    group.finish();
}
