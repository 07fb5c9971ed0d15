use std::hint::black_box;

use criterion::Criterion;
use moodtrack::Composer;

pub fn bench_compose(c: &mut Criterion) {
    let composer = Composer::default();
    let parameters = super::parameters();
    c.bench_function("scenarios/compose", |b| {
        b.iter(|| composer.compose(black_box(&parameters)))
    });
}
