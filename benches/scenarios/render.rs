use std::sync::Arc;

use criterion::Criterion;
use moodtrack::{Catalog, Composer, EngineConfig, RenderEngine};

/// A whole track at a low sample rate, so one iteration stays short.
pub fn bench_render(c: &mut Criterion) {
    let track = Composer::default()
        .compose(&super::parameters())
        .expect("benchmark parameters are valid")
        .track;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let config = EngineConfig {
        sample_rate: 11_025,
        ..EngineConfig::default()
    };
    let mut engine = RenderEngine::new(config, Arc::new(Catalog::builtin()));

    let mut group = c.benchmark_group("scenarios/render");
    group.sample_size(10);
    group.bench_function("track", |b| {
        b.iter(|| runtime.block_on(engine.render(&track)).expect("render"))
    });
    group.finish();
}
