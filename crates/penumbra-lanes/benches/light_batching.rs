use criterion::{criterion_group, criterion_main, Criterion};
use penumbra_core::renderer::Light2D;
use penumbra_lanes::plan_batches;
use std::hint::black_box;

fn bench_plan_batches(c: &mut Criterion) {
    // 10,000 lights, every third one casting shadows
    let lights: Vec<Light2D> = (0..10_000)
        .map(|i| {
            let mut light = Light2D::default();
            light.shadows.enabled = i % 3 == 0;
            light.shadows.intensity = 1.0;
            light
        })
        .collect();

    let mut group = c.benchmark_group("Light Batching");

    group.bench_function("Plan (pool of 4)", |b| {
        b.iter(|| {
            let batches = plan_batches(black_box(&lights), 4, Light2D::casts_shadows);
            black_box(batches)
        });
    });

    group.bench_function("Plan (pool of 1)", |b| {
        b.iter(|| {
            let batches = plan_batches(black_box(&lights), 1, Light2D::casts_shadows);
            black_box(batches)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_plan_batches);
criterion_main!(benches);
