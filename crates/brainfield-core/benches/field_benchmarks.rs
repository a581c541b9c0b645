//! Benchmarks for field interpolation and colorization

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use brainfield_core::{
    build_samples, colorize, interpolate, ChannelReading, ColorTheme, CoordinateMapper,
    DeviceSnapshot, MaskCache,
};

/// All 24 channels active with a spread of transition counts
fn busy_snapshot() -> DeviceSnapshot {
    let channels = (0u8..24)
        .map(|id| {
            let total = (u32::from(id) * 53) % 220 + 1;
            let reading = ChannelReading::new(id, total);
            if id % 5 == 0 {
                reading.with_change(3)
            } else {
                reading
            }
        })
        .collect();
    DeviceSnapshot::from_channels(0, channels)
}

fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate");
    let mapper = CoordinateMapper::default();
    let samples = build_samples(&busy_snapshot(), &mapper, 0.7);
    let mut masks = MaskCache::default();

    for size in [60usize, 70, 80].iter() {
        let mask = masks.get(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(interpolate(black_box(&samples), &mask, &mapper)));
        });
    }

    group.finish();
}

fn bench_colorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("colorize");
    let mapper = CoordinateMapper::default();
    let samples = build_samples(&busy_snapshot(), &mapper, 0.7);
    let ramp = ColorTheme::Ember.ramp();
    let mut masks = MaskCache::default();

    for size in [60usize, 70, 80].iter() {
        let grid = interpolate(&samples, &masks.get(*size), &mapper).expect("valid grid size");
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(colorize(black_box(&grid), 1.9, &ramp)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_interpolate, bench_colorize);
criterion_main!(benches);
