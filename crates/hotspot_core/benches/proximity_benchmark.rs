//! Performance benchmarks for per-frame hotspot evaluation
//!
//! Run with: cargo bench -p hotspot_core

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hotspot_core::{GestureEvaluator, InteractiveTarget, Point3, TriggerZone, ZoneSet};

fn zones(count: usize) -> Vec<TriggerZone> {
    (0..count)
        .map(|i| {
            let angle = i as f32 * 0.1;
            TriggerZone::new(
                format!("zone-{}", i),
                Point3::new(angle.cos() * 50.0, 1.6, angle.sin() * 50.0),
                2.0,
            )
        })
        .collect()
}

fn benchmark_zone_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("proximity");

    // Scenes range from a single hotspot to a dense gallery
    for count in [1, 8, 64, 512] {
        group.throughput(Throughput::Elements(count as u64));

        // Observer stays out of range so nothing latches between iterations
        group.bench_function(format!("sample_all_{}_zones", count), |b| {
            let set = ZoneSet::new(zones(count));
            let observer = Point3::new(0.0, 1.6, 0.0);

            b.iter(|| {
                black_box(set.sample_all(black_box(&observer)));
            });
        });
    }

    group.finish();
}

fn benchmark_single_evaluate(c: &mut Criterion) {
    c.bench_function("trigger_zone_evaluate", |b| {
        let zone = TriggerZone::new("well", Point3::new(0.0, 1.6, -5.0), 2.0);
        let mut z = 0.0_f32;

        b.iter(|| {
            // Simulate walking toward the hotspot
            let reading = zone.evaluate(black_box(&Point3::new(0.0, 1.6, z)));
            z = (z - 0.01) % 10.0;
            reading
        });
    });
}

fn benchmark_gesture_hit_test(c: &mut Criterion) {
    let targets: Vec<InteractiveTarget> = zones(64)
        .iter()
        .map(|zone| InteractiveTarget::new(zone.id().clone(), zone.position()))
        .collect();
    let pinch = GestureEvaluator::pinch(0.3);

    c.bench_function("pinch_hit_test_64_targets", |b| {
        let point = targets[17].position;
        b.iter(|| black_box(pinch.evaluate(black_box(&point), &targets)));
    });
}

criterion_group!(
    benches,
    benchmark_zone_sampling,
    benchmark_single_evaluate,
    benchmark_gesture_hit_test
);
criterion_main!(benches);
