use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng};
use ridewalk::bike::BikeLegPlanner;
use ridewalk::config::{BikeLimits, TrekLimits};
use ridewalk::engine::{AttemptBackoff, ProviderGateway};
use ridewalk::geodesy::destination_point;
use ridewalk::loops::TrekLoopPlanner;
use ridewalk::mock::StraightLineProvider;
use ridewalk::models::{Coordinate, PlanHints};
use ridewalk::path_codec::{decode_path, encode_path};

const START: Coordinate = Coordinate { lat: 45.9306, lng: 4.5779 };

fn benchmark_geodesic_offset(c: &mut Criterion) {
    c.bench_function("destination_point", |b| {
        b.iter(|| destination_point(black_box(START), black_box(42.0), black_box(80.0)))
    });
}

fn benchmark_path_codec(c: &mut Criterion) {
    let path: Vec<Coordinate> = (0..500)
        .map(|i| destination_point(START, i as f64 * 0.05, i as f64 * 3.0))
        .collect();
    let encoded = encode_path(&path).unwrap();

    let mut group = c.benchmark_group("path_codec");
    group.bench_function("encode_500", |b| b.iter(|| encode_path(black_box(&path))));
    group.bench_function("decode_500", |b| b.iter(|| decode_path(black_box(&encoded))));
    group.finish();
}

fn benchmark_planners(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    let mut group = c.benchmark_group("planners");

    // Detour factors: direct roads, typical valley roads, switchbacks
    for detour in [1.0, 1.4, 2.5] {
        let gateway = ProviderGateway::new()
            .with_provider_for_all(Arc::new(StraightLineProvider::new("line", detour)));
        let bike = BikeLimits::default();
        let trek = TrekLimits::default();

        group.bench_with_input(BenchmarkId::new("bike_leg", detour), &gateway, |b, gateway| {
            let planner = BikeLegPlanner::new(gateway, &bike, AttemptBackoff::default());
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| runtime.block_on(planner.plan(START, black_box(70.0), 80.0, &mut rng)))
        });

        group.bench_with_input(BenchmarkId::new("trek_loop", detour), &gateway, |b, gateway| {
            let planner = TrekLoopPlanner::new(gateway, &trek, AttemptBackoff::default());
            let hints = PlanHints::default();
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| runtime.block_on(planner.plan(START, black_box(&hints), &mut rng)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_geodesic_offset,
    benchmark_path_codec,
    benchmark_planners
);
criterion_main!(benches);
