//! Criterion benchmarks for the aggregation pass.
//!
//! Benchmarks:
//!   - bucket_points over 20k points for region, grid and hex grouping
//!   - aggregate over a single 5k point bucket per kind
//!   - aggregate_buckets with the default settings (full pass minus domains)
//!
//! Run with: cargo bench -p analytics --bench aggregation_bench --features bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use analytics::aggregation::{
    aggregate, aggregate_buckets, bucket_points, AggregationKind, Grouping, RepeatedPointsKind,
    TimeWindow,
};
use analytics::data::{DataPoint, PointView, Region};
use analytics::settings::MapSettings;

const DAY: i64 = 86_400_000;

fn random_points(count: usize, seed: u64) -> Vec<DataPoint> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let timestamp = rng.gen_range(0..365) * DAY;
            let value = rng.gen_bool(0.95).then(|| rng.gen_range(0.0..100.0));
            DataPoint::new(
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
                Some(timestamp),
                value,
            )
        })
        .collect()
}

/// A 5x5 tiling of the unit square.
fn tiled_regions() -> Vec<Region> {
    let step = 0.2;
    let mut regions = Vec::new();
    for row in 0..5 {
        for col in 0..5 {
            let (x0, y0) = (col as f64 * step, row as f64 * step);
            regions.push(Region::polygon(
                format!("tile-{col}-{row}"),
                vec![vec![
                    (x0, y0),
                    (x0 + step, y0),
                    (x0 + step, y0 + step),
                    (x0, y0 + step),
                ]],
            ));
        }
    }
    regions
}

fn views(points: &[DataPoint]) -> Vec<PointView<'_>> {
    points
        .iter()
        .enumerate()
        .map(|(index, point)| PointView {
            index,
            point,
            timestamp: point.timestamp,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmark: bucket_points
// ---------------------------------------------------------------------------

fn bench_bucket_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucket_points_20k");
    group.sample_size(20);

    let points = random_points(20_000, 42);
    let views = views(&points);
    let regions = tiled_regions();
    let window = TimeWindow::new(0, 180 * DAY);

    group.bench_function("regions_25", |b| {
        let grouping = Grouping::Regions(&regions);
        b.iter(|| black_box(bucket_points(black_box(&views), &grouping, window)));
    });

    group.bench_function("grid_0.05", |b| {
        let grouping = Grouping::Grid { cell_size: 0.05 };
        b.iter(|| black_box(bucket_points(black_box(&views), &grouping, window)));
    });

    group.bench_function("hex_0.03", |b| {
        let grouping = Grouping::Hex { radius: 0.03 };
        b.iter(|| black_box(bucket_points(black_box(&views), &grouping, window)));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: aggregate
// ---------------------------------------------------------------------------

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_5k");

    let points = random_points(5_000, 7);

    for kind in AggregationKind::ALL {
        group.bench_function(kind.label(), |b| {
            b.iter(|| {
                black_box(aggregate(
                    black_box(&points),
                    TimeWindow::UNBOUNDED,
                    kind,
                    None,
                    0.0,
                ))
            });
        });
    }

    // Repeated-timestamp collapse before the final reduction
    group.bench_function("sum_of_daily_means", |b| {
        b.iter(|| {
            black_box(aggregate(
                black_box(&points),
                TimeWindow::UNBOUNDED,
                AggregationKind::Sum,
                Some(RepeatedPointsKind::Mean),
                0.0,
            ))
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: aggregate_buckets
// ---------------------------------------------------------------------------

fn bench_aggregate_buckets(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_buckets_20k");
    group.sample_size(20);

    let points = random_points(20_000, 99);
    let views = views(&points);
    let regions = tiled_regions();
    let settings = MapSettings::default();

    group.bench_function("regions_default_settings", |b| {
        let grouping = Grouping::Regions(&regions);
        b.iter(|| {
            black_box(aggregate_buckets(
                black_box(&views),
                &grouping,
                TimeWindow::UNBOUNDED,
                &settings,
                &[],
            ))
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Register groups
// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    bench_bucket_points,
    bench_aggregate,
    bench_aggregate_buckets
);
criterion_main!(benches);
