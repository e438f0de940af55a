//! Throughput benchmarks for the rating and ranking pipelines.
//!
//! Run with: `cargo bench -p recometrics-core --bench throughput`
//!
//! Compares the sequential fold against the rayon executor at several pool
//! sizes, on synthetic datasets large enough for partitioning to matter.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use recometrics_core::config::{EvalConfig, RelevancyMethod};
use recometrics_core::data::{Interaction, InteractionSet};
use recometrics_core::evaluation::{evaluate_ranking, evaluate_rating, RayonExecutor, Sequential};
use std::time::Duration;

// =============================================================================
// Configuration
// =============================================================================

/// Users in the synthetic dataset.
const USERS: u64 = 5_000;

/// Ground-truth interactions per user.
const TRUTH_PER_USER: u64 = 20;

/// Predictions per user.
const PREDICTIONS_PER_USER: u64 = 50;

/// Item catalogue size.
const ITEMS: u64 = 2_000;

/// Pool sizes to test.
const THREAD_COUNTS: &[usize] = &[1, 2, 4, 8];

// =============================================================================
// Test Data Generation
// =============================================================================

fn seeded(seed: u64, salt: u64) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    salt.hash(&mut hasher);
    hasher.finish()
}

/// Per-user item ids with no repeats: a hashed offset plus a stride that is
/// coprime with the catalogue size.
fn user_items(user: u64, count: u64, salt: u64) -> impl Iterator<Item = u64> {
    let offset = seeded(user, salt) % ITEMS;
    (0..count).map(move |i| (offset + i * 7) % ITEMS)
}

fn truth_set() -> InteractionSet {
    let rows = (0..USERS).flat_map(|user| {
        user_items(user, TRUTH_PER_USER, 1).map(move |item| {
            let rating = 1.0 + (seeded(user, item) % 5) as f64;
            Interaction::new(user as i64, item as i64, rating)
        })
    });
    InteractionSet::new(rows.collect()).unwrap()
}

fn prediction_set() -> InteractionSet {
    let rows = (0..USERS).flat_map(|user| {
        // Overlap with the ground-truth items so both pipelines have work.
        user_items(user, PREDICTIONS_PER_USER, 1).map(move |item| {
            let score = (seeded(user, item + ITEMS) % 10_000) as f64 / 1_000.0;
            Interaction::new(user as i64, item as i64, score)
        })
    });
    InteractionSet::new(rows.collect()).unwrap()
}

// =============================================================================
// Rating Pipeline
// =============================================================================

fn bench_rating(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput/rating");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let truth = truth_set();
    let preds = prediction_set();
    group.throughput(Throughput::Elements(truth.len() as u64));

    group.bench_function("sequential", |b| {
        b.iter(|| evaluate_rating(black_box(&truth), black_box(&preds), &Sequential).unwrap());
    });

    for &threads in THREAD_COUNTS {
        let executor = RayonExecutor::with_threads(threads).unwrap();
        group.bench_with_input(
            BenchmarkId::new("rayon", format!("{}_threads", threads)),
            &executor,
            |b, executor| {
                b.iter(|| evaluate_rating(black_box(&truth), black_box(&preds), executor).unwrap());
            },
        );
    }

    group.finish();
}

// =============================================================================
// Ranking Pipeline
// =============================================================================

fn bench_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput/ranking");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let truth = truth_set();
    let preds = prediction_set();
    group.throughput(Throughput::Elements(USERS));

    for method in [RelevancyMethod::TopK, RelevancyMethod::ByRating] {
        let config = EvalConfig::new(10, method).with_threshold(4.0);

        group.bench_function(BenchmarkId::new("sequential", method), |b| {
            b.iter(|| {
                evaluate_ranking(black_box(&truth), black_box(&preds), &config, &Sequential)
                    .unwrap()
            });
        });

        for &threads in THREAD_COUNTS {
            let executor = RayonExecutor::with_threads(threads).unwrap();
            group.bench_function(
                BenchmarkId::new(format!("rayon_{}", method), format!("{}_threads", threads)),
                |b| {
                    b.iter(|| {
                        evaluate_ranking(black_box(&truth), black_box(&preds), &config, &executor)
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(
    name = throughput_benches;
    config = Criterion::default()
        .significance_level(0.05)
        .noise_threshold(0.02);
    targets = bench_rating, bench_ranking,
);

criterion_main!(throughput_benches);
