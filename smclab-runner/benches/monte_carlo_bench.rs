//! Criterion benchmarks for the simulation hot paths.
//!
//! Benchmarks:
//! 1. Single path shuffle + walk across trade counts
//! 2. Full Monte Carlo run across simulation counts
//! 3. Statistical validation of a long return series

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use smclab_runner::monte_carlo::{run_monte_carlo, simulate_path, MonteCarloConfig};
use smclab_runner::validation::StatisticalValidator;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_trades(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            120.0 * (x * 0.7).sin() + 35.0 * (x * 0.13).cos() + 10.0
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("path");
    for n in [50usize, 500] {
        let trades = make_trades(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &trades, |b, trades| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| simulate_path(black_box(trades), 10_000.0, &mut rng, false))
        });
    }
    group.finish();
}

fn bench_monte_carlo(c: &mut Criterion) {
    let trades = make_trades(200);
    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(10);
    for n_simulations in [1_000usize, 10_000] {
        let config = MonteCarloConfig {
            n_simulations,
            seed: Some(42),
            ..MonteCarloConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(n_simulations),
            &config,
            |b, config| b.iter(|| run_monte_carlo(black_box(&trades), config, None)),
        );
    }
    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let returns: Vec<f64> = make_trades(5_000).iter().map(|p| p / 10_000.0).collect();
    let validator = StatisticalValidator::default();
    c.bench_function("validation_5000", |b| {
        b.iter(|| validator.validate(black_box(&returns), None, None))
    });
}

criterion_group!(benches, bench_path, bench_monte_carlo, bench_validation);
criterion_main!(benches);
