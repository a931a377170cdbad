//! Simulation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use snowball_sim::{sample_indices, update, Simulation, SnowballConfig, SnowballState, Vote};

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");

    for sample_size in [10usize, 20, 40].iter() {
        group.throughput(Throughput::Elements(*sample_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(sample_size),
            sample_size,
            |b, &k| {
                let config = SnowballConfig::new(k, k * 3 / 4, 20).unwrap();
                let sampled = vec![Vote::Yes; k];

                b.iter(|| {
                    let mut state = SnowballState::new(Vote::Yes);
                    update(&mut state, black_box(&sampled), &config)
                });
            },
        );
    }

    group.finish();
}

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_indices");

    for population in [100usize, 1_000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(population),
            population,
            |b, &n| {
                let mut rng = StdRng::seed_from_u64(1);
                b.iter(|| sample_indices(&mut rng, n, black_box(n / 2), 20));
            },
        );
    }

    group.finish();
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    group.sample_size(20);

    for population in [100usize, 400].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(population),
            population,
            |b, &n| {
                b.iter(|| {
                    let report = Simulation::builder()
                        .population_size(n)
                        .weights(0.55, 0.45)
                        .sample_size(10)
                        .quorum_size(9)
                        .decision_threshold(20)
                        .max_rounds(1_000)
                        .seed(42)
                        .build()
                        .unwrap()
                        .run();
                    black_box(report.outcome)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_update, bench_sampling, bench_full_run);
criterion_main!(benches);
