// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_index::JointIndex;
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_joints(count: usize, extent: f64, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (rng.gen_range(-extent..extent), rng.gen_range(-extent..extent)))
        .collect()
}

fn filled(points: &[(f64, f64)]) -> JointIndex<u32> {
    let mut index = JointIndex::new(5.0);
    for (i, &(x, y)) in points.iter().enumerate() {
        index.insert(x, y, i as u32);
    }
    index
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("joint_insert");
    for n in [100_usize, 1_000, 10_000] {
        let points = random_joints(n, 800.0, 1);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("n{n}"), |b| {
            b.iter(|| black_box(filled(&points)));
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("joint_query_near");
    for n in [100_usize, 1_000, 10_000] {
        let points = random_joints(n, 800.0, 2);
        let index = filled(&points);
        let probes = random_joints(256, 800.0, 3);
        group.throughput(Throughput::Elements(probes.len() as u64));
        group.bench_function(format!("n{n}"), |b| {
            b.iter(|| {
                let mut hits = 0;
                for &(x, y) in &probes {
                    hits += index.query_near(x, y, 5.0).count();
                }
                black_box(hits)
            });
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("joint_update");
    let points = random_joints(1_000, 800.0, 4);
    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("translate_all", |b| {
        b.iter_batched(
            || {
                let mut index = JointIndex::new(5.0);
                let keys: Vec<_> = points
                    .iter()
                    .enumerate()
                    .map(|(i, &(x, y))| index.insert(x, y, i as u32))
                    .collect();
                (index, keys)
            },
            |(mut index, keys)| {
                for (&key, &(x, y)) in keys.iter().zip(&points) {
                    index.update(key, x + 12.0, y - 7.0);
                }
                black_box(index)
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_query, bench_update);
criterion_main!(benches);
