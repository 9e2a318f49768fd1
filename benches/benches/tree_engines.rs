// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_tree::{
    BranchId, Node, PickFlags, PickQuery, Tree, TreeParams, grow_from_node, prune, resolve, tick,
};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Line, Point, Size, Vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A tree grown `depth` generations deep, every generation fully matured.
fn bushy_tree(depth: usize, seed: u64) -> (Tree, Vec<BranchId>) {
    let params = TreeParams::default();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = Tree::for_viewport(Size::new(1600.0, 1200.0));
    let fan = grow_from_node(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();
    while tick(&mut tree, 100.0, &params, &mut rng) > 0 {}
    let mut frontier = fan.created.clone();
    for _ in 1..depth {
        let mut next = Vec::new();
        for id in frontier {
            if let Ok(g) = grow_from_node(&mut tree, Node::BranchEnd(id), &params, &mut rng) {
                next.extend(g.created);
            }
        }
        while tick(&mut tree, 100.0, &params, &mut rng) > 0 {}
        frontier = next;
    }
    (tree, fan.created)
}

fn cut_across(tree: &Tree, id: BranchId) -> Line {
    let b = tree.branch(id).unwrap();
    let mid = b.point_at(0.5);
    let d = b.direction();
    let normal = Vec2::new(-d.y, d.x) * 8.0;
    Line::new(mid - normal, mid + normal)
}

fn bench_prune(c: &mut Criterion) {
    let params = TreeParams::default();
    let mut group = c.benchmark_group("prune");
    for depth in [2_usize, 3, 4] {
        let (tree, fan) = bushy_tree(depth, 42);
        group.throughput(Throughput::Elements(tree.branch_count() as u64));
        let cut = cut_across(&tree, fan[2]);
        group.bench_function(format!("cascade_depth{depth}"), |b| {
            b.iter_batched(
                || tree.clone(),
                |mut t| black_box(prune(&mut t, cut, &params).unwrap()),
                BatchSize::SmallInput,
            );
        });
        let miss = Line::new(Point::new(1.0, 1.0), Point::new(40.0, 1.0));
        group.bench_function(format!("miss_depth{depth}"), |b| {
            b.iter_batched(
                || tree.clone(),
                |mut t| black_box(prune(&mut t, miss, &params).unwrap()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let params = TreeParams::default();
    let mut group = c.benchmark_group("resolve");
    let (tree, _) = bushy_tree(4, 7);
    let ends: Vec<Point> = tree.branches().map(|(_, b)| b.end).collect();
    group.throughput(Throughput::Elements(ends.len() as u64));
    for (name, flags) in [
        ("branch_ends", PickFlags::default()),
        ("all_targets", PickFlags::all()),
    ] {
        let query = PickQuery {
            camera: Vec2::ZERO,
            flags,
            root_topic: Some("bench"),
        };
        group.bench_function(format!("every_end_{name}"), |b| {
            b.iter(|| {
                for &p in &ends {
                    black_box(resolve(&tree, p, &query, &params));
                }
            });
        });
    }
    let query = PickQuery {
        camera: Vec2::ZERO,
        flags: PickFlags::default(),
        root_topic: None,
    };
    group.bench_function("empty_space", |b| {
        b.iter(|| black_box(resolve(&tree, Point::new(3.0, 3.0), &query, &params)));
    });
    group.finish();
}

fn bench_growth(c: &mut Criterion) {
    let params = TreeParams::default();
    let mut group = c.benchmark_group("growth");
    group.bench_function("fan_to_maturity", |b| {
        b.iter_batched(
            || {
                let mut rng = StdRng::seed_from_u64(1);
                let mut tree = Tree::for_viewport(Size::new(1200.0, 800.0));
                grow_from_node(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();
                (tree, rng)
            },
            |(mut tree, mut rng)| {
                while tick(&mut tree, 16.0, &params, &mut rng) > 0 {}
                black_box(tree)
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_prune, bench_resolve, bench_growth);
criterion_main!(benches);
