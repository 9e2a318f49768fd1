// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree basics.
//!
//! Grow a fan from the trunk, let it mature, sprout from one end, bend a
//! branch, then cut it and watch its subtree go with it.
//!
//! Run:
//! - `cargo run -p canopy_demos --example tree_basics`

use canopy_tree::{Node, Tree, TreeParams, decorate, grow_from_node, prune, reposition, tick};
use kurbo::{Line, Point, Size, Vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn grow_up(tree: &mut Tree, params: &TreeParams, rng: &mut StdRng) -> usize {
    let mut ticks = 0;
    while tick(tree, 16.0, params, rng) > 0 {
        ticks += 1;
    }
    ticks
}

fn main() {
    let params = TreeParams::default();
    let mut rng = StdRng::seed_from_u64(7);
    let mut tree = Tree::for_viewport(Size::new(1200.0, 800.0));
    println!("trunk top at {:?}", tree.trunk_top());

    // Fan from the trunk
    let fan = grow_from_node(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();
    println!("{}", fan.status());
    println!("fan matured after {} ticks", grow_up(&mut tree, &params, &mut rng));

    // Sprout from the middle branch
    let middle = fan.created[2];
    let sprout = grow_from_node(&mut tree, Node::BranchEnd(middle), &params, &mut rng).unwrap();
    println!("{}", sprout.status());
    grow_up(&mut tree, &params, &mut rng);
    for &id in &sprout.created {
        let b = tree.branch(id).unwrap();
        println!(
            "  {id}: generation {} thickness {:.1} length {:.1}",
            b.generation, b.thickness, b.length
        );
    }

    // Leaves on every fan branch
    let leaves = decorate::grow_leaves(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();
    println!("{}", leaves.status());

    // Pull the middle branch sideways: the sprouts follow
    let end = tree.branch(middle).unwrap().end;
    let moved = reposition(
        &mut tree,
        Node::BranchEnd(middle),
        end + Vec2::new(25.0, 10.0),
        &params,
    )
    .unwrap();
    println!("{}", moved.status());
    assert_eq!(moved.carried.len(), sprout.created.len());
    for &id in &sprout.created {
        assert_eq!(tree.branch(id).unwrap().start, moved.new_end);
    }

    // Cut across the middle branch
    let b = tree.branch(middle).unwrap();
    let mid = b.point_at(0.5);
    let normal = Vec2::new(-b.direction().y, b.direction().x) * 15.0;
    let report = prune(&mut tree, Line::new(mid - normal, mid + normal), &params).unwrap();
    println!("{}", report.status());
    println!(
        "  direct {:?}, cascaded {:?}, leaves dropped {}",
        report.direct, report.cascaded, report.dropped.leaves
    );
    assert_eq!(report.direct, vec![middle]);
    assert_eq!(report.cascaded.len(), sprout.created.len());
    assert!(!tree.is_alive(middle));

    // A miss is not an error
    let far = Point::new(5.0, 5.0);
    let miss = prune(&mut tree, Line::new(far, far + Vec2::new(30.0, 0.0)), &params).unwrap();
    println!("{}", miss.status());
    println!("{} branches remain", tree.branch_count());
}
