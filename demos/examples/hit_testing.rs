// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing per tool.
//!
//! A flower and a fruit sit on branch ends. The same screen point resolves
//! to different nodes depending on which tool is active, and hover
//! transitions follow the pointer across nodes. Panning the camera shifts
//! everything by the offset.
//!
//! Run:
//! - `cargo run -p canopy_demos --example hit_testing`

use canopy_responder::adapters::tree::{hover_at, pick};
use canopy_responder::gesture::GestureState;
use canopy_responder::hover::{HoverEvent, HoverState};
use canopy_responder::types::{Intent, Tool};
use canopy_tree::{Node, Tree, TreeParams, decorate, grow_from_node, tick};
use kurbo::{Point, Size, Vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() {
    let params = TreeParams::default();
    let mut rng = StdRng::seed_from_u64(3);
    let mut tree = Tree::for_viewport(Size::new(800.0, 600.0));
    let fan = grow_from_node(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();
    while tick(&mut tree, 100.0, &params, &mut rng) > 0 {}
    decorate::grow_leaves(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();

    let (left, right) = (fan.created[0], fan.created[4]);
    decorate::grow_flower(&mut tree, Node::BranchEnd(left), &params, &mut rng).unwrap();
    decorate::grow_flower(&mut tree, Node::BranchEnd(right), &params, &mut rng).unwrap();
    decorate::bear_fruit(&mut tree, Node::Flower(right), &params, &mut rng).unwrap();

    let left_end = tree.branch(left).unwrap().end;
    let right_end = tree.branch(right).unwrap().end;

    println!("== Same point, different tools ==");
    for tool in [Tool::Growth, Tool::Fruit, Tool::Harvest, Tool::Study] {
        let at_flower = pick(&tree, tool, left_end, Vec2::ZERO, Some("botany"), &params);
        let at_fruit = pick(&tree, tool, right_end, Vec2::ZERO, Some("botany"), &params);
        println!(
            "  {:<8} flower end -> {:?}, fruit end -> {:?}",
            tool.name(),
            at_flower.map(|h| h.node),
            at_fruit.map(|h| h.node)
        );
    }
    let harvest = pick(&tree, Tool::Harvest, right_end, Vec2::ZERO, None, &params);
    assert_eq!(harvest.map(|h| h.node), Some(Node::Fruit(right)));
    let fruit = pick(&tree, Tool::Fruit, left_end, Vec2::ZERO, None, &params);
    assert_eq!(fruit.map(|h| h.node), Some(Node::Flower(left)));

    // The trunk top carries the session topic
    let trunk = pick(&tree, Tool::Study, tree.trunk_top(), Vec2::ZERO, Some("botany"), &params).unwrap();
    println!("  trunk top -> {:?}", trunk.content.map(|c| c.title));

    println!("== Hover ==");
    let mut hover: HoverState<Node> = HoverState::new();
    let path = [left_end, Point::new(5.0, 5.0), tree.trunk_top(), right_end];
    for p in path {
        let events = hover_at(&mut hover, &tree, Tool::Growth, p, Vec2::ZERO, &params);
        println!("  {p:?}: {events:?}");
    }
    assert_eq!(hover.current(), Some(Node::BranchEnd(right)));
    let cleared = hover_at(&mut hover, &tree, Tool::Cut, right_end, Vec2::ZERO, &params);
    assert_eq!(cleared, vec![HoverEvent::Leave(Node::BranchEnd(right))]);

    println!("== Camera ==");
    let camera = Vec2::new(-120.0, 30.0);
    let screen = left_end + camera;
    let hit = pick(&tree, Tool::Growth, screen, camera, None, &params);
    println!("  {screen:?} with camera {camera:?} -> {:?}", hit.as_ref().map(|h| h.node));
    assert_eq!(hit.map(|h| h.node), Some(Node::BranchEnd(left)));

    println!("== Gestures ==");
    let mut gesture: GestureState<Node> = GestureState::new(Tool::Cut);
    let _ = gesture.pointer_down(Point::new(100.0, 100.0), None);
    let cut = gesture.pointer_up(Point::new(160.0, 120.0));
    println!("  cut stroke: {cut:?}");
    assert!(matches!(cut, Some(Intent::Cut(_))));
}
