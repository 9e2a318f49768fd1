// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decorations: leaves, flowers, and fruit.

use core::f64::consts::TAU;

use kurbo::{Point, Vec2};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::error::Rejection;
use crate::geometry::within_window;
use crate::params::TreeParams;
use crate::tree::Tree;
use crate::types::{BranchId, Flower, FlowerKind, Fruit, FruitKind, Leaf, LeafAnchor, Node};

/// Outcome of the leaf operations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeafGrowth {
    /// Branches that received leaves; empty for standalone leaves.
    pub branches: Vec<BranchId>,
    /// Leaves added.
    pub leaves: usize,
}

impl LeafGrowth {
    /// Status line for the UI.
    pub fn status(&self) -> String {
        format!(
            "Grew {} leaves on {} branches!",
            self.leaves,
            self.branches.len()
        )
    }
}

/// Outcome of [`grow_flower`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bloom {
    /// Branch the flower sits on.
    pub branch: BranchId,
    /// Variety.
    pub kind: FlowerKind,
}

impl Bloom {
    /// Status line for the UI.
    pub fn status(&self) -> String {
        format!("Blossomed knowledge with {} on branch end!", self.kind.name())
    }
}

/// Outcome of [`bear_fruit`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fruiting {
    /// Branch the fruit sits on.
    pub branch: BranchId,
    /// The flower that was replaced.
    pub flower: FlowerKind,
    /// The fruit that replaced it.
    pub fruit: FruitKind,
}

impl Fruiting {
    /// Status line for the UI.
    pub fn status(&self) -> String {
        format!(
            "Transformed {} into {} - fruit of labour!",
            self.flower.name(),
            self.fruit.name()
        )
    }
}

fn random_leaf<R: Rng + ?Sized>(
    anchor: Option<LeafAnchor>,
    position: Point,
    size: f64,
    rng: &mut R,
) -> Leaf {
    Leaf {
        position,
        size,
        angle: rng.gen_range(0.0..TAU),
        sway: rng.gen_range(0.0..TAU),
        anchor,
    }
}

/// Spread `count` leaves evenly along `id` (`t = (i + 1) / (count + 1)`), each
/// with a fixed random jitter.
fn leaves_along<R: Rng + ?Sized>(
    tree: &mut Tree,
    id: BranchId,
    count: usize,
    params: &TreeParams,
    rng: &mut R,
) -> usize {
    let mut added = 0;
    for i in 0..count {
        let Some(branch) = tree.branch(id) else { break };
        let j = params.leaf_jitter;
        let anchor = LeafAnchor {
            branch: id,
            t: (i + 1) as f64 / (count + 1) as f64,
            offset: Vec2::new(rng.gen_range(-j..=j), rng.gen_range(-j..=j)),
        };
        let position = anchor.resolve(branch);
        let size = params.leaf_size.sample(rng);
        let leaf = random_leaf(Some(anchor), position, size, rng);
        tree.push_leaf(leaf);
        added += 1;
    }
    added
}

/// Leaves tool: grow a few leaves on every branch starting at `node`.
pub fn grow_leaves<R: Rng + ?Sized>(
    tree: &mut Tree,
    node: Node,
    params: &TreeParams,
    rng: &mut R,
) -> Result<LeafGrowth, Rejection> {
    let origin = tree.node_position(node).ok_or(Rejection::NoLeafNode)?;
    let branches = tree.branches_starting_near(origin, params.joint_tolerance);
    if branches.is_empty() {
        return Err(Rejection::NoBranchesAtNode);
    }
    let mut leaves = 0;
    for &id in &branches {
        let count = params.leaves_per_branch.sample(rng);
        leaves += leaves_along(tree, id, count, params, rng);
    }
    info!(leaves, branches = branches.len(), "grew leaves");
    Ok(LeafGrowth { branches, leaves })
}

/// Attach `count` leaves to the branch ending at `at`.
///
/// When no branch ends there, the leaves are standalone: spread on a ring
/// around `at` and never cleaned up by pruning.
pub fn add_leaves<R: Rng + ?Sized>(
    tree: &mut Tree,
    at: Point,
    count: usize,
    params: &TreeParams,
    rng: &mut R,
) -> LeafGrowth {
    if let Some(id) = tree.first_ending_near(at, params.joint_tolerance) {
        let leaves = leaves_along(tree, id, count, params, rng);
        return LeafGrowth {
            branches: vec![id],
            leaves,
        };
    }
    for i in 0..count {
        let angle = i as f64 / count as f64 * TAU;
        let distance = params.leaf_ring.sample(rng);
        let position = at + Vec2::from_angle(angle) * distance;
        let size = params.standalone_leaf_size.sample(rng);
        let leaf = random_leaf(None, position, size, rng);
        tree.push_leaf(leaf);
    }
    LeafGrowth {
        branches: Vec::new(),
        leaves: count,
    }
}

/// Flower tool: blossom on a fully grown branch end that already has leaves.
pub fn grow_flower<R: Rng + ?Sized>(
    tree: &mut Tree,
    node: Node,
    params: &TreeParams,
    rng: &mut R,
) -> Result<Bloom, Rejection> {
    if node == Node::TrunkTop {
        return Err(Rejection::FlowerOnTrunk);
    }
    let at = tree.node_position(node).ok_or(Rejection::NoBloomNode)?;
    let tol = params.joint_tolerance;
    if within_window(at, tree.trunk_top(), tol) {
        return Err(Rejection::FlowerOnTrunk);
    }
    let ending = tree.branches_ending_near(at, tol);
    if !ending
        .iter()
        .any(|&id| tree.branch(id).is_some_and(|b| b.is_mature()))
    {
        return Err(Rejection::FlowerOnImmature);
    }
    // Some end here is fully grown; the flower goes on the oldest one.
    let id = ending[0];
    if tree.leaves_on(id).next().is_none() {
        return Err(Rejection::FlowerWithoutLeaves);
    }
    let spacing = params.decoration_spacing;
    if tree
        .fruit_on(id)
        .is_some_and(|f| within_window(f.position, at, spacing))
    {
        return Err(Rejection::FruitInTheWay);
    }
    if tree
        .flowers()
        .iter()
        .any(|f| within_window(f.position, at, spacing))
    {
        return Err(Rejection::FlowerExists);
    }

    let kind = FlowerKind::ALL
        .choose(rng)
        .copied()
        .unwrap_or(FlowerKind::Blossom);
    tree.push_flower(Flower {
        position: at,
        kind,
        size: params.flower_size.sample(rng),
        sway: rng.gen_range(0.0..TAU),
        branch: id,
    });
    info!(branch = %id, kind = kind.name(), "flower bloomed");
    Ok(Bloom { branch: id, kind })
}

/// Fruit tool: turn the flower under `node` into fruit.
pub fn bear_fruit<R: Rng + ?Sized>(
    tree: &mut Tree,
    node: Node,
    params: &TreeParams,
    rng: &mut R,
) -> Result<Fruiting, Rejection> {
    let Node::Flower(id) = node else {
        return Err(Rejection::NotAFlower);
    };
    let Some(at) = tree.flower_on(id).map(|f| f.position) else {
        return Err(Rejection::NotAFlower);
    };
    if tree
        .fruits()
        .iter()
        .any(|f| within_window(f.position, at, params.decoration_spacing))
    {
        return Err(Rejection::FruitExists);
    }
    let flower = tree.take_flower(id).ok_or(Rejection::NotAFlower)?;
    let fruit = FruitKind::Apple;
    tree.push_fruit(Fruit {
        position: flower.position,
        kind: fruit,
        size: params.fruit_size.sample(rng),
        sway: rng.gen_range(0.0..TAU),
        branch: id,
    });
    info!(branch = %id, "flower turned to fruit");
    Ok(Fruiting {
        branch: id,
        flower: flower.kind,
        fruit,
    })
}

/// Harvest tool: pick the fruit under `node`.
pub fn harvest(tree: &mut Tree, node: Node) -> Result<Fruit, Rejection> {
    let Node::Fruit(id) = node else {
        return Err(Rejection::NotAFruit);
    };
    let fruit = tree.take_fruit(id).ok_or(Rejection::NotAFruit)?;
    info!(branch = %id, "fruit harvested");
    Ok(fruit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TRUNK_HEIGHT;
    use crate::types::Branch;
    use core::f64::consts::FRAC_PI_2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup() -> (Tree, BranchId, TreeParams, StdRng) {
        let mut t = Tree::new(Point::new(0.0, 200.0), TRUNK_HEIGHT);
        let id = t.insert_branch(Branch::new(t.trunk_top(), -FRAC_PI_2, 100.0, 100.0));
        (t, id, TreeParams::default(), StdRng::seed_from_u64(3))
    }

    #[test]
    fn leaves_tool_spreads_leaves_along_branches_from_node() {
        let (mut t, id, params, mut rng) = setup();
        let g = grow_leaves(&mut t, Node::TrunkTop, &params, &mut rng).unwrap();
        assert_eq!(g.branches, vec![id]);
        assert!((2..=4).contains(&g.leaves));
        assert_eq!(g.status(), format!("Grew {} leaves on 1 branches!", g.leaves));
        let b = t.branch(id).unwrap().clone();
        for (i, leaf) in t.leaves_on(id).enumerate() {
            let a = leaf.anchor.unwrap();
            assert!((a.t - (i + 1) as f64 / (g.leaves + 1) as f64).abs() < 1e-12);
            assert!(a.offset.x.abs() <= 3.0 && a.offset.y.abs() <= 3.0);
            assert_eq!(leaf.position, a.resolve(&b));
        }
    }

    #[test]
    fn leaves_tool_needs_branches() {
        let (mut t, id, params, mut rng) = setup();
        assert_eq!(
            grow_leaves(&mut t, Node::BranchEnd(id), &params, &mut rng),
            Err(Rejection::NoBranchesAtNode)
        );
        assert!(t.leaves().is_empty());
    }

    #[test]
    fn add_leaves_falls_back_to_standalone_ring() {
        let (mut t, id, params, mut rng) = setup();
        let end = t.branch(id).unwrap().end;
        let anchored = add_leaves(&mut t, end, 5, &params, &mut rng);
        assert_eq!(anchored.branches, vec![id]);
        assert_eq!(t.leaves_on(id).count(), 5);

        let far = Point::new(500.0, 500.0);
        let loose = add_leaves(&mut t, far, 3, &params, &mut rng);
        assert!(loose.branches.is_empty());
        let standalone: Vec<&Leaf> = t.leaves().iter().filter(|l| l.anchor.is_none()).collect();
        assert_eq!(standalone.len(), 3);
        for l in standalone {
            let r = l.position.distance(far);
            assert!((15.0 - 1e-9..=25.0 + 1e-9).contains(&r), "ring radius {r}");
        }
    }

    #[test]
    fn flower_rules_apply_in_order() {
        let (mut t, id, params, mut rng) = setup();
        assert_eq!(
            grow_flower(&mut t, Node::TrunkTop, &params, &mut rng),
            Err(Rejection::FlowerOnTrunk)
        );
        assert_eq!(
            grow_flower(&mut t, Node::BranchEnd(id), &params, &mut rng),
            Err(Rejection::FlowerWithoutLeaves)
        );
        let end = t.branch(id).unwrap().end;
        let _ = add_leaves(&mut t, end, 2, &params, &mut rng);
        let bloom = grow_flower(&mut t, Node::BranchEnd(id), &params, &mut rng).unwrap();
        assert_eq!(bloom.branch, id);
        assert!(bloom.status().starts_with("Blossomed knowledge with"));
        assert_eq!(t.flower_on(id).unwrap().position, end);
        assert_eq!(
            grow_flower(&mut t, Node::BranchEnd(id), &params, &mut rng),
            Err(Rejection::FlowerExists)
        );
    }

    #[test]
    fn immature_ends_do_not_bloom() {
        let (mut t, _, params, mut rng) = setup();
        let young = t.insert_branch(Branch::new(t.trunk_top(), 0.0, 40.0, 90.0));
        let end = t.branch(young).unwrap().end;
        let _ = add_leaves(&mut t, end, 2, &params, &mut rng);
        assert_eq!(
            grow_flower(&mut t, Node::BranchEnd(young), &params, &mut rng),
            Err(Rejection::FlowerOnImmature)
        );
    }

    #[test]
    fn flower_goes_on_the_oldest_end_once_any_is_grown() {
        let (mut t, grown, params, mut rng) = setup();
        let end = t.branch(grown).unwrap().end;
        // A younger sprout whose tip happens to sit at the same joint.
        let young = t.insert_branch(Branch::new(end + Vec2::new(0.0, 40.0), -FRAC_PI_2, 40.0, 90.0));
        assert!(t.branches_ending_near(end, params.joint_tolerance).contains(&young));
        let _ = add_leaves(&mut t, end, 2, &params, &mut rng);

        let bloom = grow_flower(&mut t, Node::BranchEnd(young), &params, &mut rng).unwrap();
        assert_eq!(bloom.branch, grown);
        assert!(t.flower_on(young).is_none());
    }

    #[test]
    fn fruit_replaces_flower_and_can_be_harvested() {
        let (mut t, id, params, mut rng) = setup();
        let end = t.branch(id).unwrap().end;
        let _ = add_leaves(&mut t, end, 2, &params, &mut rng);
        assert_eq!(
            bear_fruit(&mut t, Node::BranchEnd(id), &params, &mut rng),
            Err(Rejection::NotAFlower)
        );
        let bloom = grow_flower(&mut t, Node::BranchEnd(id), &params, &mut rng).unwrap();

        let f = bear_fruit(&mut t, Node::Flower(id), &params, &mut rng).unwrap();
        assert_eq!(f.flower, bloom.kind);
        assert!(t.flower_on(id).is_none());
        let fruit = t.fruit_on(id).unwrap();
        assert_eq!(fruit.position, end);
        assert!(params.fruit_size.contains(fruit.size));
        assert_eq!(
            grow_flower(&mut t, Node::BranchEnd(id), &params, &mut rng),
            Err(Rejection::FruitInTheWay)
        );

        assert_eq!(harvest(&mut t, Node::Flower(id)), Err(Rejection::NotAFruit));
        let picked = harvest(&mut t, Node::Fruit(id)).unwrap();
        assert_eq!(picked.branch, id);
        assert!(t.fruits().is_empty());
    }
}
