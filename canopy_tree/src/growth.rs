// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Growth engine: sprouting new branches from nodes and growing them over time.

use hashbrown::HashSet;
use kurbo::Point;
use rand::Rng;
use tracing::{debug, info};

use crate::error::Rejection;
use crate::geometry::within_window;
use crate::params::TreeParams;
use crate::tree::Tree;
use crate::types::{Branch, BranchId, Node};

/// What kind of growth happened.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GrowthKind {
    /// The first symmetric fan from a bare trunk.
    Fan,
    /// A random sprout from an existing node.
    Sprout,
}

/// Outcome of [`grow_from_node`].
#[derive(Clone, Debug, PartialEq)]
pub struct Growth {
    /// Fan or sprout.
    pub kind: GrowthKind,
    /// Node the branches grew from.
    pub node: Node,
    /// Joint the branches start at.
    pub origin: Point,
    /// Branch ending at `origin`, if any.
    pub parent: Option<BranchId>,
    /// New branches in creation order.
    pub created: Vec<BranchId>,
}

impl Growth {
    /// Status line for the UI.
    pub fn status(&self) -> String {
        match self.kind {
            GrowthKind::Fan => format!("Grew {} branches from trunk!", self.created.len()),
            GrowthKind::Sprout => format!("Grew {} branches from node!", self.created.len()),
        }
    }
}

/// Grow branches from `node`.
///
/// A bare trunk top gets the initial fan. Any other node (or a trunk top that
/// already has branches) sprouts a random handful of branches, unless it
/// already carries [`TreeParams::max_branches_per_node`].
///
/// New branches are created synchronously; attaching content to them is the
/// caller's business and never rolls growth back.
pub fn grow_from_node<R: Rng + ?Sized>(
    tree: &mut Tree,
    node: Node,
    params: &TreeParams,
    rng: &mut R,
) -> Result<Growth, Rejection> {
    let origin = tree.node_position(node).ok_or(Rejection::NoNode)?;
    let tol = params.joint_tolerance;
    let existing = tree.branches_starting_near(origin, tol).len();
    if existing >= params.max_branches_per_node {
        debug!(?node, existing, "growth rejected");
        return Err(Rejection::MaxBranches);
    }

    let at_trunk = within_window(origin, tree.trunk_top(), tol);
    if at_trunk && existing == 0 {
        let created = grow_fan(tree, params, rng);
        info!(count = created.len(), "grew initial fan");
        return Ok(Growth {
            kind: GrowthKind::Fan,
            node,
            origin: tree.trunk_top(),
            parent: None,
            created,
        });
    }

    let parent = if at_trunk {
        None
    } else {
        tree.first_ending_near(origin, tol)
    };
    let count = params.sprout_count.sample(rng);
    let mut created = Vec::with_capacity(count);
    for _ in 0..count {
        let branch = sprout(tree, origin, at_trunk, parent, params, rng);
        created.push(tree.insert_branch(branch));
    }
    info!(?node, count, ?parent, "sprouted branches");
    Ok(Growth {
        kind: GrowthKind::Sprout,
        node,
        origin,
        parent,
        created,
    })
}

fn grow_fan<R: Rng + ?Sized>(tree: &mut Tree, params: &TreeParams, rng: &mut R) -> Vec<BranchId> {
    let top = tree.trunk_top();
    (0..params.fan_count)
        .map(|i| {
            let max_length = params.fan_length.sample(rng);
            let mut branch = Branch::new(top, params.fan_angle(i), 0.0, max_length);
            branch.thickness = params.fan_thickness;
            tree.insert_branch(branch)
        })
        .collect()
}

fn sprout<R: Rng + ?Sized>(
    tree: &Tree,
    origin: Point,
    at_trunk: bool,
    parent: Option<BranchId>,
    params: &TreeParams,
    rng: &mut R,
) -> Branch {
    let base_length = params.sprout_base_length.sample(rng);
    let max_length = base_length * params.sprout_stretch.sample(rng);
    let parent_branch = parent.and_then(|id| tree.branch(id));

    let angle = if at_trunk {
        (rng.gen_range(0.0..1.0) - 0.5) * params.trunk_sprout_arc + params.trunk_sprout_bias
    } else {
        let parent_angle = parent_branch.map_or(0.0, |b| b.angle);
        parent_angle + (rng.gen_range(0.0..1.0) - 0.5) * params.sprout_wander
    };

    let thickness = if at_trunk {
        params.trunk_sprout_thickness
    } else {
        parent_branch.map_or(params.orphan_sprout_thickness, |b| {
            params.child_thickness(b.thickness)
        })
    };

    let mut branch = Branch::new(origin, angle, base_length, max_length);
    branch.thickness = thickness;
    branch.generation = parent_branch.map_or(1, |b| b.generation + 1);
    branch.parent = parent_branch.and(parent);
    branch
}

/// Advance every growing branch by `dt_ms` milliseconds.
///
/// Each branch draws its own rate from [`TreeParams::growth_rate`]; lengths
/// are clamped to `max_length` and ends are re-derived from the fixed angle.
/// Leaves anchored to a moving branch follow it. Returns the number of
/// branches that grew.
pub fn tick<R: Rng + ?Sized>(tree: &mut Tree, dt_ms: f64, params: &TreeParams, rng: &mut R) -> usize {
    let growing: Vec<BranchId> = tree
        .branches()
        .filter(|(_, b)| b.length < b.max_length)
        .map(|(id, _)| id)
        .collect();
    let mut changed = HashSet::new();
    for id in growing {
        let rate = params.growth_rate.sample(rng);
        let grew = tree.update_branch(id, |b| {
            let before = b.length;
            b.length = (b.length + rate * dt_ms * params.growth_scale)
                .clamp(0.0, b.max_length);
            b.end = b.tip_at(b.length);
            b.length != before
        });
        if grew == Some(true) {
            let _ = changed.insert(id);
        }
    }
    tree.refresh_leaves(&changed);
    changed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TRUNK_HEIGHT;
    use core::f64::consts::FRAC_PI_2;
    use kurbo::Size;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup() -> (Tree, TreeParams, StdRng) {
        (
            Tree::for_viewport(Size::new(800.0, 600.0)),
            TreeParams::default(),
            StdRng::seed_from_u64(42),
        )
    }

    fn grow_until_mature(tree: &mut Tree, params: &TreeParams, rng: &mut StdRng) {
        for _ in 0..10_000 {
            if tick(tree, 16.0, params, rng) == 0 {
                return;
            }
        }
        panic!("tree never matured");
    }

    fn on_ray(b: &Branch) -> bool {
        let expected = b.start + b.direction() * b.length;
        (expected - b.end).hypot() < 1e-9
    }

    #[test]
    fn bare_trunk_grows_symmetric_fan() {
        let (mut tree, params, mut rng) = setup();
        let g = grow_from_node(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();
        assert_eq!(g.kind, GrowthKind::Fan);
        assert_eq!(g.created.len(), 5);
        assert_eq!(g.status(), "Grew 5 branches from trunk!");

        let angles: Vec<f64> = g
            .created
            .iter()
            .map(|&id| {
                let b = tree.branch(id).unwrap();
                assert_eq!(b.generation, 1);
                assert_eq!(b.parent, None);
                assert_eq!(b.thickness, 15.0);
                assert!(params.fan_length.contains(b.max_length));
                b.angle
            })
            .collect();
        let left = angles[0] + FRAC_PI_2;
        let right = angles[4] + FRAC_PI_2;
        assert!((left + right).abs() < 1e-12, "fan is lopsided: {left} {right}");
        assert!((right - 0.4 * core::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn trunk_with_branches_sprouts_instead() {
        let (mut tree, params, mut rng) = setup();
        let _ = grow_from_node(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();
        let g = grow_from_node(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();
        assert_eq!(g.kind, GrowthKind::Sprout);
        assert!((3..=5).contains(&g.created.len()));
        for id in &g.created {
            let b = tree.branch(*id).unwrap();
            assert_eq!(b.thickness, 10.0);
            assert_eq!(b.generation, 1);
            assert_eq!(b.parent, None);
        }
    }

    #[test]
    fn max_branches_rejects_without_mutation() {
        let (mut tree, params, mut rng) = setup();
        let _ = grow_from_node(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();
        let _ = grow_from_node(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();
        assert!(tree.branch_count() >= 8);
        let before = tree.branch_count();
        assert_eq!(
            grow_from_node(&mut tree, Node::TrunkTop, &params, &mut rng),
            Err(Rejection::MaxBranches)
        );
        assert_eq!(tree.branch_count(), before);
    }

    #[test]
    fn sprouts_inherit_from_parent() {
        let (mut tree, params, mut rng) = setup();
        let top = tree.trunk_top();
        let mut parent = Branch::new(top, -FRAC_PI_2, 100.0, 100.0);
        parent.thickness = 15.0;
        let pid = tree.insert_branch(parent);
        let joint = tree.branch(pid).unwrap().end;

        let g = grow_from_node(&mut tree, Node::BranchEnd(pid), &params, &mut rng).unwrap();
        assert_eq!(g.parent, Some(pid));
        assert_eq!(g.status(), format!("Grew {} branches from node!", g.created.len()));
        for id in &g.created {
            let b = tree.branch(*id).unwrap();
            assert_eq!(b.parent, Some(pid));
            assert_eq!(b.generation, 2);
            assert_eq!(b.thickness, 12.0);
            assert_eq!(b.start, joint);
            let wander = (b.angle + FRAC_PI_2).abs();
            assert!(wander <= 0.4 * core::f64::consts::PI + 1e-12, "wandered {wander}");
            assert!(params.sprout_base_length.contains(b.length));
            assert!(b.max_length >= 2.0 * b.length - 1e-9);
            assert!(b.max_length <= 3.5 * b.length + 1e-9);
            assert!(on_ray(b));
        }
    }

    #[test]
    fn ticks_keep_lengths_bounded_and_ends_on_ray() {
        let (mut tree, params, mut rng) = setup();
        let _ = grow_from_node(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();
        for _ in 0..50 {
            let _ = tick(&mut tree, 250.0, &params, &mut rng);
            for (_, b) in tree.branches() {
                assert!(b.length >= 0.0 && b.length <= b.max_length);
                assert!(on_ray(b), "end drifted off the ray: {b:?}");
            }
        }
        grow_until_mature(&mut tree, &params, &mut rng);
        assert!(tree.branches().all(|(_, b)| b.is_mature()));
    }

    #[test]
    fn stale_node_is_rejected() {
        let (mut tree, params, mut rng) = setup();
        let id = tree.insert_branch(Branch::new(tree.trunk_top(), 0.0, 10.0, 10.0));
        tree.reset(tree.base());
        assert_eq!(
            grow_from_node(&mut tree, Node::BranchEnd(id), &params, &mut rng),
            Err(Rejection::NoNode)
        );
        assert_eq!(tree.trunk_height(), TRUNK_HEIGHT);
    }
}
