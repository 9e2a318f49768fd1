// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reposition engine: dragging a branch end and carrying its subtree along.

use std::collections::VecDeque;

use hashbrown::HashSet;
use kurbo::{Point, Vec2};
use tracing::info;

use crate::error::Rejection;
use crate::params::TreeParams;
use crate::tree::Tree;
use crate::types::{BranchId, Node};

/// Outcome of [`reposition`].
#[derive(Clone, Debug, PartialEq)]
pub struct Reposition {
    /// The branch whose end moved.
    pub branch: BranchId,
    /// End before the move.
    pub old_end: Point,
    /// End after the move (clamped).
    pub new_end: Point,
    /// Descendant branches translated with it, in creation order.
    pub carried: Vec<BranchId>,
}

impl Reposition {
    /// Status line for the UI.
    pub fn status(&self) -> String {
        if self.carried.is_empty() {
            "Branch moved and resized!".into()
        } else {
            format!(
                "Branch moved and resized, carrying {} branches along!",
                self.carried.len()
            )
        }
    }
}

/// Move the end of the branch under `node` towards `target` (model space).
///
/// The branch keeps its start; its new length is the distance to `target`
/// clamped to [`TreeParams::reposition_length`] and becomes its final size.
/// Every branch hanging off the old end is translated by the same delta, so
/// joints stay connected and child ends stay on their rays. Anchored leaves
/// are re-derived and flowers and fruit move with their branch.
///
/// Repeating a reposition with the same target is a no-op.
pub fn reposition(
    tree: &mut Tree,
    node: Node,
    target: Point,
    params: &TreeParams,
) -> Result<Reposition, Rejection> {
    let tol = params.joint_tolerance;
    let id = match node {
        Node::TrunkTop => return Err(Rejection::TrunkImmovable),
        Node::BranchEnd(id) if tree.is_alive(id) => id,
        other => {
            let p = tree.node_position(other).ok_or(Rejection::NoBranchEnd)?;
            tree.first_ending_near(p, tol).ok_or(Rejection::NoBranchEnd)?
        }
    };
    let Some(branch) = tree.branch(id) else {
        return Err(Rejection::NoBranchEnd);
    };
    let old_end = branch.end;

    let v = target - branch.start;
    let length = params.reposition_length.clamp(v.hypot());
    let angle = if v.hypot2() > 0.0 { v.atan2() } else { branch.angle };

    let carried = descendants(tree, id, old_end, tol);

    let new_end = tree
        .update_branch(id, |b| {
            b.angle = angle;
            b.length = length;
            b.max_length = length;
            b.end = b.tip_at(length);
            b.end
        })
        .ok_or(Rejection::NoBranchEnd)?;
    let delta = new_end - old_end;

    if delta != Vec2::ZERO {
        for &child in &carried {
            let _ = tree.update_branch(child, |b| {
                b.start += delta;
                b.end += delta;
            });
        }
    }

    let mut moved: HashSet<BranchId> = carried.iter().copied().collect();
    let _ = moved.insert(id);
    tree.translate_decorations_on(&moved, delta);
    tree.refresh_leaves(&moved);

    info!(branch = %id, carried = carried.len(), length, "repositioned");
    Ok(Reposition {
        branch: id,
        old_end,
        new_end,
        carried,
    })
}

/// Branches reachable from `joint` by start/end adjacency, excluding `root`.
fn descendants(tree: &Tree, root: BranchId, joint: Point, tol: f64) -> Vec<BranchId> {
    let mut seen = HashSet::new();
    let _ = seen.insert(root);
    let mut out = Vec::new();
    let mut frontier = VecDeque::from([joint]);
    while let Some(p) = frontier.pop_front() {
        for id in tree.branches_starting_near(p, tol) {
            if !seen.insert(id) {
                continue;
            }
            if let Some(b) = tree.branch(id) {
                frontier.push_back(b.end);
                out.push(id);
            }
        }
    }
    let order: Vec<BranchId> = tree.branches().map(|(id, _)| id).collect();
    out.sort_by_key(|id| order.iter().position(|o| o == id));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TRUNK_HEIGHT;
    use crate::types::{Branch, Flower, FlowerKind, Leaf, LeafAnchor};
    use core::f64::consts::FRAC_PI_2;

    fn chain() -> (Tree, BranchId, BranchId, BranchId) {
        let mut t = Tree::new(Point::new(0.0, 100.0), TRUNK_HEIGHT);
        let a = t.insert_branch(Branch::new(t.trunk_top(), -FRAC_PI_2, 100.0, 100.0));
        let end = t.branch(a).unwrap().end;
        let b = t.insert_branch(Branch::new(end, -1.0, 50.0, 50.0));
        let c = t.insert_branch(Branch::new(t.branch(b).unwrap().end, -2.0, 30.0, 90.0));
        (t, a, b, c)
    }

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn trunk_is_immovable() {
        let (mut t, ..) = chain();
        assert_eq!(
            reposition(&mut t, Node::TrunkTop, Point::new(5.0, 5.0), &TreeParams::default()),
            Err(Rejection::TrunkImmovable)
        );
    }

    #[test]
    fn length_is_clamped_and_becomes_final() {
        let (mut t, a, ..) = chain();
        let params = TreeParams::default();
        let start = t.branch(a).unwrap().start;
        let r = reposition(&mut t, Node::BranchEnd(a), start + Vec2::new(500.0, 0.0), &params)
            .unwrap();
        let b = t.branch(a).unwrap();
        assert_eq!(b.length, 200.0);
        assert_eq!(b.max_length, 200.0);
        assert!(close(r.new_end, start + Vec2::new(200.0, 0.0)));

        let _ = reposition(&mut t, Node::BranchEnd(a), start + Vec2::new(1.0, 0.0), &params)
            .unwrap();
        assert_eq!(t.branch(a).unwrap().length, 5.0);
    }

    #[test]
    fn children_follow_the_moved_joint() {
        let (mut t, a, b, c) = chain();
        let before_c = t.branch(c).unwrap().clone();
        let target = Point::new(60.0, -40.0);
        let r = reposition(&mut t, Node::BranchEnd(a), target, &TreeParams::default()).unwrap();
        assert_eq!(r.carried, vec![b, c]);

        let new_end = t.branch(a).unwrap().end;
        assert!(close(t.branch(b).unwrap().start, new_end));
        assert!(close(t.branch(c).unwrap().start, t.branch(b).unwrap().end));
        let after_c = t.branch(c).unwrap();
        assert_eq!(after_c.length, before_c.length);
        assert_eq!(after_c.angle, before_c.angle);
        assert_eq!(t.branches_starting_near(new_end, 1.0), vec![b]);
    }

    #[test]
    fn repeat_with_same_target_does_not_drift() {
        let (mut t, a, b, _) = chain();
        let params = TreeParams::default();
        let target = Point::new(-70.0, -10.0);
        let _ = reposition(&mut t, Node::BranchEnd(a), target, &params).unwrap();
        let snapshot: Vec<Branch> = t.branches().map(|(_, b)| b.clone()).collect();
        let again = reposition(&mut t, Node::BranchEnd(a), target, &params).unwrap();
        let after: Vec<Branch> = t.branches().map(|(_, b)| b.clone()).collect();
        assert_eq!(snapshot, after);
        assert_eq!(again.old_end, again.new_end);
        assert_eq!(again.carried.first(), Some(&b));
    }

    #[test]
    fn leaves_and_flowers_move_with_the_branch() {
        let (mut t, a, b, _) = chain();
        let anchor = LeafAnchor {
            branch: a,
            t: 0.5,
            offset: Vec2::new(3.0, -2.0),
        };
        let position = anchor.resolve(t.branch(a).unwrap());
        t.push_leaf(Leaf {
            position,
            size: 9.0,
            angle: 0.0,
            sway: 0.0,
            anchor: Some(anchor),
        });
        let b_end = t.branch(b).unwrap().end;
        t.push_flower(Flower {
            position: b_end,
            kind: FlowerKind::Daisy,
            size: 30.0,
            sway: 0.0,
            branch: b,
        });

        let target = Point::new(40.0, 0.0);
        let r = reposition(&mut t, Node::BranchEnd(a), target, &TreeParams::default()).unwrap();
        let expected = anchor.resolve(t.branch(a).unwrap());
        assert!(close(t.leaves()[0].position, expected));
        let moved = t.flower_on(b).unwrap().position;
        assert!(close(moved, b_end + (r.new_end - r.old_end)));
        assert!(close(moved, t.branch(b).unwrap().end));
    }
}
