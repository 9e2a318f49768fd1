// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pruning engine: cut-line severing with cascading disconnection.

use std::collections::VecDeque;

use hashbrown::HashSet;
use kurbo::Line;
use tracing::{debug, info};

use crate::error::Rejection;
use crate::geometry::segments_intersect;
use crate::params::TreeParams;
use crate::tree::{Dropped, Tree};
use crate::types::BranchId;

/// Outcome of [`prune`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Branches the cut crossed, in creation order.
    pub direct: Vec<BranchId>,
    /// Branches orphaned by the cut, in creation order.
    pub cascaded: Vec<BranchId>,
    /// Decorations removed with them.
    pub dropped: Dropped,
}

impl PruneReport {
    /// Total branches removed.
    pub fn removed(&self) -> usize {
        self.direct.len() + self.cascaded.len()
    }

    /// Every removed branch, direct hits first.
    pub fn removed_ids(&self) -> impl Iterator<Item = BranchId> + '_ {
        self.direct.iter().chain(&self.cascaded).copied()
    }

    /// Status line for the UI.
    pub fn status(&self) -> String {
        if self.removed() == 0 {
            "The cut missed every fully grown branch.".into()
        } else {
            format!("Pruned {} branches!", self.removed())
        }
    }

    /// How the removed branches split between the cut and the cascade.
    pub fn breakdown(&self) -> String {
        format!(
            "{} branches ({} directly cut, {} disconnected)",
            self.removed(),
            self.direct.len(),
            self.cascaded.len()
        )
    }
}

/// Cut the tree along `cut`.
///
/// Only fully grown branches can be cut. Every branch that is no longer
/// reachable from the trunk top through the remaining branches is removed
/// too, together with every leaf, flower and fruit keyed to a removed
/// branch. The removal set is computed in full before the tree is touched.
///
/// A cut that misses is not an error: it returns an empty report.
pub fn prune(tree: &mut Tree, cut: Line, params: &TreeParams) -> Result<PruneReport, Rejection> {
    if cut.length() < params.min_cut_length {
        debug!(length = cut.length(), "cut too short");
        return Err(Rejection::CutTooShort);
    }

    let direct: Vec<BranchId> = tree
        .branches()
        .filter(|(_, b)| b.is_mature() && segments_intersect(cut, b.segment()))
        .map(|(id, _)| id)
        .collect();
    if direct.is_empty() {
        debug!("cut missed");
        return Ok(PruneReport::default());
    }

    let severed: HashSet<BranchId> = direct.iter().copied().collect();
    let reached = reachable_from_trunk(tree, &severed, params.joint_tolerance);
    let cascaded: Vec<BranchId> = tree
        .branches()
        .map(|(id, _)| id)
        .filter(|id| !severed.contains(id) && !reached.contains(id))
        .collect();

    let mut removal = severed;
    removal.extend(cascaded.iter().copied());
    let dropped = tree.remove_branches(&removal);

    let report = PruneReport {
        direct,
        cascaded,
        dropped,
    };
    info!(
        removed = report.removed(),
        direct = report.direct.len(),
        cascaded = report.cascaded.len(),
        leaves = dropped.leaves,
        flowers = dropped.flowers,
        fruits = dropped.fruits,
        "pruned {}",
        report.breakdown()
    );
    Ok(report)
}

/// Branches reachable from the trunk top without crossing `severed`.
///
/// A branch is reached when its start lies within `tol` of a point already
/// reached; its end is then reached in turn.
fn reachable_from_trunk(tree: &Tree, severed: &HashSet<BranchId>, tol: f64) -> HashSet<BranchId> {
    let mut reached = HashSet::new();
    let mut frontier = VecDeque::from([tree.trunk_top()]);
    while let Some(p) = frontier.pop_front() {
        for id in tree.branches_starting_near(p, tol) {
            if severed.contains(&id) || !reached.insert(id) {
                continue;
            }
            if let Some(b) = tree.branch(id) {
                frontier.push_back(b.end);
            }
        }
    }
    reached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TRUNK_HEIGHT;
    use crate::types::{Branch, Flower, FlowerKind, Fruit, FruitKind, Leaf, LeafAnchor};
    use core::f64::consts::FRAC_PI_2;
    use kurbo::{Point, Vec2};

    fn tree() -> Tree {
        Tree::new(Point::new(0.0, 100.0), TRUNK_HEIGHT)
    }

    fn up(start: Point, len: f64) -> Branch {
        Branch::new(start, -FRAC_PI_2, len, len)
    }

    fn horizontal_cut(y: f64) -> Line {
        Line::new((-30.0, y), (30.0, y))
    }

    fn leaf(tree: &mut Tree, id: BranchId, t: f64) {
        let anchor = LeafAnchor {
            branch: id,
            t,
            offset: Vec2::new(2.0, 0.0),
        };
        let position = anchor.resolve(tree.branch(id).unwrap());
        tree.push_leaf(Leaf {
            position,
            size: 10.0,
            angle: 0.0,
            sway: 0.0,
            anchor: Some(anchor),
        });
    }

    #[test]
    fn cutting_a_parent_removes_its_chain() {
        let mut t = tree();
        // Trunk top is (0, 20). A spans y 20..-80, B spans -80..-180.
        let a = t.insert_branch(up(t.trunk_top(), 100.0));
        let b = t.insert_branch(up(t.branch(a).unwrap().end, 100.0));

        let report = prune(&mut t, horizontal_cut(-30.0), &TreeParams::default()).unwrap();
        assert_eq!(report.direct, vec![a]);
        assert_eq!(report.cascaded, vec![b]);
        assert_eq!(report.status(), "Pruned 2 branches!");
        assert_eq!(report.breakdown(), "2 branches (1 directly cut, 1 disconnected)");
        assert_eq!(t.branch_count(), 0);
    }

    #[test]
    fn pruning_is_idempotent() {
        let mut t = tree();
        let a = t.insert_branch(up(t.trunk_top(), 100.0));
        let _b = t.insert_branch(up(t.branch(a).unwrap().end, 100.0));
        let _side = t.insert_branch(Branch::new(t.trunk_top(), 0.0, 80.0, 80.0));
        let cut = horizontal_cut(-130.0);
        let params = TreeParams::default();

        let first = prune(&mut t, cut, &params).unwrap();
        assert_eq!(first.removed(), 1);
        let second = prune(&mut t, cut, &params).unwrap();
        assert_eq!(second.removed(), 0);
        assert_eq!(t.branch_count(), 2);
    }

    #[test]
    fn immature_branches_are_not_cuttable() {
        let mut t = tree();
        let _a = t.insert_branch(Branch::new(t.trunk_top(), -FRAC_PI_2, 100.0, 100.5));
        let report = prune(&mut t, horizontal_cut(-30.0), &TreeParams::default()).unwrap();
        assert_eq!(report.removed(), 0);
        assert_eq!(t.branch_count(), 1);
    }

    #[test]
    fn immature_children_go_with_their_parent() {
        let mut t = tree();
        let a = t.insert_branch(up(t.trunk_top(), 100.0));
        let end = t.branch(a).unwrap().end;
        let young = t.insert_branch(Branch::new(end, 0.0, 3.0, 90.0));
        let report = prune(&mut t, horizontal_cut(-30.0), &TreeParams::default()).unwrap();
        assert_eq!(report.cascaded, vec![young]);
    }

    #[test]
    fn short_cut_is_rejected() {
        let mut t = tree();
        let _a = t.insert_branch(up(t.trunk_top(), 100.0));
        let cut = Line::new((-4.0, -30.0), (5.0, -30.0));
        assert_eq!(
            prune(&mut t, cut, &TreeParams::default()),
            Err(Rejection::CutTooShort)
        );
        assert_eq!(t.branch_count(), 1);
    }

    #[test]
    fn sibling_decorations_are_untouched() {
        let mut t = tree();
        let top = t.trunk_top();
        let left = t.insert_branch(Branch::new(top, -FRAC_PI_2 - 0.6, 100.0, 100.0));
        let right = t.insert_branch(Branch::new(top, -FRAC_PI_2 + 0.6, 100.0, 100.0));
        leaf(&mut t, left, 0.3);
        leaf(&mut t, left, 0.6);
        leaf(&mut t, right, 0.3);
        leaf(&mut t, right, 0.6);
        let right_leaves: Vec<Leaf> = t.leaves_on(right).cloned().collect();

        // Cross only the left branch at its midpoint.
        let mid = t.branch(left).unwrap().point_at(0.5);
        let cut = Line::new(mid + Vec2::new(-15.0, -15.0), mid + Vec2::new(15.0, 15.0));
        let report = prune(&mut t, cut, &TreeParams::default()).unwrap();
        assert_eq!(report.direct, vec![left]);
        assert_eq!(report.dropped.leaves, 2);
        let after: Vec<Leaf> = t.leaves_on(right).cloned().collect();
        assert_eq!(after, right_leaves);
        assert_eq!(t.leaves().len(), 2);
    }

    #[test]
    fn flowers_and_fruit_go_with_their_branches() {
        let mut t = tree();
        let top = t.trunk_top();
        let a = t.insert_branch(up(top, 100.0));
        let a_end = t.branch(a).unwrap().end;
        let child = t.insert_branch(Branch::new(a_end, -FRAC_PI_2 - 0.4, 60.0, 60.0));
        let side = t.insert_branch(Branch::new(top, -FRAC_PI_2 + 0.9, 100.0, 100.0));
        let child_end = t.branch(child).unwrap().end;
        let side_end = t.branch(side).unwrap().end;
        for (id, position) in [(a, a_end), (side, side_end)] {
            t.push_flower(Flower {
                position,
                kind: FlowerKind::Daisy,
                size: 30.0,
                sway: 0.0,
                branch: id,
            });
        }
        t.push_fruit(Fruit {
            position: child_end,
            kind: FruitKind::Apple,
            size: 40.0,
            sway: 0.0,
            branch: child,
        });

        // Trunk top is (0, 20); cross A alone at y = -30.
        let cut = Line::new((-12.0, -30.0), (12.0, -30.0));
        let report = prune(&mut t, cut, &TreeParams::default()).unwrap();
        assert_eq!(report.direct, vec![a]);
        assert_eq!(report.cascaded, vec![child]);
        assert_eq!(report.dropped.flowers, 1);
        assert_eq!(report.dropped.fruits, 1);
        assert!(t.fruits().is_empty());
        assert_eq!(t.flowers().len(), 1);
        assert_eq!(t.flowers()[0].branch, side);
        assert_eq!(t.flower_on(side).map(|f| f.position), Some(side_end));
    }

    #[test]
    fn cut_near_a_joint_does_not_sever() {
        let mut t = tree();
        let a = t.insert_branch(up(t.trunk_top(), 100.0));
        // Crosses A at u = 0.05.
        let report = prune(&mut t, horizontal_cut(15.0), &TreeParams::default()).unwrap();
        assert_eq!(report.removed(), 0);
        assert!(t.is_alive(a));
    }
}
