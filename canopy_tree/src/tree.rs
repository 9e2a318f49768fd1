// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: branch arena, joint indices, and decorations.

use hashbrown::HashSet;
use kurbo::{Point, Size, Vec2};

use canopy_index::{JointIndex, Key};

use crate::types::{Branch, BranchId, ContentRecord, Flower, Fruit, Leaf, Node};

/// Height of the trunk above its base.
pub const TRUNK_HEIGHT: f64 = 80.0;

/// Distance from the bottom of the viewport to the trunk base.
pub const GROUND_MARGIN: f64 = 40.0;

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    seq: u64,
    branch: Branch,
    start_key: Key,
    end_key: Key,
}

/// Counts of decorations dropped alongside removed branches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Dropped {
    /// Leaves anchored to a removed branch.
    pub leaves: usize,
    /// Flowers on a removed branch.
    pub flowers: usize,
    /// Fruit on a removed branch.
    pub fruits: usize,
}

/// The branching tree: a trunk, an arena of branches, and their decorations.
///
/// Branches live in generational slots; [`BranchId`]s of removed branches go
/// stale and are never handed out again. Branch starts and ends are mirrored
/// into two [`JointIndex`]es so "which branch starts/ends here" is a grid
/// lookup rather than a scan.
///
/// Iteration order is creation order.
pub struct Tree {
    base: Point,
    trunk_height: f64,
    slots: Vec<Option<Slot>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    order: Vec<BranchId>,
    next_seq: u64,
    starts: JointIndex<BranchId>,
    ends: JointIndex<BranchId>,
    leaves: Vec<Leaf>,
    flowers: Vec<Flower>,
    fruits: Vec<Fruit>,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tree")
            .field("base", &self.base)
            .field("trunk_height", &self.trunk_height)
            .field("branches_alive", &self.order.len())
            .field("slots_total", &self.slots.len())
            .field("free_list", &self.free_list.len())
            .field("leaves", &self.leaves.len())
            .field("flowers", &self.flowers.len())
            .field("fruits", &self.fruits.len())
            .finish_non_exhaustive()
    }
}

impl Tree {
    /// A bare trunk rooted at `base`.
    pub fn new(base: Point, trunk_height: f64) -> Self {
        Self {
            base,
            trunk_height,
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            order: Vec::new(),
            next_seq: 0,
            starts: JointIndex::default(),
            ends: JointIndex::default(),
            leaves: Vec::new(),
            flowers: Vec::new(),
            fruits: Vec::new(),
        }
    }

    /// A bare trunk centred at the bottom of a viewport.
    pub fn for_viewport(viewport: Size) -> Self {
        Self::new(Self::base_for(viewport), TRUNK_HEIGHT)
    }

    /// Trunk base for a viewport: horizontally centred, just above the bottom edge.
    pub fn base_for(viewport: Size) -> Point {
        Point::new(viewport.width / 2.0, viewport.height - GROUND_MARGIN)
    }

    /// Trunk base.
    pub fn base(&self) -> Point {
        self.base
    }

    /// Trunk height.
    pub fn trunk_height(&self) -> f64 {
        self.trunk_height
    }

    /// The virtual root node every first-level branch grows from.
    pub fn trunk_top(&self) -> Point {
        Point::new(self.base.x, self.base.y - self.trunk_height)
    }

    /// Live branches in creation order.
    pub fn branches(&self) -> impl Iterator<Item = (BranchId, &Branch)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.branch(id).map(|b| (id, b)))
    }

    /// Number of live branches.
    pub fn branch_count(&self) -> usize {
        self.order.len()
    }

    /// The branch behind `id`, if it is still alive.
    pub fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.slot(id).map(|s| &s.branch)
    }

    /// Returns `true` if `id` refers to a live branch.
    pub fn is_alive(&self, id: BranchId) -> bool {
        self.slot(id).is_some()
    }

    /// All leaves, anchored and standalone.
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// All flowers.
    pub fn flowers(&self) -> &[Flower] {
        &self.flowers
    }

    /// All fruit.
    pub fn fruits(&self) -> &[Fruit] {
        &self.fruits
    }

    /// Leaves anchored to `id`.
    pub fn leaves_on(&self, id: BranchId) -> impl Iterator<Item = &Leaf> + '_ {
        self.leaves
            .iter()
            .filter(move |l| l.anchor.is_some_and(|a| a.branch == id))
    }

    /// The flower on `id`, if any.
    pub fn flower_on(&self, id: BranchId) -> Option<&Flower> {
        self.flowers.iter().find(|f| f.branch == id)
    }

    /// The fruit on `id`, if any.
    pub fn fruit_on(&self, id: BranchId) -> Option<&Fruit> {
        self.fruits.iter().find(|f| f.branch == id)
    }

    /// Insert a branch as-is and index its joints.
    ///
    /// No growth rules are applied; this is the primitive the growth engine
    /// builds on.
    pub fn insert_branch(&mut self, branch: Branch) -> BranchId {
        debug_assert!(
            branch.parent.is_none_or(|p| self.is_alive(p)),
            "parent must be a live branch"
        );
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.slots.push(None);
            self.generations.push(1);
            (self.slots.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "BranchId uses 32-bit indices."
        )]
        let id = BranchId::new(idx as u32, generation);
        let start_key = self.starts.insert(branch.start.x, branch.start.y, id);
        let end_key = self.ends.insert(branch.end.x, branch.end.y, id);
        self.slots[idx] = Some(Slot {
            generation,
            seq: self.next_seq,
            branch,
            start_key,
            end_key,
        });
        self.next_seq += 1;
        self.order.push(id);
        id
    }

    /// Attach content to a live branch. Returns `false` for stale ids.
    pub fn set_content(&mut self, id: BranchId, content: ContentRecord) -> bool {
        self.update_branch(id, |b| b.content = Some(content)).is_some()
    }

    /// Mutate a branch in place and resync its joints.
    pub(crate) fn update_branch<R>(
        &mut self,
        id: BranchId,
        f: impl FnOnce(&mut Branch) -> R,
    ) -> Option<R> {
        let slot = self.slots.get_mut(id.idx())?.as_mut()?;
        if slot.generation != id.1 {
            return None;
        }
        let out = f(&mut slot.branch);
        let (start, end) = (slot.branch.start, slot.branch.end);
        let (start_key, end_key) = (slot.start_key, slot.end_key);
        self.starts.update(start_key, start.x, start.y);
        self.ends.update(end_key, end.x, end.y);
        Some(out)
    }

    /// Live branches whose start lies within the per-axis window `tol` of `p`,
    /// in creation order.
    pub fn branches_starting_near(&self, p: Point, tol: f64) -> Vec<BranchId> {
        self.sorted(self.starts.query_near(p.x, p.y, tol).map(|(_, id)| id))
    }

    /// Live branches whose end lies within the per-axis window `tol` of `p`,
    /// in creation order.
    pub fn branches_ending_near(&self, p: Point, tol: f64) -> Vec<BranchId> {
        self.sorted(self.ends.query_near(p.x, p.y, tol).map(|(_, id)| id))
    }

    /// The oldest branch whose end lies within `tol` of `p`.
    pub fn first_ending_near(&self, p: Point, tol: f64) -> Option<BranchId> {
        self.ends
            .query_near(p.x, p.y, tol)
            .map(|(_, id)| id)
            .min_by_key(|&id| self.seq(id))
    }

    /// Current position of a node, or `None` if it no longer exists.
    pub fn node_position(&self, node: Node) -> Option<Point> {
        match node {
            Node::TrunkTop => Some(self.trunk_top()),
            Node::BranchEnd(id) => self.branch(id).map(|b| b.end),
            Node::Flower(id) => self.flower_on(id).map(|f| f.position),
            Node::Fruit(id) => self.fruit_on(id).map(|f| f.position),
        }
    }

    /// Remove branches and every decoration keyed to them.
    ///
    /// Stale ids in `ids` are ignored. Standalone leaves are never touched.
    pub(crate) fn remove_branches(&mut self, ids: &HashSet<BranchId>) -> Dropped {
        for &id in ids {
            let Some(slot) = self.slots.get_mut(id.idx()) else {
                continue;
            };
            if slot.as_ref().is_none_or(|s| s.generation != id.1) {
                continue;
            }
            if let Some(s) = slot.take() {
                let _ = self.starts.remove(s.start_key);
                let _ = self.ends.remove(s.end_key);
                self.free_list.push(id.idx());
            }
        }
        self.order.retain(|id| !ids.contains(id));

        let before = (self.leaves.len(), self.flowers.len(), self.fruits.len());
        self.leaves
            .retain(|l| l.anchor.is_none_or(|a| !ids.contains(&a.branch)));
        self.flowers.retain(|f| !ids.contains(&f.branch));
        self.fruits.retain(|f| !ids.contains(&f.branch));
        Dropped {
            leaves: before.0 - self.leaves.len(),
            flowers: before.1 - self.flowers.len(),
            fruits: before.2 - self.fruits.len(),
        }
    }

    pub(crate) fn push_leaf(&mut self, leaf: Leaf) {
        debug_assert!(
            leaf.anchor.is_none_or(|a| self.is_alive(a.branch)),
            "leaf anchored to a dead branch"
        );
        self.leaves.push(leaf);
    }

    pub(crate) fn push_flower(&mut self, flower: Flower) {
        debug_assert!(self.is_alive(flower.branch), "flower on a dead branch");
        self.flowers.push(flower);
    }

    pub(crate) fn push_fruit(&mut self, fruit: Fruit) {
        debug_assert!(self.is_alive(fruit.branch), "fruit on a dead branch");
        self.fruits.push(fruit);
    }

    pub(crate) fn take_flower(&mut self, id: BranchId) -> Option<Flower> {
        let pos = self.flowers.iter().position(|f| f.branch == id)?;
        Some(self.flowers.remove(pos))
    }

    pub(crate) fn take_fruit(&mut self, id: BranchId) -> Option<Fruit> {
        let pos = self.fruits.iter().position(|f| f.branch == id)?;
        Some(self.fruits.remove(pos))
    }

    pub(crate) fn translate_decorations_on(&mut self, ids: &HashSet<BranchId>, delta: Vec2) {
        for f in self.flowers.iter_mut().filter(|f| ids.contains(&f.branch)) {
            f.position += delta;
        }
        for f in self.fruits.iter_mut().filter(|f| ids.contains(&f.branch)) {
            f.position += delta;
        }
    }

    /// Recompute cached positions of leaves anchored to any branch in `ids`.
    pub(crate) fn refresh_leaves(&mut self, ids: &HashSet<BranchId>) {
        if ids.is_empty() {
            return;
        }
        let slots = &self.slots;
        for leaf in &mut self.leaves {
            let Some(anchor) = leaf.anchor else { continue };
            if !ids.contains(&anchor.branch) {
                continue;
            }
            let live = slots
                .get(anchor.branch.idx())
                .and_then(Option::as_ref)
                .filter(|s| s.generation == anchor.branch.1);
            debug_assert!(live.is_some(), "leaf anchored to a dead branch");
            if let Some(s) = live {
                leaf.position = anchor.resolve(&s.branch);
            }
        }
    }

    /// Clear every branch and decoration and move the trunk to `base`.
    ///
    /// Outstanding [`BranchId`]s go stale; slots are recycled with new
    /// generations so stale ids never alias new branches.
    pub fn reset(&mut self, base: Point) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.free_list.push(idx);
            }
        }
        self.order.clear();
        self.starts.clear();
        self.ends.clear();
        self.leaves.clear();
        self.flowers.clear();
        self.fruits.clear();
        self.base = base;
    }

    /// Move the whole tree so its trunk stands at `base`.
    pub fn relocate(&mut self, base: Point) {
        let delta = base - self.base;
        self.base = base;
        if delta == Vec2::ZERO {
            return;
        }
        for id in self.order.clone() {
            let _ = self.update_branch(id, |b| {
                b.start += delta;
                b.end += delta;
            });
        }
        for leaf in &mut self.leaves {
            leaf.position += delta;
        }
        for f in &mut self.flowers {
            f.position += delta;
        }
        for f in &mut self.fruits {
            f.position += delta;
        }
    }

    fn slot(&self, id: BranchId) -> Option<&Slot> {
        let s = self.slots.get(id.idx())?.as_ref()?;
        (s.generation == id.1).then_some(s)
    }

    fn seq(&self, id: BranchId) -> u64 {
        self.slot(id).map_or(u64::MAX, |s| s.seq)
    }

    fn sorted(&self, ids: impl Iterator<Item = BranchId>) -> Vec<BranchId> {
        let mut out: Vec<BranchId> = ids.collect();
        out.sort_by_key(|&id| self.seq(id));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LeafAnchor;
    use core::f64::consts::FRAC_PI_2;

    fn tree() -> Tree {
        Tree::new(Point::new(400.0, 560.0), TRUNK_HEIGHT)
    }

    fn leaf_on(id: BranchId, t: f64, b: &Branch) -> Leaf {
        let anchor = LeafAnchor {
            branch: id,
            t,
            offset: Vec2::new(1.0, -1.0),
        };
        Leaf {
            position: anchor.resolve(b),
            size: 10.0,
            angle: 0.0,
            sway: 0.0,
            anchor: Some(anchor),
        }
    }

    #[test]
    fn viewport_places_trunk_at_bottom_centre() {
        let t = Tree::for_viewport(Size::new(800.0, 600.0));
        assert_eq!(t.base(), Point::new(400.0, 560.0));
        assert_eq!(t.trunk_top(), Point::new(400.0, 480.0));
    }

    #[test]
    fn joints_are_indexed_on_insert_and_update() {
        let mut t = tree();
        let top = t.trunk_top();
        let a = t.insert_branch(Branch::new(top, -FRAC_PI_2, 100.0, 100.0));
        assert_eq!(t.branches_starting_near(top, 5.0), vec![a]);
        let end = t.branch(a).unwrap().end;
        assert_eq!(t.first_ending_near(end, 5.0), Some(a));

        let _ = t.update_branch(a, |b| {
            b.end = b.start + Vec2::new(50.0, 0.0);
        });
        assert_eq!(t.first_ending_near(end, 5.0), None);
        assert_eq!(
            t.first_ending_near(top + Vec2::new(50.0, 0.0), 5.0),
            Some(a)
        );
    }

    #[test]
    fn removal_drops_only_keyed_decorations() {
        let mut t = tree();
        let top = t.trunk_top();
        let a = t.insert_branch(Branch::new(top, -FRAC_PI_2, 100.0, 100.0));
        let b = t.insert_branch(Branch::new(top, 0.0, 100.0, 100.0));
        let la = leaf_on(a, 0.5, t.branch(a).unwrap());
        let lb = leaf_on(b, 0.5, t.branch(b).unwrap());
        t.push_leaf(la);
        t.push_leaf(lb.clone());
        t.push_leaf(Leaf {
            position: top,
            size: 8.0,
            angle: 0.0,
            sway: 0.0,
            anchor: None,
        });

        let dropped = t.remove_branches(&[a].into_iter().collect());
        assert_eq!(dropped.leaves, 1);
        assert!(!t.is_alive(a));
        assert!(t.is_alive(b));
        assert_eq!(t.leaves().len(), 2, "sibling and standalone leaves survive");
        assert_eq!(t.leaves_on(b).next(), Some(&lb));
        assert!(t.branches_starting_near(top, 5.0) == vec![b]);
    }

    #[test]
    fn stale_ids_are_never_reused() {
        let mut t = tree();
        let top = t.trunk_top();
        let a = t.insert_branch(Branch::new(top, 0.0, 10.0, 10.0));
        t.reset(t.base());
        assert!(!t.is_alive(a));
        let b = t.insert_branch(Branch::new(top, 0.0, 10.0, 10.0));
        assert_ne!(a, b);
        assert!(!t.set_content(a, ContentRecord::titled("late")));
        assert!(t.branch(b).unwrap().content.is_none());
    }

    #[test]
    fn relocate_moves_everything() {
        let mut t = tree();
        let top = t.trunk_top();
        let a = t.insert_branch(Branch::new(top, -FRAC_PI_2, 40.0, 40.0));
        let l = leaf_on(a, 0.5, t.branch(a).unwrap());
        t.push_leaf(l.clone());
        let delta = Vec2::new(-100.0, 20.0);
        t.relocate(t.base() + delta);
        assert_eq!(t.trunk_top(), top + delta);
        assert_eq!(t.branch(a).unwrap().start, top + delta);
        assert_eq!(t.leaves()[0].position, l.position + delta);
        assert_eq!(t.branches_starting_near(top + delta, 1.0), vec![a]);
    }

    #[test]
    fn creation_order_survives_slot_reuse() {
        let mut t = tree();
        let top = t.trunk_top();
        let a = t.insert_branch(Branch::new(top, 0.0, 10.0, 10.0));
        let b = t.insert_branch(Branch::new(top, 1.0, 10.0, 10.0));
        let _ = t.remove_branches(&[a].into_iter().collect());
        let c = t.insert_branch(Branch::new(top, 2.0, 10.0, 10.0));
        let ids: Vec<_> = t.branches().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![b, c]);
        assert_eq!(t.branches_starting_near(top, 1.0), vec![b, c]);
    }
}
