// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public [`JointIndex`] API.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::grid::Grid;

/// Generational handle for joints.
///
/// A key becomes stale when its joint is removed; a reused slot gets a higher
/// generation so stale keys never alias a newer joint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Joint keys are intentionally 32-bit."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Entry<P> {
    generation: u32,
    x: f64,
    y: f64,
    cell: (i64, i64),
    payload: P,
}

/// Index of payload-carrying points, bucketed on a uniform grid.
///
/// Mutations take effect immediately; there is no commit step.
#[derive(Clone, Debug)]
pub struct JointIndex<P: Copy + Debug> {
    entries: Vec<Option<Entry<P>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    grid: Grid,
}

impl<P: Copy + Debug> Default for JointIndex<P> {
    /// A grid with 5-unit cells, matching the usual joint tolerance.
    fn default() -> Self {
        Self::new(5.0)
    }
}

impl<P: Copy + Debug> JointIndex<P> {
    /// Create an empty index with square cells of side `cell`.
    ///
    /// Queries stay correct for any tolerance; choosing `cell` close to the
    /// typical tolerance keeps the number of visited cells small.
    pub fn new(cell: f64) -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            grid: Grid::new(cell),
        }
    }

    /// Insert a joint at `(x, y)`. Returns a stable handle.
    pub fn insert(&mut self, x: f64, y: f64, payload: P) -> Key {
        let cell = self.grid.key_for(x, y);
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.entries.push(None);
            self.generations.push(1);
            (self.entries.len() - 1, 1)
        };
        self.entries[idx] = Some(Entry {
            generation,
            x,
            y,
            cell,
            payload,
        });
        self.grid.insert(idx, cell);
        Key::new(idx, generation)
    }

    /// Move an existing joint. Stale keys are ignored.
    pub fn update(&mut self, key: Key, x: f64, y: f64) {
        let new_cell = self.grid.key_for(x, y);
        let Some(e) = self.entry_mut(key) else {
            return;
        };
        let old_cell = e.cell;
        e.x = x;
        e.y = y;
        e.cell = new_cell;
        if old_cell != new_cell {
            self.grid.remove(key.idx(), old_cell);
            self.grid.insert(key.idx(), new_cell);
        }
    }

    /// Remove a joint, returning its payload if the key was live.
    pub fn remove(&mut self, key: Key) -> Option<P> {
        let cell = self.entry_mut(key)?.cell;
        let entry = self.entries[key.idx()].take()?;
        self.grid.remove(key.idx(), cell);
        self.free_list.push(key.idx());
        Some(entry.payload)
    }

    /// Remove every joint. Outstanding keys become stale.
    pub fn clear(&mut self) {
        for (idx, slot) in self.entries.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.free_list.push(idx);
            }
        }
        self.grid.clear();
    }

    /// Position and payload of a live joint.
    pub fn get(&self, key: Key) -> Option<(f64, f64, P)> {
        let e = self.entries.get(key.idx())?.as_ref()?;
        (e.generation == key.1).then_some((e.x, e.y, e.payload))
    }

    /// Number of live joints.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// True if no joints are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    /// Joints within the strict per-axis window `tol` of `(x, y)`, in slot order.
    pub fn query_near(&self, x: f64, y: f64, tol: f64) -> impl Iterator<Item = (Key, P)> + '_ {
        let mut out = Vec::new();
        for i in self.grid.candidates(x, y, tol) {
            let Some(Some(e)) = self.entries.get(i) else {
                continue;
            };
            let dx = e.x - x;
            let dy = e.y - y;
            if dx < tol && dx > -tol && dy < tol && dy > -tol {
                out.push((Key::new(i, e.generation), e.payload));
            }
        }
        out.into_iter()
    }

    fn entry_mut(&mut self, key: Key) -> Option<&mut Entry<P>> {
        let e = self.entries.get_mut(key.idx())?.as_mut()?;
        if e.generation != key.1 {
            return None;
        }
        Some(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn window_is_strict_per_axis() {
        let mut idx: JointIndex<u32> = JointIndex::new(5.0);
        let _ = idx.insert(10.0, 10.0, 7);
        assert_eq!(idx.query_near(14.9, 5.1, 5.0).count(), 1);
        // Exactly on the window edge is outside.
        assert_eq!(idx.query_near(15.0, 10.0, 5.0).count(), 0);
        // Euclidean distance is irrelevant: a diagonal offset of (4, 4) still matches.
        assert_eq!(idx.query_near(14.0, 14.0, 5.0).count(), 1);
    }

    #[test]
    fn query_crosses_cell_boundaries() {
        let mut idx: JointIndex<u32> = JointIndex::new(5.0);
        let _ = idx.insert(-0.5, 4.9, 1);
        let _ = idx.insert(0.5, 5.1, 2);
        let got: Vec<u32> = idx.query_near(0.0, 5.0, 1.0).map(|(_, p)| p).collect();
        assert_eq!(got, vec![1, 2]);
    }

    #[test]
    fn large_tolerance_spans_many_cells() {
        let mut idx: JointIndex<u32> = JointIndex::new(5.0);
        let _ = idx.insert(0.0, 0.0, 1);
        let _ = idx.insert(19.0, -19.0, 2);
        let _ = idx.insert(25.0, 0.0, 3);
        let got: Vec<u32> = idx.query_near(0.0, 0.0, 20.0).map(|(_, p)| p).collect();
        assert_eq!(got, vec![1, 2]);
    }

    #[test]
    fn update_moves_between_cells() {
        let mut idx: JointIndex<u32> = JointIndex::new(5.0);
        let k = idx.insert(0.0, 0.0, 1);
        idx.update(k, 100.0, -40.0);
        assert_eq!(idx.query_near(0.0, 0.0, 5.0).count(), 0);
        assert_eq!(idx.query_near(100.0, -40.0, 5.0).count(), 1);
        assert_eq!(idx.get(k), Some((100.0, -40.0, 1)));
    }

    #[test]
    fn stale_keys_are_inert() {
        let mut idx: JointIndex<u32> = JointIndex::new(5.0);
        let a = idx.insert(0.0, 0.0, 1);
        assert_eq!(idx.remove(a), Some(1));
        assert_eq!(idx.remove(a), None);

        // Slot reuse bumps the generation; the old key must not move the new joint.
        let b = idx.insert(50.0, 50.0, 2);
        idx.update(a, 0.0, 0.0);
        assert_eq!(idx.get(a), None);
        assert_eq!(idx.get(b), Some((50.0, 50.0, 2)));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn clear_invalidates_everything() {
        let mut idx: JointIndex<u32> = JointIndex::new(5.0);
        let a = idx.insert(0.0, 0.0, 1);
        let _ = idx.insert(1.0, 1.0, 2);
        idx.clear();
        assert!(idx.is_empty());
        assert_eq!(idx.get(a), None);
        let c = idx.insert(0.0, 0.0, 3);
        assert_ne!(a, c, "reused slot must carry a new generation");
    }
}
