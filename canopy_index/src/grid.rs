// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid buckets keyed by integer cell coordinates.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// Cell-bucketed storage of slot indices.
///
/// Each slot lives in exactly one cell: the one containing its point.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    cell: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl Grid {
    pub(crate) fn new(cell: f64) -> Self {
        debug_assert!(cell > 0.0, "cell size must be positive");
        Self {
            cell,
            cells: HashMap::new(),
        }
    }

    #[inline]
    fn floor_to_i64(v: f64) -> i64 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Cell coordinates are bounded by the scene extent."
        )]
        let i = v as i64;
        if (i as f64) > v { i - 1 } else { i }
    }

    pub(crate) fn key_for(&self, x: f64, y: f64) -> (i64, i64) {
        (
            Self::floor_to_i64(x / self.cell),
            Self::floor_to_i64(y / self.cell),
        )
    }

    pub(crate) fn insert(&mut self, slot: usize, key: (i64, i64)) {
        self.cells.entry(key).or_default().push(slot);
    }

    pub(crate) fn remove(&mut self, slot: usize, key: (i64, i64)) {
        if let Some(slots) = self.cells.get_mut(&key) {
            if let Some(pos) = slots.iter().position(|&s| s == slot) {
                slots.swap_remove(pos);
            }
            if slots.is_empty() {
                self.cells.remove(&key);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.cells.clear();
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Slots in every cell overlapping the square `[x - tol, x + tol] x [y - tol, y + tol]`,
    /// in ascending slot order.
    pub(crate) fn candidates(&self, x: f64, y: f64, tol: f64) -> BTreeSet<usize> {
        let (min_x, min_y) = self.key_for(x - tol, y - tol);
        let (max_x, max_y) = self.key_for(x + tol, y + tol);
        let mut out = BTreeSet::new();
        for cy in min_y..=max_y {
            for cx in min_x..=max_x {
                if let Some(slots) = self.cells.get(&(cx, cy)) {
                    out.extend(slots.iter().copied());
                }
            }
        }
        out
    }
}
