// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed highlight of a flashcard's source branch.

use canopy_tree::BranchId;

/// A transient highlight on one branch end, measured in simulation time.
///
/// Starting a new highlight replaces the pending clear of the old one.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Highlight {
    target: Option<(BranchId, f64)>,
}

impl Highlight {
    /// Highlight `branch` until `now_ms + duration_ms`.
    pub fn start(&mut self, branch: BranchId, now_ms: f64, duration_ms: f64) {
        self.target = Some((branch, now_ms + duration_ms));
    }

    /// Drop the highlight immediately.
    pub fn cancel(&mut self) -> Option<BranchId> {
        self.target.take().map(|(b, _)| b)
    }

    /// Clear the highlight if its time is up; returns the branch cleared.
    pub fn expire(&mut self, now_ms: f64) -> Option<BranchId> {
        match self.target {
            Some((_, until)) if now_ms >= until => self.cancel(),
            _ => None,
        }
    }

    /// The highlighted branch.
    pub fn current(&self) -> Option<BranchId> {
        self.target.map(|(b, _)| b)
    }
}
