// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunable constants for the engines.

use core::f64::consts::PI;

use rand::Rng;
use rand::distributions::uniform::SampleUniform;

/// Inclusive range a value is drawn from.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span<T> {
    /// Lower bound.
    pub min: T,
    /// Upper bound.
    pub max: T,
}

impl<T> Span<T> {
    /// Span from `min` to `max`.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: SampleUniform + PartialOrd + Copy> Span<T> {
    /// Draw a value. A degenerate (or inverted) span yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    /// True if `v` lies within the span.
    pub fn contains(&self, v: T) -> bool {
        v >= self.min && v <= self.max
    }
}

impl Span<f64> {
    /// Clamp `v` into the span.
    pub fn clamp(&self, v: f64) -> f64 {
        v.max(self.min).min(self.max)
    }
}

/// Every knob the growth, pruning, reposition, decoration and hit-test
/// engines read.
///
/// Defaults reproduce the reference tree: a five-branch fan over a 144° arc,
/// sprouts of three to five branches, and the pick tolerances of the tools.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeParams {
    /// Per-axis window used to match joints (branch starts/ends, node positions).
    pub joint_tolerance: f64,

    /// Branches in the first fan from the trunk.
    pub fan_count: usize,
    /// Total arc of the first fan, centred on vertical.
    pub fan_spread: f64,
    /// Target length of fan branches.
    pub fan_length: Span<f64>,
    /// Thickness of fan branches.
    pub fan_thickness: f64,

    /// Growth is rejected once this many branches start at a node.
    pub max_branches_per_node: usize,
    /// Branches per sprout.
    pub sprout_count: Span<usize>,
    /// Initial length of sprouted branches.
    pub sprout_base_length: Span<f64>,
    /// `max_length = base * stretch`.
    pub sprout_stretch: Span<f64>,
    /// Random perturbation around the parent direction (full width).
    pub sprout_wander: f64,
    /// Arc available to branches sprouted from the trunk top.
    pub trunk_sprout_arc: f64,
    /// Offset added to the trunk sprout arc.
    pub trunk_sprout_bias: f64,
    /// Thickness of branches sprouted from the trunk top.
    pub trunk_sprout_thickness: f64,
    /// Thickness used when a sprouting node has no parent branch.
    pub orphan_sprout_thickness: f64,
    /// Parents thicker than this lose `thick_step`, others `thin_step`.
    pub thick_threshold: f64,
    /// Thickness decrement for thick parents.
    pub thick_step: f64,
    /// Thickness decrement for thin parents.
    pub thin_step: f64,
    /// Lower bound on thickness.
    pub min_thickness: f64,

    /// Per-tick growth rate range.
    pub growth_rate: Span<f64>,
    /// Scale applied to `rate * dt_ms`.
    pub growth_scale: f64,

    /// Cuts shorter than this are ignored.
    pub min_cut_length: f64,
    /// Lengths a repositioned branch is clamped to.
    pub reposition_length: Span<f64>,

    /// Pick tolerance of the trunk top.
    pub trunk_tolerance: f64,
    /// Pick tolerance of fruit.
    pub fruit_tolerance: f64,
    /// Pick tolerance of flowers.
    pub flower_tolerance: f64,
    /// Pick tolerance of mature branch ends.
    pub branch_end_tolerance: f64,

    /// Leaves grown per branch by the leaves tool.
    pub leaves_per_branch: Span<usize>,
    /// Per-axis jitter of leaves along a branch.
    pub leaf_jitter: f64,
    /// Leaf size.
    pub leaf_size: Span<f64>,
    /// Ring radius for standalone leaves.
    pub leaf_ring: Span<f64>,
    /// Size of standalone leaves.
    pub standalone_leaf_size: Span<f64>,
    /// Flower size.
    pub flower_size: Span<f64>,
    /// Fruit size.
    pub fruit_size: Span<f64>,
    /// Minimum distance between flowers (and between fruit) on branch ends.
    pub decoration_spacing: f64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            joint_tolerance: 5.0,

            fan_count: 5,
            fan_spread: 0.8 * PI,
            fan_length: Span::new(120.0, 180.0),
            fan_thickness: 15.0,

            max_branches_per_node: 6,
            sprout_count: Span::new(3, 5),
            sprout_base_length: Span::new(25.0, 65.0),
            sprout_stretch: Span::new(2.0, 3.5),
            sprout_wander: 0.8 * PI,
            trunk_sprout_arc: 1.2 * PI,
            trunk_sprout_bias: -0.1 * PI,
            trunk_sprout_thickness: 10.0,
            orphan_sprout_thickness: 5.0,
            thick_threshold: 6.0,
            thick_step: 3.0,
            thin_step: 2.0,
            min_thickness: 1.0,

            growth_rate: Span::new(1.5, 2.2),
            growth_scale: 0.01,

            min_cut_length: 10.0,
            reposition_length: Span::new(5.0, 200.0),

            trunk_tolerance: 8.0,
            fruit_tolerance: 15.0,
            flower_tolerance: 12.0,
            branch_end_tolerance: 8.0,

            leaves_per_branch: Span::new(2, 4),
            leaf_jitter: 3.0,
            leaf_size: Span::new(8.0, 16.0),
            leaf_ring: Span::new(15.0, 25.0),
            standalone_leaf_size: Span::new(8.0, 12.0),
            flower_size: Span::new(28.0, 40.0),
            fruit_size: Span::new(36.0, 52.0),
            decoration_spacing: 10.0,
        }
    }
}

impl TreeParams {
    /// Thickness of a branch sprouted from a parent of `parent` thickness.
    pub fn child_thickness(&self, parent: f64) -> f64 {
        let step = if parent > self.thick_threshold {
            self.thick_step
        } else {
            self.thin_step
        };
        (parent - step).max(self.min_thickness)
    }

    /// Angle of fan branch `i`, measured from +x with y down (so `-PI/2` is up).
    pub fn fan_angle(&self, i: usize) -> f64 {
        let up = -PI / 2.0;
        if self.fan_count < 2 {
            return up;
        }
        let step = self.fan_spread / (self.fan_count - 1) as f64;
        up - self.fan_spread / 2.0 + step * i as f64
    }
}
