// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Camera offset between screen and model space.

use canopy_tree::GROUND_MARGIN;
use kurbo::{Point, Size, Vec2};

/// Screen-space offset of the model. `model = screen - offset`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    offset: Vec2,
    ceiling: f64,
}

impl Camera {
    /// A camera at rest for a viewport that was `initial_height` tall.
    ///
    /// The offset may never push the ground more than `initial_height - 40`
    /// downwards.
    pub fn new(initial_height: f64) -> Self {
        Self {
            offset: Vec2::ZERO,
            ceiling: initial_height - GROUND_MARGIN,
        }
    }

    /// Current offset.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Convert a screen point to model space.
    pub fn to_model(&self, screen: Point) -> Point {
        screen - self.offset
    }

    /// Pan by a pointer delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
        self.offset.y = self.offset.y.min(self.ceiling);
    }

    /// Put `model` at the centre of `viewport`.
    pub fn center_on(&mut self, model: Point, viewport: Size) {
        self.offset = Vec2::new(viewport.width / 2.0 - model.x, viewport.height / 2.0 - model.y);
    }

    /// Back to the origin.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
    }
}
