// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture machine.
//!
//! ## Overview
//!
//! Turns pointer down → move → up sequences into [`Intent`]s according to the
//! active [`Tool`]. It does not perform hit testing: callers resolve the node
//! under the pointer (for example with `canopy_tree::resolve`) and pass it in.
//!
//! ## Sequences
//!
//! - Click tools fire [`Intent::Apply`] on pointer down, whether or not a node
//!   was hit; the receiver reports the miss.
//! - The cut tool records the down point and emits [`Intent::Cut`] on up.
//! - The reposition tool emits [`Intent::Grab`] on down, [`Intent::Drag`] on
//!   every move while a node is held, and [`Intent::Release`] on up.
//! - The pan tool emits [`Intent::Pan`] with the delta since the previous
//!   pointer position on every move.
//!
//! Switching tools abandons any gesture in flight without emitting anything.

use kurbo::{Line, Point};

use crate::types::{GestureKind, Intent, Tool};

#[derive(Clone, Debug, PartialEq)]
enum Active<K> {
    Idle,
    Stroke { from: Point },
    Drag { node: K },
    Pan { last: Point },
}

/// Pointer gesture state for one pointer.
#[derive(Clone, Debug)]
pub struct GestureState<K> {
    tool: Tool,
    active: Active<K>,
}

impl<K: Copy + Eq> Default for GestureState<K> {
    fn default() -> Self {
        Self::new(Tool::default())
    }
}

impl<K: Copy + Eq> GestureState<K> {
    /// Idle machine with `tool` selected.
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            active: Active::Idle,
        }
    }

    /// The selected tool.
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Select a tool, abandoning any gesture in flight.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.active = Active::Idle;
    }

    /// True while a stroke, drag or pan is in progress.
    pub fn is_active(&self) -> bool {
        self.active != Active::Idle
    }

    /// Start point of the cut stroke in progress, if any.
    pub fn stroke_origin(&self) -> Option<Point> {
        match self.active {
            Active::Stroke { from } => Some(from),
            _ => None,
        }
    }

    /// Node currently held by the reposition tool.
    pub fn held(&self) -> Option<K> {
        match self.active {
            Active::Drag { node } => Some(node),
            _ => None,
        }
    }

    /// Pointer pressed at `at` over `hit`.
    pub fn pointer_down(&mut self, at: Point, hit: Option<K>) -> Option<Intent<K>> {
        match self.tool.gesture() {
            GestureKind::Click => Some(Intent::Apply {
                tool: self.tool,
                node: hit,
            }),
            GestureKind::Stroke => {
                self.active = Active::Stroke { from: at };
                None
            }
            GestureKind::Drag => {
                if let Some(node) = hit {
                    self.active = Active::Drag { node };
                }
                Some(Intent::Grab(hit))
            }
            GestureKind::Pan => {
                self.active = Active::Pan { last: at };
                Some(Intent::PanStart)
            }
        }
    }

    /// Pointer moved to `at`.
    pub fn pointer_move(&mut self, at: Point) -> Option<Intent<K>> {
        match &mut self.active {
            Active::Drag { node } => Some(Intent::Drag { node: *node, to: at }),
            Active::Pan { last } => {
                let delta = at - *last;
                *last = at;
                Some(Intent::Pan(delta))
            }
            Active::Idle | Active::Stroke { .. } => None,
        }
    }

    /// Pointer released at `at`.
    pub fn pointer_up(&mut self, at: Point) -> Option<Intent<K>> {
        match core::mem::replace(&mut self.active, Active::Idle) {
            Active::Idle => None,
            Active::Stroke { from } => Some(Intent::Cut(Line::new(from, at))),
            Active::Drag { node } => Some(Intent::Release(node)),
            Active::Pan { .. } => Some(Intent::PanEnd),
        }
    }
}
