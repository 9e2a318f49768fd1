// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapter helpers for Canopy Tree.
//!
//! ## Feature
//!
//! Enable with `tree_adapter`.
//!
//! ## Notes
//!
//! These helpers turn a tool's [`Targets`] into a tree pick and feed the
//! result to hover tracking. Coordinates stay in screen space; the camera
//! offset travels in the [`PickQuery`].

use alloc::vec::Vec;

use canopy_tree::{Hit, Node, PickFlags, PickQuery, Tree, TreeParams, resolve};
use kurbo::{Point, Vec2};

use crate::hover::{HoverEvent, HoverState};
use crate::types::{Targets, Tool};

impl From<Targets> for PickFlags {
    fn from(t: Targets) -> Self {
        let mut f = Self::empty();
        f.set(Self::TRUNK, t.contains(Targets::TRUNK));
        f.set(Self::FRUIT, t.contains(Targets::FRUIT));
        f.set(Self::FLOWERS, t.contains(Targets::FLOWERS));
        f.set(Self::BRANCH_ENDS, t.contains(Targets::BRANCH_ENDS));
        f
    }
}

/// Build the pick query `tool` should use.
pub fn pick_query(tool: Tool, camera: Vec2, root_topic: Option<&str>) -> PickQuery<'_> {
    PickQuery {
        camera,
        flags: tool.targets().into(),
        root_topic,
    }
}

/// Resolve the node under `screen` for `tool`.
pub fn pick(
    tree: &Tree,
    tool: Tool,
    screen: Point,
    camera: Vec2,
    root_topic: Option<&str>,
    params: &TreeParams,
) -> Option<Hit> {
    resolve(tree, screen, &pick_query(tool, camera, root_topic), params)
}

/// Update hover from a pointer move.
///
/// Tools that do not hover (the cut tool) clear any existing hover.
pub fn hover_at(
    hover: &mut HoverState<Node>,
    tree: &Tree,
    tool: Tool,
    screen: Point,
    camera: Vec2,
    params: &TreeParams,
) -> Vec<HoverEvent<Node>> {
    if !tool.hovers() {
        return hover.clear();
    }
    let node = pick(tree, tool, screen, camera, None, params).map(|h| h.node);
    hover.update(node)
}
