// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit-test resolver: mapping a screen point to an interactive node.

use kurbo::{Point, Vec2};

use crate::geometry::within_window;
use crate::params::TreeParams;
use crate::tree::Tree;
use crate::types::{ContentRecord, Node};

bitflags::bitflags! {
    /// Which node kinds a pick may return.
    ///
    /// Fruit and flowers overlap branch ends visually, so they only take part
    /// when the active tool needs them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PickFlags: u8 {
        /// The trunk top.
        const TRUNK       = 0b0000_0001;
        /// Fruit.
        const FRUIT       = 0b0000_0010;
        /// Flowers.
        const FLOWERS     = 0b0000_0100;
        /// Ends of fully grown branches.
        const BRANCH_ENDS = 0b0000_1000;
    }
}

impl Default for PickFlags {
    fn default() -> Self {
        Self::TRUNK | Self::BRANCH_ENDS
    }
}

/// Parameters of a pick that come from the session rather than the tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct PickQuery<'a> {
    /// Camera offset; model = screen - camera.
    pub camera: Vec2,
    /// Node kinds to consider.
    pub flags: PickFlags,
    /// Root topic attached to trunk hits.
    pub root_topic: Option<&'a str>,
}

/// Result of [`resolve`].
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    /// The node that was hit.
    pub node: Node,
    /// Model-space position of the node.
    pub position: Point,
    /// Content carried by the node, if any.
    pub content: Option<ContentRecord>,
}

/// Resolve `screen` to the first node under it.
///
/// Priority: trunk top, then fruit, then flowers, then fully grown branch
/// ends (oldest first). Growing branches are never returned through their
/// end.
pub fn resolve(tree: &Tree, screen: Point, query: &PickQuery<'_>, params: &TreeParams) -> Option<Hit> {
    let p = screen - query.camera;
    let flags = query.flags;

    if flags.contains(PickFlags::TRUNK) {
        let top = tree.trunk_top();
        if within_window(p, top, params.trunk_tolerance) {
            return Some(Hit {
                node: Node::TrunkTop,
                position: top,
                content: query.root_topic.map(ContentRecord::root_topic),
            });
        }
    }

    if flags.contains(PickFlags::FRUIT)
        && let Some(f) = tree
            .fruits()
            .iter()
            .find(|f| within_window(p, f.position, params.fruit_tolerance))
    {
        return Some(Hit {
            node: Node::Fruit(f.branch),
            position: f.position,
            content: None,
        });
    }

    if flags.contains(PickFlags::FLOWERS)
        && let Some(f) = tree
            .flowers()
            .iter()
            .find(|f| within_window(p, f.position, params.flower_tolerance))
    {
        return Some(Hit {
            node: Node::Flower(f.branch),
            position: f.position,
            content: None,
        });
    }

    if flags.contains(PickFlags::BRANCH_ENDS) {
        for id in tree.branches_ending_near(p, params.branch_end_tolerance) {
            let Some(b) = tree.branch(id) else { continue };
            if b.is_mature() {
                return Some(Hit {
                    node: Node::BranchEnd(id),
                    position: b.end,
                    content: b.content.clone(),
                });
            }
        }
    }

    None
}
