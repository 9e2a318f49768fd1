// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Tree: a Kurbo-native branching tree you can grow, cut, and bend.
//!
//! The tree is a trunk with a virtual node at its top and an arena of
//! straight branch segments hanging off it. Branches carry optional content
//! records; leaves, flowers, and fruit decorate them.
//!
//! - [`Tree`]: owns branches (generational [`BranchId`]s), decorations, and
//!   two joint indices that answer "which branch starts/ends near here".
//! - [`grow_from_node`] and [`tick`]: the growth engine. A bare trunk grows a
//!   symmetric fan; any other node sprouts a few random branches which then
//!   grow in place every tick until they reach their target length.
//! - [`prune`]: cut along a line. Fully grown branches crossed in their
//!   middle are severed, and everything no longer reachable from the trunk
//!   goes with them, decorations included.
//! - [`reposition`]: drag a branch end; the subtree follows.
//! - [`resolve`]: map a screen point (minus camera offset) to the node under it.
//! - [`decorate`]: leaves, flowers, fruit, and harvesting.
//!
//! Engines are free functions over `&mut Tree`. They never keep state of
//! their own, take every tunable from [`TreeParams`], and report user-input
//! problems as a [`Rejection`] whose text is the status line to show. A
//! rejection never mutates the tree.
//!
//! ## Joint matching
//!
//! Branch endpoints come out of trigonometry, so joints are matched with a
//! strict per-axis window ([`TreeParams::joint_tolerance`], 5 units by
//! default) rather than exact equality. The windows are served by
//! [`canopy_index::JointIndex`].
//!
//! ## Minimal usage
//!
//! ```
//! use canopy_tree::{grow_from_node, prune, tick, Node, Tree, TreeParams};
//! use kurbo::{Line, Size};
//! use rand::SeedableRng;
//!
//! let params = TreeParams::default();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let mut tree = Tree::for_viewport(Size::new(800.0, 600.0));
//!
//! let fan = grow_from_node(&mut tree, Node::TrunkTop, &params, &mut rng).unwrap();
//! assert_eq!(fan.created.len(), 5);
//!
//! // Let the fan grow to full size.
//! while tick(&mut tree, 100.0, &params, &mut rng) > 0 {}
//!
//! // Slice straight across the middle of the vertical branch.
//! let mid = tree.branch(fan.created[2]).unwrap().point_at(0.5);
//! let cut = Line::new((mid.x - 20.0, mid.y), (mid.x + 20.0, mid.y));
//! let report = prune(&mut tree, cut, &params).unwrap();
//! assert_eq!(report.direct, vec![fan.created[2]]);
//! assert_eq!(tree.branch_count(), 4);
//! ```

pub mod decorate;
mod error;
pub mod geometry;
mod growth;
mod params;
mod prune;
mod reposition;
mod resolve;
mod tree;
mod types;

pub use error::Rejection;
pub use growth::{Growth, GrowthKind, grow_from_node, tick};
pub use params::{Span, TreeParams};
pub use prune::{PruneReport, prune};
pub use reposition::{Reposition, reposition};
pub use resolve::{Hit, PickFlags, PickQuery, resolve};
pub use tree::{Dropped, GROUND_MARGIN, TRUNK_HEIGHT, Tree};
pub use types::{
    Branch, BranchId, ContentRecord, Flower, FlowerKind, Fruit, FruitKind, Leaf, LeafAnchor, Node,
};
