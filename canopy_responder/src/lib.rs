// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Responder: a deterministic, `no_std` gesture machine for tree-editing tools.
//!
//! ## Overview
//!
//! This crate turns raw pointer input (down, move, up) into editing
//! [`Intent`](crate::types::Intent)s for the active [`Tool`](crate::types::Tool).
//! It does not perform hit testing and never touches the tree. Feed it the node
//! under the pointer (for example from `canopy_tree::resolve`) and apply the
//! intents it returns.
//!
//! ## Tools
//!
//! Each tool declares the node kinds it may pick
//! ([`Targets`](crate::types::Targets)), whether it tracks hover, and its
//! gesture shape:
//!
//! - Click tools (growth, leaves, fruit, harvest, flower, study) act on
//!   pointer down.
//! - Cut draws a stroke from pointer down to pointer up.
//! - Reposition grabs a node on down, drags it on move, releases on up.
//! - Pan reports the pointer delta on every move.
//!
//! ## Workflow
//!
//! 1) Pick: resolve the node under the pointer with the tool's targets.
//! 2) Hover: on moves, feed the picked node to
//!    [`HoverState`](crate::hover::HoverState) to get leave/enter transitions.
//! 3) Gesture: feed pointer events to
//!    [`GestureState`](crate::gesture::GestureState) and apply the intents.
//!
//! The `tree_adapter` feature wires steps 1 and 2 to `canopy_tree`.
//!
//! ## Minimal example
//!
//! ```
//! use canopy_responder::gesture::GestureState;
//! use canopy_responder::types::{Intent, Tool};
//! use kurbo::{Line, Point};
//!
//! let mut g: GestureState<u32> = GestureState::new(Tool::Cut);
//! assert_eq!(g.pointer_down(Point::new(0.0, 0.0), None), None);
//! assert_eq!(
//!     g.pointer_up(Point::new(40.0, 0.0)),
//!     Some(Intent::Cut(Line::new((0.0, 0.0), (40.0, 0.0))))
//! );
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;
pub mod gesture;
pub mod hover;
pub mod types;
