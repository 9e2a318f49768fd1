// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Index: a uniform-grid index of 2D joints.
//!
//! A joint is a point with a small copyable payload attached (typically the
//! identifier of the branch that starts or ends there). The index answers the
//! one question the tree engines keep asking: *which joints lie within a
//! tolerance window of this point?*
//!
//! - Insert, move, and remove points with user payloads via generational [`Key`]s.
//! - Query by point and tolerance with [`JointIndex::query_near`].
//!
//! Matching is per-axis and strict: a joint at `(jx, jy)` matches a query at
//! `(x, y)` with tolerance `tol` iff `|jx - x| < tol` and `|jy - y| < tol`.
//! Coordinates may be negative. Float inputs are assumed to be finite.
//!
//! # Example
//!
//! ```rust
//! use canopy_index::JointIndex;
//!
//! let mut joints: JointIndex<u32> = JointIndex::new(5.0);
//! let a = joints.insert(100.0, 40.0, 1);
//! let _b = joints.insert(300.0, 40.0, 2);
//!
//! let near: Vec<_> = joints.query_near(102.0, 43.0, 5.0).map(|(_, p)| p).collect();
//! assert_eq!(near, vec![1]);
//!
//! // Move the first joint away; the query no longer sees it.
//! joints.update(a, 160.0, 40.0);
//! assert_eq!(joints.query_near(102.0, 43.0, 5.0).count(), 0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod grid;
pub mod index;

pub use index::{JointIndex, Key};
