// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry utilities: inset segment intersection, point-to-segment distance,
//! and per-axis proximity windows.

use kurbo::{Line, Point};

/// Determinants below this magnitude are treated as parallel or degenerate.
pub const PARALLEL_EPSILON: f64 = 1e-10;

/// Both intersection parameters must fall inside this window.
///
/// The inset means a cut must cross the middle of a branch; touching either
/// end (where branches meet at joints) does not count.
pub const INSET_WINDOW: (f64, f64) = (0.1, 0.9);

/// Intersection parameters `(t, u)` of two segments, where `t` runs along `a`
/// and `u` along `b`. Returns `None` for parallel or degenerate inputs.
pub fn segment_params(a: Line, b: Line) -> Option<(f64, f64)> {
    let (x1, y1, x2, y2) = (a.p0.x, a.p0.y, a.p1.x, a.p1.y);
    let (x3, y3, x4, y4) = (b.p0.x, b.p0.y, b.p1.x, b.p1.y);
    let det = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / det;
    let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / det;
    Some((t, u))
}

/// True if `cut` crosses `branch` with both parameters inside [`INSET_WINDOW`].
pub fn segments_intersect(cut: Line, branch: Line) -> bool {
    let (lo, hi) = INSET_WINDOW;
    segment_params(cut, branch)
        .is_some_and(|(t, u)| (lo..=hi).contains(&t) && (lo..=hi).contains(&u))
}

/// Euclidean distance from `p` to the closest point of `seg`.
pub fn distance_point_to_segment(p: Point, seg: Line) -> f64 {
    let d = seg.p1 - seg.p0;
    let len_sq = d.hypot2();
    if len_sq < PARALLEL_EPSILON {
        return p.distance(seg.p0);
    }
    // Project onto the line, clamped to the segment.
    let t = ((p - seg.p0).dot(d) / len_sq).clamp(0.0, 1.0);
    p.distance(seg.p0 + d * t)
}

/// Strict per-axis window: `|dx| < tol && |dy| < tol`.
pub fn within_window(a: Point, b: Point, tol: f64) -> bool {
    (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol
}
