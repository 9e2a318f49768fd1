// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the tree: branch identifiers, branches, decorations, and nodes.

use core::fmt;

use kurbo::{Line, Point, Vec2};

/// Identifier for a branch in the tree.
///
/// A small, copyable handle that stays stable while the branch lives and
/// becomes stale once the branch is pruned.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On removal (pruning or [`Tree::reset`](crate::Tree::reset)), the slot is freed;
///   any `BranchId` pointing at it is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `BranchId`.
///
/// Stale ids never alias a newer branch, so content that arrives for a pruned
/// branch can be dropped by checking [`Tree::is_alive`](crate::Tree::is_alive).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BranchId(pub(crate) u32, pub(crate) u32);

impl BranchId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "branch_{}_{}", self.0, self.1)
    }
}

/// Educational content associated with a branch (or the trunk).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentRecord {
    /// Topic title. Also the key used for duplicate avoidance (case-insensitive).
    pub title: String,
    /// Short description.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub snippet: Option<String>,
    /// Longer generated text.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub llm_content: Option<String>,
    /// Source link, if any.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub url: Option<String>,
}

impl ContentRecord {
    /// A record with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// The synthetic record shown for the trunk top.
    pub fn root_topic(query: &str) -> Self {
        Self {
            title: query.into(),
            snippet: Some(query.into()),
            llm_content: Some(format!(
                "This is your main topic: {query}. The branches below represent the 5 primary areas within this field."
            )),
            url: None,
        }
    }

    /// Generated text if present, otherwise the snippet.
    pub fn body(&self) -> Option<&str> {
        self.llm_content
            .as_deref()
            .or(self.snippet.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// True if there is enough text to derive flashcards from.
    pub fn is_studyable(&self) -> bool {
        !self.title.is_empty() && self.body().is_some()
    }
}

/// A branch segment.
///
/// `start` is fixed at creation (it only moves when an ancestor is
/// repositioned). `end` always lies on the ray from `start` at `angle`, at
/// distance `length`.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    /// Joint the branch grows from.
    pub start: Point,
    /// Current tip.
    pub end: Point,
    /// Fixed growth direction in radians (screen space, y down).
    pub angle: f64,
    /// Current grown length, `0 <= length <= max_length`.
    pub length: f64,
    /// Target length.
    pub max_length: f64,
    /// Stroke thickness, at least 1.
    pub thickness: f64,
    /// 1 for branches rooted at the trunk, parent generation + 1 otherwise.
    pub generation: u32,
    /// Originating branch, or `None` when rooted at the trunk.
    pub parent: Option<BranchId>,
    /// Associated content, attached asynchronously.
    pub content: Option<ContentRecord>,
}

impl Branch {
    /// A branch starting at `start` heading along `angle`, grown to `length`.
    pub fn new(start: Point, angle: f64, length: f64, max_length: f64) -> Self {
        let mut branch = Self {
            start,
            end: start,
            angle,
            length,
            max_length,
            thickness: 1.0,
            generation: 1,
            parent: None,
            content: None,
        };
        branch.end = branch.tip_at(length);
        branch
    }

    /// Fully grown branches are cuttable, clickable, and can carry flowers.
    pub fn is_mature(&self) -> bool {
        self.length >= self.max_length
    }

    /// Unit vector along the branch.
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    /// The point at `length` along the branch ray.
    pub fn tip_at(&self, length: f64) -> Point {
        self.start + self.direction() * length
    }

    /// Linear interpolation between `start` (t = 0) and `end` (t = 1).
    pub fn point_at(&self, t: f64) -> Point {
        self.start.lerp(self.end, t)
    }

    /// The branch as a line segment.
    pub fn segment(&self) -> Line {
        Line::new(self.start, self.end)
    }
}

/// Where a leaf sits on its branch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LeafAnchor {
    /// Owning branch.
    pub branch: BranchId,
    /// Position along the branch, 0..=1.
    pub t: f64,
    /// Fixed jitter applied after interpolation.
    pub offset: Vec2,
}

impl LeafAnchor {
    /// Derived leaf position for the branch's current geometry.
    pub fn resolve(&self, branch: &Branch) -> Point {
        branch.point_at(self.t) + self.offset
    }
}

/// A leaf decoration.
///
/// Anchored leaves have a derived position (see [`LeafAnchor::resolve`]);
/// `position` caches it and is refreshed whenever the branch moves.
/// Leaves without an anchor are standalone and never cleaned up.
#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
    /// Cached world position.
    pub position: Point,
    /// Leaf size.
    pub size: f64,
    /// Rest rotation.
    pub angle: f64,
    /// Sway phase.
    pub sway: f64,
    /// Owning branch, if any.
    pub anchor: Option<LeafAnchor>,
}

/// Flower varieties.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FlowerKind {
    /// Cherry blossom.
    Blossom,
    /// Hibiscus.
    Hibiscus,
    /// Daisy.
    Daisy,
}

impl FlowerKind {
    /// Every variety, in selection order.
    pub const ALL: [Self; 3] = [Self::Blossom, Self::Hibiscus, Self::Daisy];

    /// Lowercase name used in status text.
    pub fn name(self) -> &'static str {
        match self {
            Self::Blossom => "blossom",
            Self::Hibiscus => "hibiscus",
            Self::Daisy => "daisy",
        }
    }
}

/// A flower on a fully grown branch end.
#[derive(Clone, Debug, PartialEq)]
pub struct Flower {
    /// World position (the branch end when it bloomed).
    pub position: Point,
    /// Variety.
    pub kind: FlowerKind,
    /// Size.
    pub size: f64,
    /// Sway phase.
    pub sway: f64,
    /// Owning branch.
    pub branch: BranchId,
}

/// Fruit varieties.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FruitKind {
    /// The fruit of labour.
    Apple,
}

impl FruitKind {
    /// Lowercase name used in status text.
    pub fn name(self) -> &'static str {
        match self {
            Self::Apple => "apple",
        }
    }
}

/// A fruit that replaced a flower.
#[derive(Clone, Debug, PartialEq)]
pub struct Fruit {
    /// World position (taken over from the flower).
    pub position: Point,
    /// Variety.
    pub kind: FruitKind,
    /// Size.
    pub size: f64,
    /// Sway phase.
    pub sway: f64,
    /// Owning branch.
    pub branch: BranchId,
}

/// An interactive node of the tree.
///
/// Flowers and fruit are identified by their branch: each branch end carries
/// at most one of each.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    /// The virtual node at the top of the trunk.
    TrunkTop,
    /// The end of a branch.
    BranchEnd(BranchId),
    /// The flower on a branch end.
    Flower(BranchId),
    /// The fruit on a branch end.
    Fruit(BranchId),
}

impl Node {
    /// The branch this node belongs to, if any.
    pub fn branch(self) -> Option<BranchId> {
        match self {
            Self::TrunkTop => None,
            Self::BranchEnd(id) | Self::Flower(id) | Self::Fruit(id) => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    #[test]
    fn new_branch_tip_lies_on_ray() {
        let b = Branch::new(Point::new(10.0, 10.0), -FRAC_PI_2, 30.0, 90.0);
        assert!((b.end.x - 10.0).abs() < 1e-9, "x should not move: {:?}", b.end);
        assert!((b.end.y + 20.0).abs() < 1e-9, "should point up: {:?}", b.end);
        assert!(!b.is_mature());
    }

    #[test]
    fn content_body_prefers_generated_text() {
        let mut c = ContentRecord::titled("Optics");
        assert!(!c.is_studyable());
        c.snippet = Some("light".into());
        assert_eq!(c.body(), Some("light"));
        c.llm_content = Some("lenses and light".into());
        assert_eq!(c.body(), Some("lenses and light"));
        assert!(c.is_studyable());
    }

    #[test]
    fn root_topic_mentions_query() {
        let c = ContentRecord::root_topic("botany");
        assert_eq!(c.title, "botany");
        assert!(c.body().unwrap().contains("main topic: botany"));
    }
}
