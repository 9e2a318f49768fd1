// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the responder: tools, pick targets, and intents.
//!
//! ## Overview
//!
//! A [`Tool`] decides which node kinds a pointer may pick ([`Targets`]) and how
//! a pointer sequence turns into an [`Intent`]. Intents are what the
//! [`gesture`](crate::gesture) machine hands to the session layer.

use core::fmt;
use core::str::FromStr;

use kurbo::{Line, Point, Vec2};

/// Editing tools.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Grow branches from the clicked node.
    #[default]
    Growth,
    /// Drag a line to prune.
    Cut,
    /// Grow leaves (and study cards) on the clicked node.
    Leaves,
    /// Turn a flower into fruit.
    Fruit,
    /// Pick fruit and take a quiz.
    Harvest,
    /// Blossom a flower on a branch end.
    Flower,
    /// Drag a branch end.
    Reposition,
    /// Drag the camera.
    Pan,
    /// Show a node's content.
    Study,
}

impl Tool {
    /// Every tool, in toolbar order.
    pub const ALL: [Self; 9] = [
        Self::Growth,
        Self::Cut,
        Self::Leaves,
        Self::Fruit,
        Self::Harvest,
        Self::Flower,
        Self::Reposition,
        Self::Pan,
        Self::Study,
    ];

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Growth => "growth",
            Self::Cut => "cut",
            Self::Leaves => "leaves",
            Self::Fruit => "fruit",
            Self::Harvest => "harvest",
            Self::Flower => "flower",
            Self::Reposition => "reposition",
            Self::Pan => "pan",
            Self::Study => "study",
        }
    }

    /// Node kinds this tool may pick.
    ///
    /// Fruit and flowers overlap branch ends, so only the tools that act on
    /// them ask for them.
    pub fn targets(self) -> Targets {
        match self {
            Self::Harvest => Targets::TRUNK | Targets::FRUIT | Targets::BRANCH_ENDS,
            Self::Fruit => Targets::TRUNK | Targets::FLOWERS | Targets::BRANCH_ENDS,
            _ => Targets::TRUNK | Targets::BRANCH_ENDS,
        }
    }

    /// Whether pointer moves should track the hovered node.
    pub fn hovers(self) -> bool {
        !matches!(self, Self::Cut)
    }

    /// How a pointer sequence is interpreted.
    pub fn gesture(self) -> GestureKind {
        match self {
            Self::Cut => GestureKind::Stroke,
            Self::Reposition => GestureKind::Drag,
            Self::Pan => GestureKind::Pan,
            _ => GestureKind::Click,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned by [`Tool::from_str`] for unknown names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownTool;

impl fmt::Display for UnknownTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown tool")
    }
}

impl FromStr for Tool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownTool)
    }
}

bitflags::bitflags! {
    /// Node kinds a tool may pick.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Targets: u8 {
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

/// Pointer sequence shapes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GestureKind {
    /// Acts once on pointer down.
    Click,
    /// Down starts a line, up finishes it.
    Stroke,
    /// Down grabs a node, moves drag it, up releases it.
    Drag,
    /// Moves scroll the camera while the pointer is down.
    Pan,
}

/// What the session should do in response to pointer input.
///
/// Points are in screen space; converting to model space (subtracting the
/// camera offset) is the receiver's job.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent<K> {
    /// A click tool fired. `node` is `None` when nothing was under the pointer.
    Apply {
        /// Tool that fired.
        tool: Tool,
        /// Node under the pointer.
        node: Option<K>,
    },
    /// A cut stroke finished.
    Cut(Line),
    /// The reposition tool was pressed; `None` when nothing was under the pointer.
    Grab(Option<K>),
    /// The grabbed node was dragged to a new point.
    Drag {
        /// Grabbed node.
        node: K,
        /// Pointer position.
        to: Point,
    },
    /// The grabbed node was let go.
    Release(K),
    /// Panning started.
    PanStart,
    /// The camera should move by `delta`.
    Pan(Vec2),
    /// Panning ended.
    PanEnd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fruit_tools_see_decorations() {
        assert!(Tool::Harvest.targets().contains(Targets::FRUIT));
        assert!(!Tool::Harvest.targets().contains(Targets::FLOWERS));
        assert!(Tool::Fruit.targets().contains(Targets::FLOWERS));
        for t in [Tool::Growth, Tool::Flower, Tool::Study, Tool::Reposition] {
            assert_eq!(t.targets(), Targets::TRUNK | Targets::BRANCH_ENDS);
        }
    }

    #[test]
    fn names_round_trip_case_insensitively() {
        for t in Tool::ALL {
            assert_eq!(t.name().parse::<Tool>(), Ok(t));
        }
        assert_eq!("PAN".parse::<Tool>(), Ok(Tool::Pan));
        assert_eq!("saw".parse::<Tool>(), Err(UnknownTool));
    }

    #[test]
    fn cut_is_the_only_tool_without_hover() {
        let silent: alloc::vec::Vec<Tool> = Tool::ALL.into_iter().filter(|t| !t.hovers()).collect();
        assert_eq!(silent, alloc::vec![Tool::Cut]);
    }
}
