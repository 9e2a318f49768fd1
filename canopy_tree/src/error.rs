// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User-input rejections.
//!
//! A rejection never mutates the tree. Its `Display` text is the status
//! message shown to the user.

use thiserror::Error;

/// Why an engine declined to act on a gesture.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    /// The gesture did not land on a node.
    #[error("Select a node to grow from.")]
    NoNode,
    /// The node already carries the maximum number of branches.
    #[error("Maximum branches reached for this node!")]
    MaxBranches,
    /// The cut segment was shorter than the minimum.
    #[error("Cut too small, ignoring.")]
    CutTooShort,
    /// The trunk cannot be moved.
    #[error("Cannot reposition the trunk!")]
    TrunkImmovable,
    /// No branch ends at the dragged node.
    #[error("Hover over a branch end first, then drag to reposition!")]
    NoBranchEnd,
    /// The leaves tool needs a node.
    #[error("No node selected for leaves!")]
    NoLeafNode,
    /// The flower tool needs a node.
    #[error("Hover over an end node first, then click to blossom knowledge!")]
    NoBloomNode,
    /// No branch starts at the node.
    #[error("No branches found at this node!")]
    NoBranchesAtNode,
    /// Flowers never grow on the trunk.
    #[error("Flowers can only grow on branch ends, not the trunk!")]
    FlowerOnTrunk,
    /// Flowers need a fully grown end.
    #[error("Flowers can only grow on fully grown branch ends!")]
    FlowerOnImmature,
    /// Flowers need leaves on their branch first.
    #[error("Grow some leaves on this branch before blossoming a flower!")]
    FlowerWithoutLeaves,
    /// A fruit already occupies the end.
    #[error("Remove the fruit first before blossoming another flower!")]
    FruitInTheWay,
    /// A flower already occupies the end.
    #[error("Flower already exists on this branch end!")]
    FlowerExists,
    /// Fruit grows only from flowers.
    #[error("Bear fruit of labour only works on flowers! Click on a flower to transform it.")]
    NotAFlower,
    /// A fruit already occupies the end.
    #[error("Fruit already exists on this branch end!")]
    FruitExists,
    /// Harvesting needs a fruit.
    #[error("Harvest tool only works on apples! Click on an apple to harvest knowledge.")]
    NotAFruit,
}
