// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover state helper: compute enter/leave transitions as the hovered node changes.
//!
//! The tree has no nesting to speak of at pick time (a pick returns one node),
//! so hover tracks a single target rather than a path.
//!
//! ## Minimal example
//!
//! ```
//! use canopy_responder::hover::{HoverEvent, HoverState};
//! let mut h: HoverState<u32> = HoverState::new();
//! assert_eq!(h.update(Some(1)), vec![HoverEvent::Enter(1)]);
//! assert_eq!(h.update(Some(2)), vec![HoverEvent::Leave(1), HoverEvent::Enter(2)]);
//! assert_eq!(h.update(None), vec![HoverEvent::Leave(2)]);
//! ```

use alloc::vec::Vec;

/// Tracks the currently hovered node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoverState<K: Copy + Eq> {
    current: Option<K>,
}

/// A hover transition event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoverEvent<K> {
    /// Pointer enters the given node.
    Enter(K),
    /// Pointer leaves the given node.
    Leave(K),
}

impl<K: Copy + Eq> HoverState<K> {
    /// Create an empty hover state.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// The hovered node, if any.
    pub fn current(&self) -> Option<K> {
        self.current
    }

    /// Forget the hovered node, returning its leave event.
    pub fn clear(&mut self) -> Vec<HoverEvent<K>> {
        self.current.take().map(HoverEvent::Leave).into_iter().collect()
    }

    /// Move hover to `next`. A leave, if any, always precedes the enter.
    pub fn update(&mut self, next: Option<K>) -> Vec<HoverEvent<K>> {
        if self.current == next {
            return Vec::new();
        }
        let mut out = self.clear();
        if let Some(k) = next {
            out.push(HoverEvent::Enter(k));
        }
        self.current = next;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn hover_enter_from_nothing() {
        let mut h: HoverState<u32> = HoverState::new();
        assert_eq!(h.update(Some(3)), vec![HoverEvent::Enter(3)]);
        assert_eq!(h.current(), Some(3));
    }

    #[test]
    fn hover_leave_to_empty() {
        let mut h: HoverState<u32> = HoverState::new();
        let _ = h.update(Some(2));
        assert_eq!(h.clear(), vec![HoverEvent::Leave(2)]);
        assert_eq!(h.current(), None);
        assert!(h.clear().is_empty());
    }

    // Switching targets: leave the old one before entering the new one.
    #[test]
    fn hover_switch_orders_leave_first() {
        let mut h: HoverState<u32> = HoverState::new();
        let _ = h.update(Some(1));
        assert_eq!(
            h.update(Some(4)),
            vec![HoverEvent::Leave(1), HoverEvent::Enter(4)]
        );
    }

    #[test]
    fn hover_same_target_no_events() {
        let mut h: HoverState<u32> = HoverState::new();
        let _ = h.update(Some(7));
        assert!(h.update(Some(7)).is_empty());
        assert!(HoverState::<u32>::new().update(None).is_empty());
    }
}
