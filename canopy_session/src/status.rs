// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded log of user-facing status lines.

use std::collections::VecDeque;

use tracing::info;

/// Bounded history of user-facing status lines, newest last.
#[derive(Clone, Debug)]
pub struct StatusLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl StatusLog {
    /// Keep at most `capacity` lines (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a status line.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!(status = %line);
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// The most recent line.
    pub fn latest(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    /// Lines oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_lines_fall_off() {
        let mut log = StatusLog::with_capacity(2);
        log.push("a");
        log.push("b");
        log.push("c");
        assert_eq!(log.iter().collect::<Vec<_>>(), ["b", "c"]);
        assert_eq!(log.latest(), Some("c"));
    }
}
