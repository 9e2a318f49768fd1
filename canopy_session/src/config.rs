// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session configuration: JSON file, defaults, and environment overrides.

use std::path::Path;

use canopy_tree::TreeParams;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SessionError;

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8001";

/// Environment variable overriding [`SessionConfig::api_url`].
pub const API_URL_VAR: &str = "CANOPY_API_URL";

/// Session settings.
///
/// Every field has a default, so a config file only needs the fields it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Base URL of the content backend.
    pub api_url: String,
    /// Initial viewport width.
    pub viewport_width: f64,
    /// Initial viewport height. Also bounds vertical panning.
    pub viewport_height: f64,
    /// How long a highlighted node stays highlighted.
    pub highlight_ms: f64,
    /// Flashcards requested per node; also the leaves added when requesting them.
    pub flashcards_per_node: usize,
    /// Flashcards drawn into one quiz.
    pub quiz_size: usize,
    /// Upper bound on expansion requests per batch of new branches.
    pub expansion_attempts: usize,
    /// Seed for the session RNG; entropy when absent.
    pub seed: Option<u64>,
    /// Engine tunables.
    pub tree: TreeParams,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            viewport_width: 1200.0,
            viewport_height: 800.0,
            highlight_ms: 3000.0,
            flashcards_per_node: 5,
            quiz_size: 5,
            expansion_attempts: 10,
            seed: None,
            tree: TreeParams::default(),
        }
    }
}

impl SessionConfig {
    /// Read a JSON config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_VAR) {
            self.api_url = url;
        }
        self
    }

    /// Initial viewport.
    pub fn viewport(&self) -> Size {
        Size::new(self.viewport_width, self.viewport_height)
    }
}
