// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON bodies exchanged with the content backend.

use canopy_session::{CardDraft, QuizQuestion};
use canopy_tree::ContentRecord;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// `POST /api/search`
#[derive(Debug, Serialize)]
pub(crate) struct SearchBody<'a> {
    pub(crate) query: &'a str,
}

/// `POST /api/web-search`
#[derive(Debug, Serialize)]
pub(crate) struct WebSearchBody<'a> {
    pub(crate) query: &'a str,
    pub(crate) count: usize,
    pub(crate) negative_prompts: &'a [String],
}

/// Answer to both search endpoints. The backend reports failures in-band.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchReply {
    #[serde(default)]
    pub(crate) results: Option<Vec<ContentRecord>>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Position {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// `POST /api/create-flashcards`
#[derive(Debug, Serialize)]
pub(crate) struct FlashcardsBody<'a> {
    pub(crate) search_result: &'a ContentRecord,
    pub(crate) count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) node_position: Option<Position>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FlashcardsReply {
    #[serde(default)]
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) flashcards: Vec<CardDraft>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

/// `POST /api/generate-quiz`
#[derive(Debug, Serialize)]
pub(crate) struct QuizBody<'a> {
    pub(crate) flashcards: &'a [CardDraft],
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuizReply {
    #[serde(default)]
    pub(crate) questions: Vec<QuizQuestion>,
}
