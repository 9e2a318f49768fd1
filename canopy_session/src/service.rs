// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The content collaborator seam.
//!
//! The session never talks to a backend directly. It asks a [`ContentService`]
//! for topics, flashcards and quizzes, and applies whatever comes back as a
//! separate mutation. Implementations decide transport and retries.

use std::future::Future;

use canopy_tree::ContentRecord;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// A generated flashcard before the session has filed it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDraft {
    /// Question side.
    pub front: String,
    /// Answer side.
    pub back: String,
    /// Difficulty label, if the generator gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// Topic label, if the generator gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A multiple-choice question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Prompt.
    pub question: String,
    /// Choices, including the correct one.
    pub options: Vec<String>,
    /// The correct choice.
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
}

/// Asynchronous source of study material.
///
/// Futures are awaited on the session's thread; they need not be `Send`.
pub trait ContentService {
    /// Topics seeding the first fan for `query`.
    fn fetch_initial_topics(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<ContentRecord>, ServiceError>>;

    /// Up to `count` records for `query`, avoiding the titles in `exclude`.
    fn expand_topic(
        &self,
        query: &str,
        count: usize,
        exclude: &[String],
    ) -> impl Future<Output = Result<Vec<ContentRecord>, ServiceError>>;

    /// `count` flashcards derived from `record`.
    fn generate_flashcards(
        &self,
        record: &ContentRecord,
        count: usize,
    ) -> impl Future<Output = Result<Vec<CardDraft>, ServiceError>>;

    /// Questions testing `cards`.
    fn generate_quiz(
        &self,
        cards: &[CardDraft],
    ) -> impl Future<Output = Result<Vec<QuizQuestion>, ServiceError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_question_uses_camel_case_answer() {
        let q: QuizQuestion = serde_json::from_str(
            r#"{ "question": "2+2?", "options": ["3", "4"], "correctAnswer": "4" }"#,
        )
        .unwrap();
        assert_eq!(q.correct_answer, "4");
        assert!(serde_json::to_string(&q).unwrap().contains("correctAnswer"));
    }
}
