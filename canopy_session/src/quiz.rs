// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Saved quizzes and scores.

use core::fmt;

use canopy_tree::BranchId;
use kurbo::Point;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::service::{CardDraft, QuizQuestion};

/// Quiz handle, displayed as `quiz_N`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuizId(u64);

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quiz_{}", self.0)
    }
}

/// A finished attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Score {
    /// Correct answers.
    pub correct: usize,
    /// Questions asked.
    pub total: usize,
}

impl Score {
    /// Rounded percentage; 0 for an empty quiz.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "correct never exceeds total, so the result is at most 100."
    )]
    pub fn percentage(self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.correct as f64 * 100.0 / self.total as f64).round() as u32
    }
}

/// A generated quiz kept for replay.
#[derive(Clone, Debug, PartialEq)]
pub struct SavedQuiz {
    /// Handle.
    pub id: QuizId,
    /// Deck the quiz belongs to.
    pub deck: String,
    /// Branch it was harvested from, if any.
    pub branch: Option<BranchId>,
    /// Where that branch ended.
    pub node_position: Option<Point>,
    /// Questions, in order.
    pub questions: Vec<QuizQuestion>,
    /// Most recent result.
    pub last_score: Option<Score>,
}

/// Every quiz of a session, plus the one being played.
#[derive(Clone, Debug, Default)]
pub struct QuizBook {
    quizzes: Vec<SavedQuiz>,
    active: Option<QuizId>,
    next_id: u64,
}

impl QuizBook {
    /// Keep a quiz. Empty question lists are not kept.
    pub fn save(
        &mut self,
        deck: String,
        branch: Option<BranchId>,
        node_position: Option<Point>,
        questions: Vec<QuizQuestion>,
    ) -> Option<QuizId> {
        if questions.is_empty() {
            return None;
        }
        self.next_id += 1;
        let id = QuizId(self.next_id);
        self.quizzes.push(SavedQuiz {
            id,
            deck,
            branch,
            node_position,
            questions,
            last_score: None,
        });
        Some(id)
    }

    /// Look up a quiz.
    pub fn get(&self, id: QuizId) -> Option<&SavedQuiz> {
        self.quizzes.iter().find(|q| q.id == id)
    }

    /// All quizzes, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SavedQuiz> + '_ {
        self.quizzes.iter()
    }

    /// Number of saved quizzes.
    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    /// True when nothing is saved.
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    /// An unplayed quiz prepared for `branch`.
    pub fn prepared_for(&self, branch: BranchId) -> Option<QuizId> {
        self.quizzes
            .iter()
            .find(|q| q.branch == Some(branch) && q.last_score.is_none())
            .map(|q| q.id)
    }

    /// Make `id` the quiz being played.
    pub fn activate(&mut self, id: QuizId) -> bool {
        let known = self.get(id).is_some();
        if known {
            self.active = Some(id);
        }
        known
    }

    /// The quiz being played.
    pub fn active(&self) -> Option<&SavedQuiz> {
        self.active.and_then(|id| self.get(id))
    }

    /// Store the result of the active quiz and end it.
    pub fn record_score(&mut self, correct: usize) -> Option<Score> {
        let id = self.active.take()?;
        let quiz = self.quizzes.iter_mut().find(|q| q.id == id)?;
        let score = Score {
            correct: correct.min(quiz.questions.len()),
            total: quiz.questions.len(),
        };
        quiz.last_score = Some(score);
        Some(score)
    }

    /// Forget every quiz.
    pub fn clear(&mut self) {
        self.quizzes.clear();
        self.active = None;
    }
}

/// Questions built locally when the quiz generator is unavailable.
///
/// Each card becomes a question whose options are its answer plus up to three
/// distinct answers of other cards, shuffled.
pub fn fallback_questions<R: Rng + ?Sized>(cards: &[CardDraft], rng: &mut R) -> Vec<QuizQuestion> {
    cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let mut others: Vec<&CardDraft> = cards
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, c)| c)
                .collect();
            others.shuffle(rng);
            let mut options = vec![card.back.clone()];
            for other in others {
                if options.len() == 4 {
                    break;
                }
                if !options.contains(&other.back) {
                    options.push(other.back.clone());
                }
            }
            options.shuffle(rng);
            QuizQuestion {
                question: card.front.clone(),
                options,
                correct_answer: card.back.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn card(front: &str, back: &str) -> CardDraft {
        CardDraft {
            front: front.into(),
            back: back.into(),
            ..Default::default()
        }
    }

    fn question() -> QuizQuestion {
        QuizQuestion {
            question: "q".into(),
            options: vec!["a".into(), "b".into()],
            correct_answer: "a".into(),
        }
    }

    #[test]
    fn fallback_contains_the_answer_once() {
        let cards = [
            card("1", "one"),
            card("2", "two"),
            card("3", "three"),
            card("4", "four"),
            card("5", "two"),
        ];
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let qs = fallback_questions(&cards, &mut rng);
        assert_eq!(qs.len(), 5);
        for q in &qs {
            assert!(q.options.len() <= 4);
            assert_eq!(q.options.iter().filter(|o| **o == q.correct_answer).count(), 1);
        }
    }

    #[test]
    fn score_is_recorded_on_the_active_quiz() {
        let mut book = QuizBook::default();
        assert!(book.save("General".into(), None, None, Vec::new()).is_none());
        let id = book
            .save("General".into(), None, None, vec![question(), question()])
            .unwrap();
        assert_eq!(id.to_string(), "quiz_1");
        assert!(book.record_score(1).is_none());
        assert!(book.activate(id));
        let score = book.record_score(1).unwrap();
        assert_eq!(score.percentage(), 50);
        assert_eq!(book.get(id).unwrap().last_score, Some(score));
        assert!(book.active().is_none());
    }
}
