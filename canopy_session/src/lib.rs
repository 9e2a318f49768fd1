// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Session: one learner's tree and everything hanging off it.
//!
//! ## Overview
//!
//! - [`World`]: the explicit context object. Owns the [`canopy_tree::Tree`],
//!   camera, flashcards, quizzes, the content ledger, hover/gesture state, and
//!   the status log. Every operation is synchronous and reports exactly one
//!   status line when it changes the tree or refuses to.
//! - [`ContentService`]: the collaborator seam for topics, flashcards, and
//!   quizzes. `canopy_client` implements it over HTTP; tests use fakes.
//! - [`Session`]: drives a world against a service. Collaborator calls run as
//!   futures; answers are applied as separate mutations, so a branch pruned
//!   while its content is in flight simply never receives it.
//!
//! ## Minimal usage
//!
//! ```no_run
//! # use canopy_session::{CardDraft, ContentService, QuizQuestion, ServiceError, Session, SessionConfig};
//! # use canopy_tree::ContentRecord;
//! # struct Backend;
//! # impl ContentService for Backend {
//! #     async fn fetch_initial_topics(&self, _: &str) -> Result<Vec<ContentRecord>, ServiceError> { Ok(vec![]) }
//! #     async fn expand_topic(&self, _: &str, _: usize, _: &[String]) -> Result<Vec<ContentRecord>, ServiceError> { Ok(vec![]) }
//! #     async fn generate_flashcards(&self, _: &ContentRecord, _: usize) -> Result<Vec<CardDraft>, ServiceError> { Ok(vec![]) }
//! #     async fn generate_quiz(&self, _: &[CardDraft]) -> Result<Vec<QuizQuestion>, ServiceError> { Ok(vec![]) }
//! # }
//! # async fn run() {
//! let mut session = Session::new(SessionConfig::default().with_env_overrides(), Backend);
//! session.start("photosynthesis").await;
//! while session.tick(16.0) > 0 {}
//! session.settle().await;
//! println!("{:?}", session.world().status().latest());
//! # }
//! ```

mod camera;
mod config;
mod content;
mod error;
mod flashcards;
mod highlight;
mod quiz;
mod service;
mod session;
mod status;
mod world;

pub use camera::Camera;
pub use config::{API_URL_VAR, DEFAULT_API_URL, SessionConfig};
pub use content::{Attachment, ContentLedger, ContentTicket, Expansion, TicketId, expand};
pub use error::{ServiceError, SessionError};
pub use flashcards::{
    CardId, Flashcard, FlashcardStore, GENERAL_DECK, deck_key, proper_case, sample,
};
pub use highlight::Highlight;
pub use quiz::{QuizBook, QuizId, SavedQuiz, Score, fallback_questions};
pub use service::{CardDraft, ContentService, QuizQuestion};
pub use session::Session;
pub use status::StatusLog;
pub use world::{FlashcardRequest, QuizRequest, Request, World};
