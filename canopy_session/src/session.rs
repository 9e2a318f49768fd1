// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Async driver around a [`World`].
//!
//! [`Session`] forwards input to the world and turns every [`Request`] it
//! returns into a future against the [`ContentService`]. Futures run
//! concurrently on the caller's thread; their answers are applied one at a
//! time, in completion order, by [`Session::next_completion`] or
//! [`Session::settle`]. The tree is never borrowed across an await.

use std::rc::Rc;

use canopy_responder::hover::HoverEvent;
use canopy_tree::{ContentRecord, Node};
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use kurbo::Point;
use tracing::debug;

use crate::config::SessionConfig;
use crate::content::{Expansion, TicketId, expand};
use crate::error::ServiceError;
use crate::service::{CardDraft, ContentService, QuizQuestion};
use crate::world::{FlashcardRequest, QuizRequest, Request, World};

enum Completion {
    Content(TicketId, Result<Expansion, ServiceError>),
    Flashcards(FlashcardRequest, Result<Vec<CardDraft>, ServiceError>),
    Quiz(QuizRequest, Result<Vec<QuizQuestion>, ServiceError>),
}

/// A [`World`] wired to a content collaborator.
pub struct Session<S> {
    world: World,
    service: Rc<S>,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, Completion>>,
}

impl<S> core::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("world", &self.world)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl<S: ContentService + 'static> Session<S> {
    /// A fresh session.
    pub fn new(config: SessionConfig, service: S) -> Self {
        Self {
            world: World::new(config),
            service: Rc::new(service),
            in_flight: FuturesUnordered::new(),
        }
    }

    /// The world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, for operations not routed through pointer input.
    ///
    /// Requests returned by such calls should be handed to [`Session::submit`].
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Fetch topics for `query` and grow the first fan.
    pub async fn start(&mut self, query: &str) {
        let topics: Result<Vec<ContentRecord>, ServiceError> =
            self.service.fetch_initial_topics(query).await;
        self.world.begin(query, topics);
    }

    /// Run the collaborator calls behind `requests`.
    pub fn submit(&mut self, requests: impl IntoIterator<Item = Request>) {
        for request in requests {
            let service = Rc::clone(&self.service);
            let fut = match request {
                Request::Content(ticket) => {
                    let attempts = self.world.config().expansion_attempts;
                    async move {
                        let result = expand(&*service, &ticket, attempts).await;
                        Completion::Content(ticket.id, result)
                    }
                    .boxed_local()
                }
                Request::Flashcards(req) => async move {
                    let result = service.generate_flashcards(&req.record, req.count).await;
                    Completion::Flashcards(req, result)
                }
                .boxed_local(),
                Request::Quiz(req) => async move {
                    let result = service.generate_quiz(&req.cards).await;
                    Completion::Quiz(req, result)
                }
                .boxed_local(),
            };
            self.in_flight.push(fut);
        }
        debug!(in_flight = self.in_flight.len(), "submitted requests");
    }

    /// Pointer pressed.
    pub fn pointer_down(&mut self, at: Point) {
        let requests = self.world.pointer_down(at);
        self.submit(requests);
    }

    /// Pointer moved. Returns hover transitions.
    pub fn pointer_move(&mut self, at: Point) -> Vec<HoverEvent<Node>> {
        self.world.pointer_move(at)
    }

    /// Pointer released.
    pub fn pointer_up(&mut self, at: Point) {
        let requests = self.world.pointer_up(at);
        self.submit(requests);
    }

    /// Advance the simulation.
    pub fn tick(&mut self, dt_ms: f64) -> usize {
        self.world.tick(dt_ms)
    }

    /// Collaborator calls still running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Wait for the next collaborator answer and apply it.
    ///
    /// Returns `false` when nothing is in flight.
    pub async fn next_completion(&mut self) -> bool {
        let Some(done) = self.in_flight.next().await else {
            return false;
        };
        match done {
            Completion::Content(ticket, result) => self.world.content_arrived(ticket, result),
            Completion::Flashcards(req, result) => self.world.flashcards_arrived(req, result),
            Completion::Quiz(req, result) => self.world.quiz_arrived(req, result),
        }
        true
    }

    /// Apply answers until nothing is in flight. Returns how many were applied.
    pub async fn settle(&mut self) -> usize {
        let mut applied = 0;
        while self.next_completion().await {
            applied += 1;
        }
        applied
    }
}
