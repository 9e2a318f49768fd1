// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A full session without a screen.
//!
//! Drives a session through pointer input: grow, study, make flashcards,
//! blossom, bear fruit, harvest a quiz, and prune. By default content comes
//! from a canned offline service; pass `--http` to talk to the backend at
//! `CANOPY_API_URL` (default `http://localhost:8001`) instead.
//!
//! Run:
//! - `cargo run -p canopy_demos --example headless_session`
//! - `RUST_LOG=canopy=info cargo run -p canopy_demos --example headless_session -- --http`

use canopy_client::HttpContentService;
use canopy_responder::types::Tool;
use canopy_session::{
    CardDraft, ContentService, QuizQuestion, ServiceError, Session, SessionConfig,
};
use canopy_tree::{BranchId, ContentRecord};
use kurbo::{Point, Vec2};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Deterministic stand-in for the content backend.
struct Offline;

fn record(title: String) -> ContentRecord {
    ContentRecord {
        snippet: Some(format!("An overview of {title}.")),
        title,
        ..ContentRecord::default()
    }
}

impl ContentService for Offline {
    async fn fetch_initial_topics(&self, query: &str) -> Result<Vec<ContentRecord>, ServiceError> {
        Ok((1..=5)
            .map(|i| record(format!("{query} area {i}")))
            .collect())
    }

    async fn expand_topic(
        &self,
        query: &str,
        count: usize,
        exclude: &[String],
    ) -> Result<Vec<ContentRecord>, ServiceError> {
        let stem = query.split(" in the context of ").next().unwrap_or(query);
        let stem = stem.trim_start_matches("deep research on ");
        Ok((exclude.len()..exclude.len() + count)
            .map(|i| record(format!("{stem} / facet {i}")))
            .collect())
    }

    async fn generate_flashcards(
        &self,
        record: &ContentRecord,
        count: usize,
    ) -> Result<Vec<CardDraft>, ServiceError> {
        Ok((1..=count)
            .map(|i| CardDraft {
                front: format!("key idea {i} of {}?", record.title),
                back: format!("idea {i}"),
                difficulty: Some("easy".into()),
                category: None,
            })
            .collect())
    }

    async fn generate_quiz(&self, cards: &[CardDraft]) -> Result<Vec<QuizQuestion>, ServiceError> {
        Err(ServiceError::Declined(format!(
            "offline: no quiz model for {} cards",
            cards.len()
        )))
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "canopy=debug".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn click<S: ContentService + 'static>(session: &mut Session<S>, tool: Tool, at: Point) {
    let _ = session.world_mut().set_tool(tool);
    session.pointer_down(at);
    session.pointer_up(at);
}

fn end_of<S: ContentService + 'static>(session: &Session<S>, id: BranchId) -> Option<Point> {
    let camera = session.world().camera().offset();
    session.world().tree().branch(id).map(|b| b.end + camera)
}

async fn run<S: ContentService + 'static>(config: SessionConfig, service: S) {
    let mut session = Session::new(config, service);
    session.start("astronomy").await;
    let Some((first, _)) = session.world().tree().branches().next() else {
        println!("{}", session.world().status().latest().unwrap_or_default());
        return;
    };
    while session.tick(16.0) > 0 {}

    let Some(end) = end_of(&session, first) else {
        return;
    };

    // Study and sprout
    click(&mut session, Tool::Study, end);
    click(&mut session, Tool::Growth, end);
    session.settle().await;
    while session.tick(16.0) > 0 {}

    // Flashcards, then flower and fruit on the same end
    click(&mut session, Tool::Leaves, end);
    session.settle().await;
    for deck in session.world().flashcards().decks() {
        info!(deck = deck.0, cards = deck.1.len(), "deck");
    }
    click(&mut session, Tool::Flower, end);
    click(&mut session, Tool::Fruit, end);
    session.settle().await;
    click(&mut session, Tool::Harvest, end);
    session.settle().await;
    if let Some(quiz) = session.world().quizzes().active() {
        for q in &quiz.questions {
            println!("Q: {}  [{}]", q.question, q.options.join(" | "));
        }
        let correct = quiz.questions.len().div_ceil(2);
        let _ = session.world_mut().record_score(correct);
    }

    // Jump to the first card's source, then pan away
    let first_card = session.world().flashcards().iter().next().map(|c| c.id);
    if let Some(card) = first_card {
        session.world_mut().highlight_card(card);
    }
    let _ = session.world_mut().set_tool(Tool::Pan);
    session.pointer_down(Point::new(400.0, 300.0));
    session.pointer_move(Point::new(380.0, 340.0));
    session.pointer_up(Point::new(380.0, 340.0));

    // Prune the first branch across its middle
    if let Some(b) = session.world().tree().branch(first).cloned() {
        let camera = session.world().camera().offset();
        let mid = b.point_at(0.5) + camera;
        let across = Vec2::new(-b.direction().y, b.direction().x) * 12.0;
        let _ = session.world_mut().set_tool(Tool::Cut);
        session.pointer_down(mid - across);
        session.pointer_up(mid + across);
    }

    println!("== Status log ==");
    for line in session.world().status().iter() {
        println!("  {line}");
    }
    println!(
        "{} branches, {} flashcards, {} quizzes",
        session.world().tree().branch_count(),
        session.world().flashcards().len(),
        session.world().quizzes().len()
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let config = SessionConfig {
        seed: Some(11),
        ..SessionConfig::default().with_env_overrides()
    };
    if std::env::args().any(|a| a == "--http") {
        let service = HttpContentService::from_config(&config);
        info!(url = service.base_url(), "using HTTP backend");
        run(config, service).await;
    } else {
        run(config, Offline).await;
    }
}
