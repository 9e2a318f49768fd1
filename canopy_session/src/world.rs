// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The session context every operation runs against.
//!
//! [`World`] owns the tree and everything keyed to it: camera, study
//! material, the content ledger, hover and gesture state, and the status log.
//! Operations are synchronous. Each tree-mutating operation, successful or
//! rejected, pushes exactly one status line. Work that needs a collaborator
//! comes back as a [`Request`]; its answer is fed back through the matching
//! `*_arrived` method as a separate mutation.

use canopy_responder::adapters::tree::{hover_at, pick};
use canopy_responder::gesture::GestureState;
use canopy_responder::hover::{HoverEvent, HoverState};
use canopy_responder::types::{Intent, Tool};
use canopy_tree::decorate::{add_leaves, bear_fruit, grow_flower, grow_leaves, harvest};
use canopy_tree::{
    BranchId, ContentRecord, GrowthKind, Hit, Node, Rejection, Tree, TreeParams, grow_from_node,
    prune, reposition, tick,
};
use hashbrown::HashSet;
use kurbo::{Line, Point, Size};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::camera::Camera;
use crate::config::SessionConfig;
use crate::content::{Attachment, ContentLedger, ContentTicket, Expansion, TicketId};
use crate::error::ServiceError;
use crate::flashcards::{CardId, FlashcardStore, GENERAL_DECK, deck_key, sample};
use crate::highlight::Highlight;
use crate::quiz::{QuizBook, Score, fallback_questions};
use crate::service::{CardDraft, QuizQuestion};
use crate::status::StatusLog;

/// Branch ends within this per-axis distance of a card's node position
/// count as its source.
const CARD_SOURCE_TOLERANCE: f64 = 20.0;

/// Flashcards wanted for a branch.
#[derive(Clone, Debug, PartialEq)]
pub struct FlashcardRequest {
    /// Branch the cards belong to.
    pub branch: BranchId,
    /// Its end when the request was made.
    pub at: Point,
    /// Content to derive the cards from.
    pub record: ContentRecord,
    /// Cards wanted.
    pub count: usize,
}

/// A quiz wanted from a set of cards.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizRequest {
    /// Branch the quiz was harvested or prepared from.
    pub branch: Option<BranchId>,
    /// Its end when the request was made.
    pub at: Option<Point>,
    /// Deck the quiz files under.
    pub deck: String,
    /// Cards to test.
    pub cards: Vec<CardDraft>,
    /// Play the quiz as soon as it arrives, rather than keeping it for later.
    pub start: bool,
}

/// Work for a content collaborator.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    /// Fill new branches with topics.
    Content(ContentTicket),
    /// Generate flashcards.
    Flashcards(FlashcardRequest),
    /// Generate a quiz.
    Quiz(QuizRequest),
}

/// Tree, camera, study material, and input state of one session.
pub struct World {
    config: SessionConfig,
    tree: Tree,
    rng: StdRng,
    viewport: Size,
    camera: Camera,
    gesture: GestureState<Node>,
    hover: HoverState<Node>,
    content: ContentLedger,
    flashcards: FlashcardStore,
    quizzes: QuizBook,
    highlight: Highlight,
    status: StatusLog,
    clock_ms: f64,
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("branches", &self.tree.branch_count())
            .field("tool", &self.gesture.tool())
            .field("camera", &self.camera.offset())
            .field("flashcards", &self.flashcards.len())
            .field("quizzes", &self.quizzes.len())
            .field("pending_content", &self.content.pending())
            .field("clock_ms", &self.clock_ms)
            .finish_non_exhaustive()
    }
}

impl World {
    /// A bare trunk in the configured viewport.
    pub fn new(config: SessionConfig) -> Self {
        let viewport = config.viewport();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            tree: Tree::for_viewport(viewport),
            rng,
            viewport,
            camera: Camera::new(viewport.height),
            gesture: GestureState::default(),
            hover: HoverState::new(),
            content: ContentLedger::default(),
            flashcards: FlashcardStore::default(),
            quizzes: QuizBook::default(),
            highlight: Highlight::default(),
            status: StatusLog::default(),
            clock_ms: 0.0,
            config,
        }
    }

    /// Settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Engine tunables.
    pub fn params(&self) -> &TreeParams {
        &self.config.tree
    }

    /// Read-only tree snapshot for rendering.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Current viewport.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Status lines, newest last.
    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    /// Topic bookkeeping.
    pub fn content(&self) -> &ContentLedger {
        &self.content
    }

    /// Flashcards.
    pub fn flashcards(&self) -> &FlashcardStore {
        &self.flashcards
    }

    /// Saved quizzes.
    pub fn quizzes(&self) -> &QuizBook {
        &self.quizzes
    }

    /// Highlighted branch end, if any.
    pub fn highlighted(&self) -> Option<BranchId> {
        self.highlight.current()
    }

    /// Hovered node, if any.
    pub fn hovered(&self) -> Option<Node> {
        self.hover.current()
    }

    /// Selected tool.
    pub fn tool(&self) -> Tool {
        self.gesture.tool()
    }

    /// Simulation time.
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    fn reject(&mut self, why: Rejection) {
        debug!(?why, "rejected");
        self.status.push(why.to_string());
    }

    fn forget(&mut self, removed: &HashSet<BranchId>) {
        self.content.cancel_removed(&self.tree);
        let cards = self.flashcards.remove_for_branches(removed);
        if cards > 0 {
            debug!(cards, "dropped flashcards of removed branches");
        }
        if self.highlight.current().is_some_and(|b| removed.contains(&b)) {
            self.highlight.cancel();
        }
        if self
            .hover
            .current()
            .and_then(Node::branch)
            .is_some_and(|b| removed.contains(&b))
        {
            let _ = self.hover.clear();
        }
    }

    // Session lifecycle

    /// Start a session on `query` once its initial topics have been fetched.
    ///
    /// On success the tree is replanted and the first fan is grown and given
    /// the topics by index. A failed fetch leaves everything as it was.
    pub fn begin(&mut self, query: &str, topics: Result<Vec<ContentRecord>, ServiceError>) {
        let topics = match topics {
            Ok(topics) => topics,
            Err(err) => {
                warn!(%err, "initial topic fetch failed");
                self.status.push("Search failed. Please try again.");
                return;
            }
        };
        let found = topics.len();
        self.clear_state();
        self.content.begin(query, topics);
        match grow_from_node(&mut self.tree, Node::TrunkTop, &self.config.tree, &mut self.rng) {
            Ok(growth) => {
                self.content.assign_initial(&mut self.tree, &growth.created);
                self.status.push(format!(
                    "Found {found} topics! Tree ready: use the growth tool to grow branches and the cut tool to prune them."
                ));
            }
            Err(why) => self.reject(why),
        }
    }

    /// Clear the tree and everything keyed to it.
    pub fn restart(&mut self) {
        self.clear_state();
        self.status.push("Tree cleared. Enter a topic to grow a new one.");
    }

    fn clear_state(&mut self) {
        self.tree.reset(Tree::base_for(self.viewport));
        self.content.clear();
        self.flashcards.clear();
        self.quizzes.clear();
        self.highlight.cancel();
        let _ = self.hover.clear();
        self.camera.reset();
    }

    /// Follow a viewport resize: the trunk stays centred on the ground line.
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.tree.relocate(Tree::base_for(viewport));
    }

    /// Advance the simulation by `dt_ms`. Returns the number of branches that
    /// grew this tick.
    pub fn tick(&mut self, dt_ms: f64) -> usize {
        self.clock_ms += dt_ms;
        if let Some(b) = self.highlight.expire(self.clock_ms) {
            debug!(branch = %b, "highlight cleared");
        }
        tick(&mut self.tree, dt_ms, &self.config.tree, &mut self.rng)
    }

    // Tools

    /// Grow from `node`.
    ///
    /// The first fan takes the initial topics directly. Sprouts ask for new
    /// topics derived from the node's own.
    pub fn grow(&mut self, node: Option<Node>) -> Option<Request> {
        let Some(node) = node else {
            self.reject(Rejection::NoNode);
            return None;
        };
        let growth = match grow_from_node(&mut self.tree, node, &self.config.tree, &mut self.rng) {
            Ok(g) => g,
            Err(why) => {
                self.reject(why);
                return None;
            }
        };
        self.status.push(growth.status());
        match growth.kind {
            GrowthKind::Fan => {
                self.content.assign_initial(&mut self.tree, &growth.created);
                None
            }
            GrowthKind::Sprout => {
                let topic = growth
                    .parent
                    .and_then(|p| self.tree.branch(p))
                    .and_then(|b| b.content.as_ref())
                    .map(|c| c.title.clone());
                self.content
                    .request(topic.as_deref(), growth.created)
                    .map(Request::Content)
            }
        }
    }

    /// Prune along a screen-space stroke.
    pub fn cut(&mut self, stroke: Line) {
        let cut = Line::new(self.camera.to_model(stroke.p0), self.camera.to_model(stroke.p1));
        match prune(&mut self.tree, cut, &self.config.tree) {
            Ok(report) => {
                let removed: HashSet<BranchId> = report.removed_ids().collect();
                self.forget(&removed);
                self.status.push(report.status());
            }
            Err(why) => self.reject(why),
        }
    }

    /// Leaves tool.
    ///
    /// A branch end with studyable content gets leaves and a flashcard
    /// request; any other node just grows leaves on its branches.
    pub fn leaves(&mut self, node: Option<Node>) -> Option<Request> {
        let Some(node) = node else {
            self.status
                .push("Hover over a node first, then click to create flashcards!");
            return None;
        };
        if let Node::BranchEnd(id) = node
            && let Some(branch) = self.tree.branch(id)
            && let Some(record) = branch.content.clone().filter(ContentRecord::is_studyable)
        {
            let at = branch.end;
            let count = self.config.flashcards_per_node;
            let grown = add_leaves(&mut self.tree, at, count, &self.config.tree, &mut self.rng);
            debug!(leaves = grown.leaves, branch = %id, "leaves added for flashcards");
            self.status
                .push(format!("Loading flashcards for {}...", record.title));
            return Some(Request::Flashcards(FlashcardRequest {
                branch: id,
                at,
                record,
                count,
            }));
        }
        match grow_leaves(&mut self.tree, node, &self.config.tree, &mut self.rng) {
            Ok(g) => self.status.push(g.status()),
            Err(why) => self.reject(why),
        }
        None
    }

    /// Flower tool.
    pub fn bloom(&mut self, node: Option<Node>) {
        let Some(node) = node else {
            self.reject(Rejection::NoBloomNode);
            return;
        };
        match grow_flower(&mut self.tree, node, &self.config.tree, &mut self.rng) {
            Ok(b) => self.status.push(b.status()),
            Err(why) => self.reject(why),
        }
    }

    /// Fruit tool. A branch with flashcards gets a quiz prepared for harvest.
    pub fn bear_fruit(&mut self, node: Option<Node>) -> Option<Request> {
        let Some(node) = node else {
            self.reject(Rejection::NotAFlower);
            return None;
        };
        let fruiting = match bear_fruit(&mut self.tree, node, &self.config.tree, &mut self.rng) {
            Ok(f) => f,
            Err(why) => {
                self.reject(why);
                return None;
            }
        };
        self.status.push(fruiting.status());
        let cards: Vec<CardDraft> = self
            .flashcards
            .for_branch(fruiting.branch)
            .into_iter()
            .map(|c| c.card.clone())
            .collect();
        if cards.is_empty() {
            return None;
        }
        self.quiz_request(Some(fruiting.branch), cards, false)
    }

    /// Harvest tool: pick the fruit and start its quiz.
    ///
    /// Uses the quiz prepared when the fruit formed if there is one, otherwise
    /// asks for a quiz over the branch's cards (or every card if the branch
    /// has none). Without any flashcards the fruit stays on the tree.
    pub fn harvest(&mut self, node: Option<Node>) -> Option<Request> {
        let Some(node @ Node::Fruit(id)) = node else {
            self.reject(Rejection::NotAFruit);
            return None;
        };
        if self.flashcards.is_empty() {
            self.status
                .push("No flashcards available for quiz! Create some flashcards first.");
            return None;
        }
        let fruit = match harvest(&mut self.tree, node) {
            Ok(f) => f,
            Err(why) => {
                self.reject(why);
                return None;
            }
        };
        if let Some(quiz) = self.quizzes.prepared_for(id) {
            self.quizzes.activate(quiz);
            let n = self.quizzes.active().map_or(0, |q| q.questions.len());
            self.status.push(format!(
                "Harvested {}! Quiz ready: {n} questions.",
                fruit.kind.name()
            ));
            return None;
        }
        let own = self.flashcards.for_branch(id);
        let pool = if own.is_empty() {
            self.flashcards.iter().collect()
        } else {
            own
        };
        let cards: Vec<CardDraft> = sample(&pool, self.config.quiz_size, &mut self.rng)
            .into_iter()
            .map(|c| c.card.clone())
            .collect();
        self.status.push(format!(
            "Harvested {}! Generating a quiz from {} flashcards...",
            fruit.kind.name(),
            cards.len()
        ));
        self.quiz_request(Some(id), cards, true)
    }

    /// Study tool: the content of `node`, if it has any.
    ///
    /// The trunk top studies the root query.
    pub fn study(&mut self, node: Option<Node>) -> Option<ContentRecord> {
        let record = match node? {
            Node::TrunkTop => self.content.root_query().map(ContentRecord::root_topic),
            other => other
                .branch()
                .and_then(|id| self.tree.branch(id))
                .and_then(|b| b.content.clone()),
        }?;
        self.status.push(format!("Studying {}", record.title));
        Some(record)
    }

    /// Reposition tool pressed on `node`.
    pub fn grab(&mut self, node: Option<Node>) {
        match node {
            Some(Node::TrunkTop) => self.reject(Rejection::TrunkImmovable),
            Some(_) => self.status.push("Drag to move and resize the branch!"),
            None => self.reject(Rejection::NoBranchEnd),
        }
    }

    /// Drag the end of `node` to a screen point.
    pub fn drag(&mut self, node: Node, screen: Point) {
        let target = self.camera.to_model(screen);
        match reposition(&mut self.tree, node, target, &self.config.tree) {
            Ok(r) => self.status.push(r.status()),
            Err(why) => self.reject(why),
        }
    }

    /// Centre the camera on the branch a card came from and highlight it.
    ///
    /// A new highlight replaces any pending one.
    pub fn highlight_card(&mut self, card: CardId) {
        let Some(pos) = self.flashcards.get(card).map(|c| c.node_position) else {
            self.status.push("Source node not found on tree");
            return;
        };
        let found = self
            .tree
            .first_ending_near(pos, CARD_SOURCE_TOLERANCE)
            .and_then(|id| self.tree.branch(id).map(|b| (id, b.end, b.content.clone())));
        let Some((id, end, content)) = found else {
            self.status.push("Source node not found on tree");
            return;
        };
        self.camera.center_on(end, self.viewport);
        self.highlight
            .start(id, self.clock_ms, self.config.highlight_ms);
        let title = content.map_or_else(|| id.to_string(), |c| c.title);
        self.status
            .push(format!("Highlighted source node: {title}"));
    }

    /// Finish the active quiz with `correct` right answers.
    pub fn record_score(&mut self, correct: usize) -> Option<Score> {
        let Some(score) = self.quizzes.record_score(correct) else {
            self.status.push("No quiz in progress.");
            return None;
        };
        self.status.push(format!(
            "Your Score: {}/{} ({}%)",
            score.correct,
            score.total,
            score.percentage()
        ));
        Some(score)
    }

    // Pointer input

    /// Select a tool, abandoning any gesture in flight.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<HoverEvent<Node>> {
        self.gesture.set_tool(tool);
        self.hover.clear()
    }

    /// Resolve what `tool` would pick at a screen point.
    pub fn pick(&self, tool: Tool, screen: Point) -> Option<Hit> {
        pick(
            &self.tree,
            tool,
            screen,
            self.camera.offset(),
            self.content.root_query(),
            &self.config.tree,
        )
    }

    /// Pointer pressed.
    pub fn pointer_down(&mut self, screen: Point) -> Option<Request> {
        let hit = self.pick(self.gesture.tool(), screen).map(|h| h.node);
        let intent = self.gesture.pointer_down(screen, hit)?;
        self.apply(intent)
    }

    /// Pointer moved. Returns hover transitions.
    pub fn pointer_move(&mut self, screen: Point) -> Vec<HoverEvent<Node>> {
        let events = hover_at(
            &mut self.hover,
            &self.tree,
            self.gesture.tool(),
            screen,
            self.camera.offset(),
            &self.config.tree,
        );
        if let Some(intent) = self.gesture.pointer_move(screen) {
            // Drags and pans never issue requests.
            let _ = self.apply(intent);
        }
        events
    }

    /// Pointer released.
    pub fn pointer_up(&mut self, screen: Point) -> Option<Request> {
        let intent = self.gesture.pointer_up(screen)?;
        self.apply(intent)
    }

    /// Carry out an intent.
    pub fn apply(&mut self, intent: Intent<Node>) -> Option<Request> {
        match intent {
            Intent::Apply { tool, node } => match tool {
                Tool::Growth => self.grow(node),
                Tool::Leaves => self.leaves(node),
                Tool::Fruit => self.bear_fruit(node),
                Tool::Harvest => self.harvest(node),
                Tool::Flower => {
                    self.bloom(node);
                    None
                }
                Tool::Study => {
                    let _ = self.study(node);
                    None
                }
                Tool::Cut | Tool::Reposition | Tool::Pan => None,
            },
            Intent::Cut(stroke) => {
                self.cut(stroke);
                None
            }
            Intent::Grab(node) => {
                self.grab(node);
                None
            }
            Intent::Drag { node, to } => {
                self.drag(node, to);
                None
            }
            Intent::Pan(delta) => {
                self.camera.pan_by(delta);
                None
            }
            Intent::Release(_) | Intent::PanStart | Intent::PanEnd => None,
        }
    }

    // Collaborator answers

    /// Apply the answer to a content ticket.
    pub fn content_arrived(&mut self, ticket: TicketId, result: Result<Expansion, ServiceError>) {
        let expansion = match result {
            Ok(e) => e,
            Err(err) => {
                warn!(%ticket, %err, "content expansion failed");
                if self.content.abandon(ticket) {
                    self.status
                        .push("Web search failed. Branches created without search results.");
                }
                return;
            }
        };
        match self
            .content
            .attach(&mut self.tree, ticket, expansion.records)
        {
            Attachment::Dropped => {}
            Attachment::Assigned { assigned } if expansion.attempts > 1 => {
                self.status.push(format!(
                    "Found {assigned} unique web search results after {} attempts with negative prompts!",
                    expansion.attempts
                ));
            }
            Attachment::Assigned { assigned } => {
                self.status.push(format!(
                    "Found {assigned} unique web search results for new branches!"
                ));
            }
        }
    }

    /// File generated flashcards. Cards for a branch pruned meanwhile are dropped.
    pub fn flashcards_arrived(
        &mut self,
        req: FlashcardRequest,
        result: Result<Vec<CardDraft>, ServiceError>,
    ) {
        if !self.tree.is_alive(req.branch) {
            debug!(branch = %req.branch, "dropping flashcards for removed branch");
            return;
        }
        match result {
            Ok(drafts) => {
                let ids = self
                    .flashcards
                    .file(&self.tree, req.branch, req.at, drafts);
                self.status.push(format!(
                    "Created {} flashcards for {}",
                    ids.len(),
                    req.record.title
                ));
            }
            Err(err) => {
                warn!(%err, "flashcard generation failed");
                self.status
                    .push(format!("Failed to create flashcards: {err}"));
            }
        }
    }

    /// Save a generated quiz, falling back to locally built questions if
    /// generation failed.
    pub fn quiz_arrived(
        &mut self,
        req: QuizRequest,
        result: Result<Vec<QuizQuestion>, ServiceError>,
    ) {
        let questions = result.unwrap_or_else(|err| {
            warn!(%err, "quiz generation failed, building questions locally");
            fallback_questions(&req.cards, &mut self.rng)
        });
        let n = questions.len();
        let Some(id) = self
            .quizzes
            .save(req.deck.clone(), req.branch, req.at, questions)
        else {
            self.status.push("Not enough flashcards available for quiz!");
            return;
        };
        if req.start {
            self.quizzes.activate(id);
            self.status
                .push(format!("Quiz ready: {n} questions on {}!", req.deck));
        } else {
            self.status
                .push(format!("Prepared a {n}-question quiz on {}.", req.deck));
        }
    }

    fn quiz_request(
        &mut self,
        branch: Option<BranchId>,
        cards: Vec<CardDraft>,
        start: bool,
    ) -> Option<Request> {
        if cards.is_empty() {
            return None;
        }
        let deck = self.quiz_deck(branch);
        let at = branch.and_then(|b| self.tree.branch(b)).map(|b| b.end);
        Some(Request::Quiz(QuizRequest {
            branch,
            at,
            deck,
            cards,
            start,
        }))
    }

    /// Deck for a quiz: the branch's title, then its deck, then the deck of
    /// the first card, then [`GENERAL_DECK`].
    fn quiz_deck(&self, branch: Option<BranchId>) -> String {
        if let Some(b) = branch {
            if let Some(c) = self.tree.branch(b).and_then(|b| b.content.as_ref())
                && !c.title.is_empty()
            {
                return c.title.clone();
            }
            if let Some(card) = self.flashcards.for_branch(b).first() {
                return card.deck.clone();
            }
            return deck_key(&self.tree, b, None);
        }
        self.flashcards
            .iter()
            .next()
            .map_or_else(|| GENERAL_DECK.to_owned(), |c| c.deck.clone())
    }
}
