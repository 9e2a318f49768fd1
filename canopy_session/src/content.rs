// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content assignment: which topic each branch studies.
//!
//! New branches are created synchronously and receive content later. Growth
//! issues a [`ContentTicket`]; the session resolves it with [`expand`] and
//! hands the records back to [`ContentLedger::attach`], which assigns them to
//! the ticket's branches by index.
//!
//! Tickets are cancelled when pruning kills every branch they name. Branch
//! ids are generational, so a late record can never land on a branch that
//! reused a pruned slot.

use core::fmt;

use canopy_tree::{BranchId, ContentRecord, Tree};
use hashbrown::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::error::ServiceError;
use crate::service::ContentService;

/// Identifies an outstanding content request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketId(u64);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ticket_{}", self.0)
    }
}

/// A batch of new branches waiting for content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentTicket {
    /// Ticket handle.
    pub id: TicketId,
    /// Expansion query sent to the collaborator.
    pub query: String,
    /// Branches to fill, in creation order.
    pub branches: Vec<BranchId>,
    /// Lowercased titles already in use when the ticket was issued.
    pub used: HashSet<String>,
}

/// Records gathered for a ticket.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Unique records, in arrival order.
    pub records: Vec<ContentRecord>,
    /// Requests it took.
    pub attempts: usize,
}

/// Result of [`ContentLedger::attach`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Attachment {
    /// The ticket was cancelled or already attached; nothing changed.
    Dropped,
    /// `assigned` branches received content.
    Assigned {
        /// Branches that received a record.
        assigned: usize,
    },
}

/// Session-wide bookkeeping of topics.
#[derive(Clone, Debug, Default)]
pub struct ContentLedger {
    root_query: Option<String>,
    initial: Vec<ContentRecord>,
    used: HashSet<String>,
    pending: HashMap<TicketId, Vec<BranchId>>,
    next_ticket: u64,
}

impl ContentLedger {
    /// Start over with a new root query and its initial topics.
    pub fn begin(&mut self, query: &str, topics: Vec<ContentRecord>) {
        self.root_query = Some(query.to_owned());
        self.initial = topics;
        self.used.clear();
        self.pending.clear();
    }

    /// Forget everything except the ticket counter.
    pub fn clear(&mut self) {
        self.root_query = None;
        self.initial.clear();
        self.used.clear();
        self.pending.clear();
    }

    /// The query the session was started with.
    pub fn root_query(&self) -> Option<&str> {
        self.root_query.as_deref()
    }

    /// Topics returned for the root query.
    pub fn initial_topics(&self) -> &[ContentRecord] {
        &self.initial
    }

    /// True if a branch already studies `title` (case-insensitive).
    pub fn is_used(&self, title: &str) -> bool {
        self.used.contains(&title.to_lowercase())
    }

    /// Outstanding tickets.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Give the first fan its topics by index. URLs are not carried over.
    pub fn assign_initial(&mut self, tree: &mut Tree, branches: &[BranchId]) -> usize {
        let mut assigned = 0;
        for (&id, topic) in branches.iter().zip(&self.initial) {
            let record = ContentRecord {
                url: None,
                ..topic.clone()
            };
            let title = record.title.to_lowercase();
            if tree.set_content(id, record) {
                if !title.is_empty() {
                    self.used.insert(title);
                }
                assigned += 1;
            }
        }
        debug!(assigned, "assigned initial topics");
        assigned
    }

    /// Ask for content for `branches`, sprouted from a node studying `topic`.
    ///
    /// Without a topic the root query is used; without a root query there is
    /// nothing to ask and no ticket is issued.
    pub fn request(&mut self, topic: Option<&str>, branches: Vec<BranchId>) -> Option<ContentTicket> {
        let root = self.root_query.as_deref()?;
        if branches.is_empty() {
            return None;
        }
        let topic = topic.unwrap_or(root);
        let id = TicketId(self.next_ticket);
        self.next_ticket += 1;
        self.pending.insert(id, branches.clone());
        Some(ContentTicket {
            id,
            query: format!("deep research on {topic} in the context of {root}"),
            branches,
            used: self.used.clone(),
        })
    }

    /// Cancel tickets whose branches have all been removed.
    pub fn cancel_removed(&mut self, tree: &Tree) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|_, branches| branches.iter().any(|&id| tree.is_alive(id)));
        let cancelled = before - self.pending.len();
        if cancelled > 0 {
            debug!(cancelled, "cancelled content tickets");
        }
        cancelled
    }

    /// Attach `records` to the ticket's branches by index.
    ///
    /// Dead branches are skipped, as are untitled records and records whose
    /// title came into use after the ticket was issued. A ticket attaches at
    /// most once.
    pub fn attach(&mut self, tree: &mut Tree, ticket: TicketId, records: Vec<ContentRecord>) -> Attachment {
        let Some(branches) = self.pending.remove(&ticket) else {
            debug!(%ticket, "dropping content for cancelled ticket");
            return Attachment::Dropped;
        };
        let mut titled = records.into_iter().filter(|r| !r.title.trim().is_empty());
        let mut assigned = 0;
        for id in branches {
            let Some(record) = titled.find(|r| !self.used.contains(&r.title.to_lowercase())) else {
                break;
            };
            let title = record.title.to_lowercase();
            if tree.set_content(id, record) {
                self.used.insert(title);
                assigned += 1;
            }
        }
        Attachment::Assigned { assigned }
    }

    /// Withdraw a ticket whose request failed.
    pub fn abandon(&mut self, ticket: TicketId) -> bool {
        self.pending.remove(&ticket).is_some()
    }
}

/// Collect enough unique records for `ticket`.
///
/// Each attempt asks for a few more than still needed and passes the titles
/// collected so far as exclusions. Untitled records and duplicates
/// (case-insensitive, against the batch and against `ticket.used`) are
/// dropped. Stops when every branch can
/// be filled or after `max_attempts` requests.
pub async fn expand<S: ContentService + ?Sized>(
    service: &S,
    ticket: &ContentTicket,
    max_attempts: usize,
) -> Result<Expansion, ServiceError> {
    let wanted = ticket.branches.len();
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Expansion::default();
    while out.records.len() < wanted && out.attempts < max_attempts {
        let exclude: Vec<String> = out.records.iter().map(|r| r.title.clone()).collect();
        let count = (wanted - out.records.len() + 2).max(5);
        let batch = service.expand_topic(&ticket.query, count, &exclude).await?;
        out.attempts += 1;
        for record in batch {
            if record.title.trim().is_empty() {
                continue;
            }
            let key = record.title.to_lowercase();
            if ticket.used.contains(&key) || !seen.insert(key) {
                continue;
            }
            out.records.push(record);
        }
        debug!(
            ticket = %ticket.id,
            attempt = out.attempts,
            unique = out.records.len(),
            "expansion attempt"
        );
    }
    if out.records.len() < wanted {
        warn!(ticket = %ticket.id, wanted, got = out.records.len(), "expansion came up short");
    }
    Ok(out)
}
