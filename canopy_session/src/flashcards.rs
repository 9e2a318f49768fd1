// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flashcards keyed to branches.

use core::fmt;

use canopy_tree::{BranchId, Tree};
use hashbrown::HashSet;
use kurbo::Point;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::service::CardDraft;

/// Deck used when nothing better is known.
pub const GENERAL_DECK: &str = "General";

/// Flashcard handle, displayed as `card_N`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card_{}", self.0)
    }
}

/// A filed flashcard.
#[derive(Clone, Debug, PartialEq)]
pub struct Flashcard {
    /// Handle.
    pub id: CardId,
    /// The generated card, proper-cased.
    pub card: CardDraft,
    /// Branch whose content the card came from.
    pub branch: BranchId,
    /// Where the branch ended when the card was requested.
    pub node_position: Point,
    /// Deck the card is grouped under.
    pub deck: String,
}

/// All flashcards of a session.
#[derive(Clone, Debug, Default)]
pub struct FlashcardStore {
    cards: Vec<Flashcard>,
    next_id: u64,
}

impl FlashcardStore {
    /// File freshly generated cards for `branch`.
    pub fn file(
        &mut self,
        tree: &Tree,
        branch: BranchId,
        at: Point,
        drafts: Vec<CardDraft>,
    ) -> Vec<CardId> {
        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let deck = deck_key(tree, branch, draft.category.as_deref());
            let card = CardDraft {
                front: proper_case(&draft.front),
                back: proper_case(&draft.back),
                ..draft
            };
            self.next_id += 1;
            let id = CardId(self.next_id);
            self.cards.push(Flashcard {
                id,
                card,
                branch,
                node_position: at,
                deck,
            });
            ids.push(id);
        }
        ids
    }

    /// Look up a card.
    pub fn get(&self, id: CardId) -> Option<&Flashcard> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// All cards, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Flashcard> + '_ {
        self.cards.iter()
    }

    /// Cards filed for `branch`.
    pub fn for_branch(&self, branch: BranchId) -> Vec<&Flashcard> {
        self.cards.iter().filter(|c| c.branch == branch).collect()
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True when no cards exist.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards grouped by deck, decks in order of first appearance.
    pub fn decks(&self) -> Vec<(&str, Vec<&Flashcard>)> {
        let mut out: Vec<(&str, Vec<&Flashcard>)> = Vec::new();
        for card in &self.cards {
            match out.iter_mut().find(|(k, _)| *k == card.deck) {
                Some((_, cards)) => cards.push(card),
                None => out.push((&card.deck, vec![card])),
            }
        }
        out
    }

    /// Drop every card keyed to a removed branch.
    pub fn remove_for_branches(&mut self, removed: &HashSet<BranchId>) -> usize {
        let before = self.cards.len();
        self.cards.retain(|c| !removed.contains(&c.branch));
        before - self.cards.len()
    }

    /// Remove all cards. Ids keep counting up.
    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

/// Up to `count` distinct cards from `pool`, in random order.
pub fn sample<'a, R: Rng + ?Sized>(
    pool: &[&'a Flashcard],
    count: usize,
    rng: &mut R,
) -> Vec<&'a Flashcard> {
    pool.choose_multiple(rng, count).copied().collect()
}

/// Deck for a card from `branch`.
///
/// The title of the nearest first-generation ancestor wins, then the branch's
/// own title, then the generator's category, then [`GENERAL_DECK`].
pub fn deck_key(tree: &Tree, branch: BranchId, category: Option<&str>) -> String {
    let own = tree.branch(branch).and_then(|b| b.content.as_ref());
    if let Some(own) = own {
        let mut cur = Some(branch);
        while let Some(b) = cur.and_then(|id| tree.branch(id)) {
            if b.generation <= 1 {
                if let Some(c) = &b.content
                    && !c.title.is_empty()
                {
                    return c.title.clone();
                }
                break;
            }
            cur = b.parent;
        }
        if !own.title.is_empty() {
            return own.title.clone();
        }
    }
    category
        .filter(|c| !c.is_empty())
        .unwrap_or(GENERAL_DECK)
        .to_owned()
}

/// Capitalise the first letter of every word and lowercase the rest.
pub fn proper_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}
