//! Ordered, caller-held view over one column's cards.
//!
//! # Responsibility
//! - Materialize column membership by filtering on `Card::column_id`.
//! - Keep cached views consistent after moves without re-reading storage.
//!
//! # Invariants
//! - `cards` only contains cards whose `column_id` equals `column_id`.
//! - `cards` is always sorted by `sort_key ASC, id ASC`.

use super::board::ColumnId;
use super::card::{sort_cards, Card, CardId};

/// Ordered snapshot of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    column_id: ColumnId,
    cards: Vec<Card>,
}

impl ColumnView {
    /// Builds a view from any card set, keeping only members of `column_id`.
    pub fn from_cards(column_id: ColumnId, cards: impl IntoIterator<Item = Card>) -> Self {
        let mut members: Vec<Card> = cards
            .into_iter()
            .filter(|card| card.column_id == Some(column_id))
            .collect();
        sort_cards(&mut members);
        Self {
            column_id,
            cards: members,
        }
    }

    pub fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Cards in display order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Card ids in display order.
    pub fn ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|card| card.id).collect()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Zero-based display index of a card, if it is a member.
    pub fn position_of(&self, card_id: CardId) -> Option<usize> {
        self.cards.iter().position(|card| card.id == card_id)
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.position_of(card_id).is_some()
    }

    /// Folds one updated card into the view.
    ///
    /// A card that now belongs to this column is inserted or replaced; a card
    /// that left it is removed. Other cards are ignored.
    pub fn apply_card(&mut self, card: &Card) {
        let existing = self.position_of(card.id);
        if card.column_id == Some(self.column_id) {
            match existing {
                Some(index) => self.cards[index] = card.clone(),
                None => self.cards.push(card.clone()),
            }
            sort_cards(&mut self.cards);
        } else if let Some(index) = existing {
            self.cards.remove(index);
        }
    }

    /// Folds a batch of updated cards into the view.
    pub fn apply_cards<'a>(&mut self, cards: impl IntoIterator<Item = &'a Card>) {
        for card in cards {
            self.apply_card(card);
        }
    }
}
