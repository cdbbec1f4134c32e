//! Card domain model.
//!
//! # Responsibility
//! - Define the ordered item that the ordering engine places inside columns.
//! - Provide validation and timestamp helpers shared by repositories.
//!
//! # Invariants
//! - `id` is stable and never reused for another card.
//! - `sort_key` is always finite (never NaN or infinite).
//! - `column_id` is the single source of truth for column membership.
//! - `updated_at` is refreshed whenever `sort_key` or `column_id` changes.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use super::board::ColumnId;

/// Stable identifier for one card.
pub type CardId = Uuid;

/// Validation failures for card write paths.
#[derive(Debug, Clone, PartialEq)]
pub enum CardValidationError {
    /// `sort_key` is NaN or infinite.
    NonFiniteSortKey { card_id: CardId, sort_key: f64 },
    /// `updated_at` is earlier than `created_at`.
    UpdatedBeforeCreated { card_id: CardId },
}

impl Display for CardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteSortKey { card_id, sort_key } => {
                write!(f, "card {card_id} has non-finite sort key {sort_key}")
            }
            Self::UpdatedBeforeCreated { card_id } => {
                write!(f, "card {card_id} has updated_at earlier than created_at")
            }
        }
    }
}

impl Error for CardValidationError {}

/// One card inside a Kanban column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Stable card id.
    pub id: CardId,
    /// Owning column. `None` means the card is unparented.
    pub column_id: Option<ColumnId>,
    /// User-facing title. Never written to log events.
    pub title: String,
    /// Fractional ordering key within the owning column.
    pub sort_key: f64,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms timestamp of the last key/column/title change.
    pub updated_at: i64,
}

impl Card {
    /// Creates a card with a generated id in the given column.
    ///
    /// The caller picks the initial `sort_key`; the ordering engine only
    /// mutates it afterwards.
    pub fn new(column_id: Option<ColumnId>, title: impl Into<String>, sort_key: f64) -> Self {
        Self::with_id(Uuid::new_v4(), column_id, title, sort_key)
    }

    /// Creates a card with a caller-provided id.
    pub fn with_id(
        id: CardId,
        column_id: Option<ColumnId>,
        title: impl Into<String>,
        sort_key: f64,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            column_id,
            title: title.into(),
            sort_key,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), CardValidationError> {
        if !self.sort_key.is_finite() {
            return Err(CardValidationError::NonFiniteSortKey {
                card_id: self.id,
                sort_key: self.sort_key,
            });
        }
        if self.updated_at < self.created_at {
            return Err(CardValidationError::UpdatedBeforeCreated { card_id: self.id });
        }
        Ok(())
    }

    /// Sets a new key and refreshes `updated_at`.
    pub fn assign_sort_key(&mut self, sort_key: f64, now: i64) {
        self.sort_key = sort_key;
        self.touch(now);
    }

    /// Refreshes `updated_at` without going backwards in time.
    pub fn touch(&mut self, now: i64) {
        self.updated_at = now.max(self.created_at);
    }
}

/// Deterministic card order: ascending `sort_key`, ties broken by id.
pub fn compare_cards(left: &Card, right: &Card) -> Ordering {
    left.sort_key
        .total_cmp(&right.sort_key)
        .then_with(|| left.id.cmp(&right.id))
}

/// Sorts cards in place using [`compare_cards`].
pub fn sort_cards(cards: &mut [Card]) {
    cards.sort_by(compare_cards);
}

/// Current wall clock as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{compare_cards, sort_cards, Card, CardValidationError};
    use std::cmp::Ordering;
    use uuid::Uuid;

    #[test]
    fn validate_rejects_non_finite_keys() {
        for key in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let card = Card::new(None, "x", key);
            assert!(matches!(
                card.validate(),
                Err(CardValidationError::NonFiniteSortKey { .. })
            ));
        }
        assert!(Card::new(None, "x", -1.0e300).validate().is_ok());
    }

    #[test]
    fn touch_never_moves_before_created_at() {
        let mut card = Card::new(None, "x", 1.0);
        card.touch(card.created_at - 10);
        assert_eq!(card.updated_at, card.created_at);
        assert!(card.validate().is_ok());
    }

    #[test]
    fn equal_keys_tie_break_by_id() {
        let low = Card::with_id(Uuid::from_u128(1), None, "a", 5.0);
        let high = Card::with_id(Uuid::from_u128(2), None, "b", 5.0);
        assert_eq!(compare_cards(&low, &high), Ordering::Less);

        let mut cards = vec![high.clone(), low.clone()];
        sort_cards(&mut cards);
        assert_eq!(cards[0].id, low.id);
        assert_eq!(cards[1].id, high.id);
    }
}
