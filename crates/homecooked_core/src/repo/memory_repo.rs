//! In-memory board/column/card store.
//!
//! Object-graph counterpart of the SQLite backend: same contracts, no I/O.
//! Used by callers that keep state in process and by tests that need to
//! inject persistence failures.
//!
//! # Invariants
//! - `save_cards` validates and checks the whole batch before applying any
//!   change, then patches placement fields only.
//! - Sibling listing uses the same `sort_key ASC, id ASC` order as SQLite.

use super::{BoardRepository, CardRepository, RepoError, RepoResult};
use crate::model::board::{Board, BoardId, Column, ColumnId};
use crate::model::card::{now_epoch_ms, sort_cards, Card, CardId};
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    boards: HashMap<BoardId, Board>,
    columns: HashMap<ColumnId, Column>,
    cards: HashMap<CardId, Card>,
    pending_save_failure: Option<String>,
    save_calls: usize,
}

/// Thread-safe in-memory repository.
#[derive(Debug, Default)]
pub struct InMemoryCardRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryCardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `save_cards` call fail with `RepoError::Unavailable`.
    pub fn fail_next_save(&self, message: impl Into<String>) -> RepoResult<()> {
        self.lock()?.pending_save_failure = Some(message.into());
        Ok(())
    }

    /// Number of `save_cards` calls that reached the store.
    pub fn save_calls(&self) -> RepoResult<usize> {
        Ok(self.lock()?.save_calls)
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| RepoError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

impl CardRepository for InMemoryCardRepository {
    fn load_siblings(&self, column_id: ColumnId) -> RepoResult<Vec<Card>> {
        let state = self.lock()?;
        let mut cards: Vec<Card> = state
            .cards
            .values()
            .filter(|card| card.column_id == Some(column_id))
            .cloned()
            .collect();
        sort_cards(&mut cards);
        Ok(cards)
    }

    fn save_cards(&self, cards: &[Card]) -> RepoResult<()> {
        let mut state = self.lock()?;
        state.save_calls += 1;
        if let Some(message) = state.pending_save_failure.take() {
            return Err(RepoError::Unavailable(message));
        }

        for card in cards {
            card.validate()?;
            if !state.cards.contains_key(&card.id) {
                return Err(RepoError::NotFound(card.id));
            }
            if let Some(column_id) = card.column_id {
                if !state.columns.contains_key(&column_id) {
                    return Err(RepoError::ColumnNotFound(column_id));
                }
            }
        }
        for card in cards {
            if let Some(stored) = state.cards.get_mut(&card.id) {
                stored.column_id = card.column_id;
                stored.sort_key = card.sort_key;
                stored.updated_at = card.updated_at;
            }
        }

        debug!(
            "event=cards_save module=repo status=ok backend=memory count={}",
            cards.len()
        );
        Ok(())
    }

    fn column_exists(&self, column_id: ColumnId) -> RepoResult<bool> {
        Ok(self.lock()?.columns.contains_key(&column_id))
    }

    fn get_card(&self, card_id: CardId) -> RepoResult<Option<Card>> {
        Ok(self.lock()?.cards.get(&card_id).cloned())
    }
}

impl BoardRepository for InMemoryCardRepository {
    fn create_board(&self, title: &str) -> RepoResult<Board> {
        let now = now_epoch_ms();
        let board = Board {
            id: Uuid::new_v4(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.lock()?.boards.insert(board.id, board.clone());
        Ok(board)
    }

    fn get_board(&self, board_id: BoardId) -> RepoResult<Option<Board>> {
        Ok(self.lock()?.boards.get(&board_id).cloned())
    }

    fn create_column(&self, board_id: BoardId, title: &str) -> RepoResult<Column> {
        let mut state = self.lock()?;
        if !state.boards.contains_key(&board_id) {
            return Err(RepoError::BoardNotFound(board_id));
        }
        let position = state
            .columns
            .values()
            .filter(|column| column.board_id == board_id)
            .map(|column| column.position)
            .max()
            .map_or(0, |last| last + 1);
        let now = now_epoch_ms();
        let column = Column {
            id: Uuid::new_v4(),
            board_id,
            title: title.to_string(),
            position,
            created_at: now,
            updated_at: now,
        };
        state.columns.insert(column.id, column.clone());
        Ok(column)
    }

    fn list_columns(&self, board_id: BoardId) -> RepoResult<Vec<Column>> {
        let state = self.lock()?;
        let mut columns: Vec<Column> = state
            .columns
            .values()
            .filter(|column| column.board_id == board_id)
            .cloned()
            .collect();
        columns.sort_by(|left, right| {
            left.position
                .cmp(&right.position)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(columns)
    }

    fn insert_card(&self, card: &Card) -> RepoResult<()> {
        card.validate()?;
        let mut state = self.lock()?;
        if let Some(column_id) = card.column_id {
            if !state.columns.contains_key(&column_id) {
                return Err(RepoError::ColumnNotFound(column_id));
            }
        }
        if state.cards.contains_key(&card.id) {
            return Err(RepoError::InvalidData(format!(
                "card {} already exists",
                card.id
            )));
        }
        state.cards.insert(card.id, card.clone());
        Ok(())
    }

    fn rename_card(&self, card_id: CardId, title: &str) -> RepoResult<Card> {
        let mut state = self.lock()?;
        let card = state
            .cards
            .get_mut(&card_id)
            .ok_or(RepoError::NotFound(card_id))?;
        card.title = title.to_string();
        card.touch(now_epoch_ms());
        Ok(card.clone())
    }

    fn delete_column(&self, column_id: ColumnId) -> RepoResult<()> {
        let mut state = self.lock()?;
        if state.columns.remove(&column_id).is_none() {
            return Err(RepoError::ColumnNotFound(column_id));
        }
        state
            .cards
            .retain(|_, card| card.column_id != Some(column_id));
        Ok(())
    }
}
