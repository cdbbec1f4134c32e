//! Board bookkeeping use-case service.
//!
//! # Responsibility
//! - Create boards, columns and cards the ordering engine works on.
//! - Materialize ordered column views for callers.
//!
//! # Invariants
//! - Titles are trimmed and never blank.
//! - New cards are appended after the current last card of their column.

use crate::model::board::{Board, BoardId, Column, ColumnId};
use crate::model::card::{Card, CardId};
use crate::model::column_view::ColumnView;
use crate::ordering::sort_key::SortKeyCalculator;
use crate::repo::{BoardRepository, CardRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from board service operations.
#[derive(Debug)]
pub enum BoardServiceError {
    /// Title is blank after trim.
    InvalidTitle,
    /// Target board does not exist.
    BoardNotFound(BoardId),
    /// Target column does not exist.
    ColumnNotFound(ColumnId),
    /// Target card does not exist.
    CardNotFound(CardId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for BoardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "title must not be blank"),
            Self::BoardNotFound(id) => write!(f, "board not found: {id}"),
            Self::ColumnNotFound(id) => write!(f, "column not found: {id}"),
            Self::CardNotFound(id) => write!(f, "card not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BoardServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::BoardNotFound(id) => Self::BoardNotFound(id),
            RepoError::ColumnNotFound(id) => Self::ColumnNotFound(id),
            RepoError::NotFound(id) => Self::CardNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Board service facade.
pub struct BoardService<R: BoardRepository + CardRepository> {
    repo: R,
    calculator: SortKeyCalculator,
}

impl<R: BoardRepository + CardRepository> BoardService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            calculator: SortKeyCalculator::default(),
        }
    }

    /// Creates one board.
    pub fn create_board(&self, title: impl Into<String>) -> Result<Board, BoardServiceError> {
        let title = normalize_title(title.into())?;
        let board = self.repo.create_board(title.as_str())?;
        info!(
            "event=board_create module=board status=ok board_uuid={}",
            board.id
        );
        Ok(board)
    }

    /// Appends one column to a board.
    pub fn add_column(
        &self,
        board_id: BoardId,
        title: impl Into<String>,
    ) -> Result<Column, BoardServiceError> {
        let title = normalize_title(title.into())?;
        let column = self.repo.create_column(board_id, title.as_str())?;
        info!(
            "event=column_create module=board status=ok board_uuid={board_id} column_uuid={} position={}",
            column.id, column.position
        );
        Ok(column)
    }

    /// Lists a board's columns in display order.
    pub fn list_columns(&self, board_id: BoardId) -> Result<Vec<Column>, BoardServiceError> {
        if self.repo.get_board(board_id)?.is_none() {
            return Err(BoardServiceError::BoardNotFound(board_id));
        }
        self.repo.list_columns(board_id).map_err(Into::into)
    }

    /// Creates a card at the end of `column_id`.
    pub fn add_card(
        &self,
        column_id: ColumnId,
        title: impl Into<String>,
    ) -> Result<Card, BoardServiceError> {
        let title = normalize_title(title.into())?;
        let view = self.column_view(column_id)?;
        let keys: Vec<f64> = view.cards().iter().map(|card| card.sort_key).collect();
        let sort_key = self.calculator.calculate(keys.len(), &keys);

        let card = Card::new(Some(column_id), title, sort_key);
        self.repo.insert_card(&card)?;
        Ok(card)
    }

    /// Loads one card.
    pub fn get_card(&self, card_id: CardId) -> Result<Card, BoardServiceError> {
        self.repo
            .get_card(card_id)?
            .ok_or(BoardServiceError::CardNotFound(card_id))
    }

    /// Retitles one card. Placement is untouched.
    pub fn rename_card(
        &self,
        card_id: CardId,
        title: impl Into<String>,
    ) -> Result<Card, BoardServiceError> {
        let title = normalize_title(title.into())?;
        let card = self.repo.rename_card(card_id, title.as_str())?;
        info!("event=card_rename module=board status=ok card_uuid={card_id}");
        Ok(card)
    }

    /// Materializes the ordered view of one column.
    pub fn column_view(&self, column_id: ColumnId) -> Result<ColumnView, BoardServiceError> {
        if !self.repo.column_exists(column_id)? {
            return Err(BoardServiceError::ColumnNotFound(column_id));
        }
        let cards = self.repo.load_siblings(column_id)?;
        Ok(ColumnView::from_cards(column_id, cards))
    }

    /// Deletes a column together with its cards.
    pub fn delete_column(&self, column_id: ColumnId) -> Result<(), BoardServiceError> {
        self.repo.delete_column(column_id)?;
        info!("event=column_delete module=board status=ok column_uuid={column_id}");
        Ok(())
    }
}

fn normalize_title(value: String) -> Result<String, BoardServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardServiceError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}
