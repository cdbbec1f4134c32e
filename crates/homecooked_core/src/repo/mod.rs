//! Repository contracts and persistence backends.
//!
//! # Responsibility
//! - Define the persistence collaborator the ordering engine commits through.
//! - Provide two interchangeable backends: SQLite and an in-memory store.
//!
//! # Invariants
//! - Write paths call `Card::validate()` before mutating storage.
//! - `load_siblings` returns cards ordered by `sort_key ASC, card id ASC`.
//! - `save_cards` is all-or-nothing for the whole batch.
//! - Persistence errors are reported as-is; repositories never retry.

pub mod memory_repo;
pub mod sqlite_repo;

use crate::db::DbError;
use crate::model::board::{Board, BoardId, Column, ColumnId};
use crate::model::card::{Card, CardId, CardValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by both backends.
#[derive(Debug)]
pub enum RepoError {
    /// Card failed write-path validation.
    Validation(CardValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target card does not exist.
    NotFound(CardId),
    /// Target column does not exist.
    ColumnNotFound(ColumnId),
    /// Target board does not exist.
    BoardNotFound(BoardId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Backend cannot serve requests right now.
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "card not found: {id}"),
            Self::ColumnNotFound(id) => write!(f, "column not found: {id}"),
            Self::BoardNotFound(id) => write!(f, "board not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "card repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "card repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "card repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Unavailable(message) => write!(f, "repository unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CardValidationError> for RepoError {
    fn from(value: CardValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence collaborator consumed by the ordering engine.
pub trait CardRepository {
    /// Loads every card currently in `column_id`, ascending by key then id.
    fn load_siblings(&self, column_id: ColumnId) -> RepoResult<Vec<Card>>;
    /// Persists the placement of existing cards (`column_id`, `sort_key`,
    /// `updated_at`) as one logical commit. Other fields, such as the title,
    /// are left as stored.
    fn save_cards(&self, cards: &[Card]) -> RepoResult<()>;
    /// Returns whether a column with this id exists.
    fn column_exists(&self, column_id: ColumnId) -> RepoResult<bool>;
    /// Loads one card by id.
    fn get_card(&self, card_id: CardId) -> RepoResult<Option<Card>>;
}

/// Board and column bookkeeping around the ordering engine.
pub trait BoardRepository {
    fn create_board(&self, title: &str) -> RepoResult<Board>;
    fn get_board(&self, board_id: BoardId) -> RepoResult<Option<Board>>;
    /// Appends a column at the end of the board.
    fn create_column(&self, board_id: BoardId, title: &str) -> RepoResult<Column>;
    /// Lists columns ordered by `position ASC`.
    fn list_columns(&self, board_id: BoardId) -> RepoResult<Vec<Column>>;
    /// Inserts a new card with its caller-assigned key.
    fn insert_card(&self, card: &Card) -> RepoResult<()>;
    /// Replaces the title of an existing card and returns the stored card.
    fn rename_card(&self, card_id: CardId, title: &str) -> RepoResult<Card>;
    /// Deletes a column and every card in it.
    fn delete_column(&self, column_id: ColumnId) -> RepoResult<()>;
}

impl<R: CardRepository + ?Sized> CardRepository for &R {
    fn load_siblings(&self, column_id: ColumnId) -> RepoResult<Vec<Card>> {
        (**self).load_siblings(column_id)
    }

    fn save_cards(&self, cards: &[Card]) -> RepoResult<()> {
        (**self).save_cards(cards)
    }

    fn column_exists(&self, column_id: ColumnId) -> RepoResult<bool> {
        (**self).column_exists(column_id)
    }

    fn get_card(&self, card_id: CardId) -> RepoResult<Option<Card>> {
        (**self).get_card(card_id)
    }
}

impl<R: BoardRepository + ?Sized> BoardRepository for &R {
    fn create_board(&self, title: &str) -> RepoResult<Board> {
        (**self).create_board(title)
    }

    fn get_board(&self, board_id: BoardId) -> RepoResult<Option<Board>> {
        (**self).get_board(board_id)
    }

    fn create_column(&self, board_id: BoardId, title: &str) -> RepoResult<Column> {
        (**self).create_column(board_id, title)
    }

    fn list_columns(&self, board_id: BoardId) -> RepoResult<Vec<Column>> {
        (**self).list_columns(board_id)
    }

    fn insert_card(&self, card: &Card) -> RepoResult<()> {
        (**self).insert_card(card)
    }

    fn rename_card(&self, card_id: CardId, title: &str) -> RepoResult<Card> {
        (**self).rename_card(card_id, title)
    }

    fn delete_column(&self, column_id: ColumnId) -> RepoResult<()> {
        (**self).delete_column(column_id)
    }
}
