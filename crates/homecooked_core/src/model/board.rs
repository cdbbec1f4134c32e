//! Board and column domain models.
//!
//! # Invariants
//! - Columns never own a stored list of cards; membership is derived from
//!   `Card::column_id`.
//! - `Column::position` orders columns inside one board.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable board identifier.
pub type BoardId = Uuid;

/// Stable column identifier.
pub type ColumnId = Uuid;

/// Kanban board read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Column (card container) read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    /// Board this column belongs to.
    pub board_id: BoardId,
    pub title: String,
    /// Zero-based position among the board's columns.
    pub position: i64,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}
