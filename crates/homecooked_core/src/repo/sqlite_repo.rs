//! SQLite-backed board/column/card repository.
//!
//! # Responsibility
//! - Persist cards, columns and boards in the migrated schema.
//! - Keep SQL details and ordering behavior inside the repository boundary.
//!
//! # Invariants
//! - Sibling listing is deterministic: `sort_key ASC, card_uuid ASC`.
//! - Multi-row writes run inside one `IMMEDIATE` transaction.

use super::{BoardRepository, CardRepository, RepoError, RepoResult};
use crate::db::migrations::latest_version;
use crate::model::board::{Board, BoardId, Column, ColumnId};
use crate::model::card::{now_epoch_ms, Card, CardId};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const CARD_SELECT_SQL: &str = "SELECT
    card_uuid,
    column_uuid,
    title,
    sort_key,
    created_at,
    updated_at
FROM cards";

const COLUMN_SELECT_SQL: &str = "SELECT
    column_uuid,
    board_uuid,
    title,
    position,
    created_at,
    updated_at
FROM board_columns";

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("boards", &["board_uuid", "title", "created_at", "updated_at"]),
    (
        "board_columns",
        &[
            "column_uuid",
            "board_uuid",
            "title",
            "position",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "cards",
        &[
            "card_uuid",
            "column_uuid",
            "title",
            "sort_key",
            "created_at",
            "updated_at",
        ],
    ),
];

/// SQLite repository over a migrated connection.
pub struct SqliteCardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCardRepository<'conn> {
    /// Creates repository from a connection returned by `open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CardRepository for SqliteCardRepository<'_> {
    fn load_siblings(&self, column_id: ColumnId) -> RepoResult<Vec<Card>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CARD_SELECT_SQL}
             WHERE column_uuid = ?1
             ORDER BY sort_key ASC, card_uuid ASC;"
        ))?;
        let mut rows = stmt.query([column_id.to_string()])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(parse_card_row(row)?);
        }
        Ok(cards)
    }

    fn save_cards(&self, cards: &[Card]) -> RepoResult<()> {
        if cards.is_empty() {
            return Ok(());
        }
        for card in cards {
            card.validate()?;
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for card in cards {
            if let Some(column_id) = card.column_id {
                if !column_exists_in(&tx, column_id)? {
                    return Err(RepoError::ColumnNotFound(column_id));
                }
            }

            let changed = tx.execute(
                "UPDATE cards
                 SET column_uuid = ?2,
                     sort_key = ?3,
                     updated_at = ?4
                 WHERE card_uuid = ?1;",
                params![
                    card.id.to_string(),
                    card.column_id.map(|value| value.to_string()),
                    card.sort_key,
                    card.updated_at,
                ],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(card.id));
            }
        }
        tx.commit()?;

        debug!(
            "event=cards_save module=repo status=ok backend=sqlite count={}",
            cards.len()
        );
        Ok(())
    }

    fn column_exists(&self, column_id: ColumnId) -> RepoResult<bool> {
        column_exists_in(self.conn, column_id)
    }

    fn get_card(&self, card_id: CardId) -> RepoResult<Option<Card>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CARD_SELECT_SQL} WHERE card_uuid = ?1;"))?;
        let mut rows = stmt.query([card_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_card_row(row)?));
        }
        Ok(None)
    }
}

impl BoardRepository for SqliteCardRepository<'_> {
    fn create_board(&self, title: &str) -> RepoResult<Board> {
        let now = now_epoch_ms();
        let board = Board {
            id: Uuid::new_v4(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.conn.execute(
            "INSERT INTO boards (board_uuid, title, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![board.id.to_string(), board.title.as_str(), now, now],
        )?;
        Ok(board)
    }

    fn get_board(&self, board_id: BoardId) -> RepoResult<Option<Board>> {
        let row = self
            .conn
            .query_row(
                "SELECT board_uuid, title, created_at, updated_at
                 FROM boards
                 WHERE board_uuid = ?1;",
                [board_id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, title, created_at, updated_at)| -> RepoResult<Board> {
            Ok(Board {
                id: parse_uuid(&id, "boards.board_uuid")?,
                title,
                created_at,
                updated_at,
            })
        })
        .transpose()
    }

    fn create_column(&self, board_id: BoardId, title: &str) -> RepoResult<Column> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let board_exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM boards WHERE board_uuid = ?1);",
            [board_id.to_string()],
            |row| row.get(0),
        )?;
        if board_exists != 1 {
            return Err(RepoError::BoardNotFound(board_id));
        }

        let position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1
             FROM board_columns
             WHERE board_uuid = ?1;",
            [board_id.to_string()],
            |row| row.get(0),
        )?;
        let now = now_epoch_ms();
        let column = Column {
            id: Uuid::new_v4(),
            board_id,
            title: title.to_string(),
            position,
            created_at: now,
            updated_at: now,
        };
        tx.execute(
            "INSERT INTO board_columns (
                column_uuid,
                board_uuid,
                title,
                position,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                column.id.to_string(),
                board_id.to_string(),
                column.title.as_str(),
                position,
                now,
                now,
            ],
        )?;
        tx.commit()?;
        Ok(column)
    }

    fn list_columns(&self, board_id: BoardId) -> RepoResult<Vec<Column>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COLUMN_SELECT_SQL}
             WHERE board_uuid = ?1
             ORDER BY position ASC, column_uuid ASC;"
        ))?;
        let mut rows = stmt.query([board_id.to_string()])?;
        let mut columns = Vec::new();
        while let Some(row) = rows.next()? {
            columns.push(parse_column_row(row)?);
        }
        Ok(columns)
    }

    fn insert_card(&self, card: &Card) -> RepoResult<()> {
        card.validate()?;
        if let Some(column_id) = card.column_id {
            if !column_exists_in(self.conn, column_id)? {
                return Err(RepoError::ColumnNotFound(column_id));
            }
        }
        self.conn.execute(
            "INSERT INTO cards (
                card_uuid,
                column_uuid,
                title,
                sort_key,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                card.id.to_string(),
                card.column_id.map(|value| value.to_string()),
                card.title.as_str(),
                card.sort_key,
                card.created_at,
                card.updated_at,
            ],
        )?;
        Ok(())
    }

    fn rename_card(&self, card_id: CardId, title: &str) -> RepoResult<Card> {
        let changed = self.conn.execute(
            "UPDATE cards
             SET title = ?2,
                 updated_at = MAX(created_at, ?3)
             WHERE card_uuid = ?1;",
            params![card_id.to_string(), title, now_epoch_ms()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(card_id));
        }
        self.get_card(card_id)?.ok_or(RepoError::NotFound(card_id))
    }

    fn delete_column(&self, column_id: ColumnId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed_cards = tx.execute(
            "DELETE FROM cards WHERE column_uuid = ?1;",
            [column_id.to_string()],
        )?;
        let changed = tx.execute(
            "DELETE FROM board_columns WHERE column_uuid = ?1;",
            [column_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::ColumnNotFound(column_id));
        }
        tx.commit()?;

        debug!(
            "event=column_delete module=repo status=ok backend=sqlite removed_cards={removed_cards}"
        );
        Ok(())
    }
}

fn column_exists_in(conn: &Connection, column_id: ColumnId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM board_columns WHERE column_uuid = ?1);",
        [column_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_card_row(row: &Row<'_>) -> RepoResult<Card> {
    let id_text: String = row.get("card_uuid")?;
    let column_id = row
        .get::<_, Option<String>>("column_uuid")?
        .map(|value| parse_uuid(&value, "cards.column_uuid"))
        .transpose()?;

    let card = Card {
        id: parse_uuid(&id_text, "cards.card_uuid")?,
        column_id,
        title: row.get("title")?,
        sort_key: row.get("sort_key")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    card.validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(card)
}

fn parse_column_row(row: &Row<'_>) -> RepoResult<Column> {
    let id_text: String = row.get("column_uuid")?;
    let board_text: String = row.get("board_uuid")?;
    Ok(Column {
        id: parse_uuid(&id_text, "board_columns.column_uuid")?,
        board_id: parse_uuid(&board_text, "board_columns.board_uuid")?,
        title: row.get("title")?,
        position: row.get("position")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, required) in REQUIRED_COLUMNS {
        let present = table_columns(conn, table)?;
        if present.is_empty() {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in required {
            if !present.iter().any(|name| name == column) {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get(1)?);
    }
    Ok(columns)
}
