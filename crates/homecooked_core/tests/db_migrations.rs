use homecooked_core::db::migrations::latest_version;
use homecooked_core::db::{open_db, open_db_in_memory, DbError};
use homecooked_core::{BoardRepository, CardRepository, RepoError, SqliteCardRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "boards");
    assert_table_exists(&conn, "board_columns");
    assert_table_exists(&conn, "cards");
    assert_index_exists(&conn, "idx_cards_column_sort_key");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("homecooked.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "cards");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteCardRepository::try_new(&conn).err().unwrap();

    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn repository_rejects_connection_missing_cards_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE cards;").unwrap();

    let err = SqliteCardRepository::try_new(&conn).err().unwrap();

    assert!(matches!(err, RepoError::MissingRequiredTable("cards")));
}

#[test]
fn corrupt_card_rows_are_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCardRepository::try_new(&conn).unwrap();
    let board = repo.create_board("Kitchen").unwrap();
    let column = repo.create_column(board.id, "Todo").unwrap();
    conn.execute(
        "INSERT INTO cards (card_uuid, column_uuid, title, sort_key, created_at, updated_at)
         VALUES ('not-a-uuid', ?1, 'broken', 1.0, 0, 0);",
        [column.id.to_string()],
    )
    .unwrap();

    let err = repo.load_siblings(column.id).unwrap_err();

    assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("cards.card_uuid")));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
