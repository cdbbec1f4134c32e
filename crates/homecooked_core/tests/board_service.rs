use homecooked_core::db::open_db_in_memory;
use homecooked_core::{
    BoardService, BoardServiceError, InMemoryCardRepository, OrderingService,
    SqliteCardRepository,
};
use uuid::Uuid;

#[test]
fn add_card_appends_with_spaced_keys() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCardRepository::try_new(&conn).unwrap();
    let service = BoardService::new(&repo);

    let board = service.create_board("  Weekly meals ").unwrap();
    let column = service.add_column(board.id, "Monday").unwrap();
    let first = service.add_card(column.id, "Soup").unwrap();
    let second = service.add_card(column.id, "Bread").unwrap();
    let third = service.add_card(column.id, "Salad").unwrap();

    assert_eq!(board.title, "Weekly meals");
    assert_eq!(first.sort_key, 1000.0);
    assert_eq!(second.sort_key, 2000.0);
    assert_eq!(third.sort_key, 3000.0);

    let view = service.column_view(column.id).unwrap();
    assert_eq!(view.ids(), vec![first.id, second.id, third.id]);
    assert_eq!(view.position_of(second.id), Some(1));
}

#[test]
fn columns_are_listed_in_creation_order() {
    let service = BoardService::new(InMemoryCardRepository::new());
    let board = service.create_board("Groceries").unwrap();
    let todo = service.add_column(board.id, "Todo").unwrap();
    let doing = service.add_column(board.id, "Doing").unwrap();
    let done = service.add_column(board.id, "Done").unwrap();

    let columns = service.list_columns(board.id).unwrap();

    let ids: Vec<Uuid> = columns.iter().map(|column| column.id).collect();
    assert_eq!(ids, vec![todo.id, doing.id, done.id]);
    assert_eq!(
        columns.iter().map(|column| column.position).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn blank_titles_are_rejected() {
    let service = BoardService::new(InMemoryCardRepository::new());
    assert!(matches!(
        service.create_board("   "),
        Err(BoardServiceError::InvalidTitle)
    ));

    let board = service.create_board("Board").unwrap();
    assert!(matches!(
        service.add_column(board.id, ""),
        Err(BoardServiceError::InvalidTitle)
    ));
}

#[test]
fn unknown_targets_map_to_not_found_errors() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCardRepository::try_new(&conn).unwrap();
    let service = BoardService::new(&repo);
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.add_column(missing, "Todo"),
        Err(BoardServiceError::BoardNotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.add_card(missing, "Soup"),
        Err(BoardServiceError::ColumnNotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.list_columns(missing),
        Err(BoardServiceError::BoardNotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.get_card(missing),
        Err(BoardServiceError::CardNotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.delete_column(missing),
        Err(BoardServiceError::ColumnNotFound(id)) if id == missing
    ));
}

#[test]
fn delete_column_cascades_to_its_cards_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCardRepository::try_new(&conn).unwrap();
    let boards = BoardService::new(&repo);
    let board = boards.create_board("Kitchen").unwrap();
    let doomed = boards.add_column(board.id, "Archive").unwrap();
    let kept = boards.add_column(board.id, "Todo").unwrap();
    let doomed_card = boards.add_card(doomed.id, "Old recipe").unwrap();
    let kept_card = boards.add_card(kept.id, "New recipe").unwrap();

    boards.delete_column(doomed.id).unwrap();

    assert!(matches!(
        boards.get_card(doomed_card.id),
        Err(BoardServiceError::CardNotFound(_))
    ));
    assert_eq!(boards.get_card(kept_card.id).unwrap(), kept_card);
    assert_eq!(
        boards.list_columns(board.id).unwrap().len(),
        1
    );
}

#[test]
fn board_and_ordering_services_share_one_repository() {
    let repo = InMemoryCardRepository::new();
    let boards = BoardService::new(&repo);
    let ordering = OrderingService::new(&repo);
    let board = boards.create_board("Kitchen").unwrap();
    let todo = boards.add_column(board.id, "Todo").unwrap();
    let done = boards.add_column(board.id, "Done").unwrap();
    let mut soup = boards.add_card(todo.id, "Soup").unwrap();
    let bread = boards.add_card(todo.id, "Bread").unwrap();
    let salad = boards.add_card(done.id, "Salad").unwrap();

    let mut todo_view = boards.column_view(todo.id).unwrap();
    let mut done_view = boards.column_view(done.id).unwrap();
    let outcome = ordering.move_to_column(&mut soup, done.id, 1).unwrap();
    todo_view.apply_cards(&outcome.saved);
    done_view.apply_cards(&outcome.saved);

    assert_eq!(todo_view.ids(), vec![bread.id]);
    assert_eq!(done_view.ids(), vec![salad.id, soup.id]);
    assert_eq!(todo_view, boards.column_view(todo.id).unwrap());
    assert_eq!(done_view, boards.column_view(done.id).unwrap());
}

#[test]
fn rename_survives_a_move_made_with_an_older_copy() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCardRepository::try_new(&conn).unwrap();
    let boards = BoardService::new(&repo);
    let ordering = OrderingService::new(&repo);
    let board = boards.create_board("Kitchen").unwrap();
    let todo = boards.add_column(board.id, "Todo").unwrap();
    let done = boards.add_column(board.id, "Done").unwrap();
    let mut stale = boards.add_card(todo.id, "Soup").unwrap();

    let renamed = boards.rename_card(stale.id, "  Tomato soup ").unwrap();
    ordering.move_to_column(&mut stale, done.id, 0).unwrap();

    let stored = boards.get_card(stale.id).unwrap();
    assert_eq!(renamed.title, "Tomato soup");
    assert_eq!(stored.title, "Tomato soup");
    assert_eq!(stored.column_id, Some(done.id));
    assert_eq!(stored.sort_key, 1000.0);
}

#[test]
fn rename_rejects_blank_titles_and_unknown_cards() {
    let service = BoardService::new(InMemoryCardRepository::new());
    let board = service.create_board("Board").unwrap();
    let column = service.add_column(board.id, "Todo").unwrap();
    let card = service.add_card(column.id, "Soup").unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.rename_card(card.id, " "),
        Err(BoardServiceError::InvalidTitle)
    ));
    assert!(matches!(
        service.rename_card(missing, "Bread"),
        Err(BoardServiceError::CardNotFound(id)) if id == missing
    ));
    assert_eq!(service.get_card(card.id).unwrap().title, "Soup");
}
