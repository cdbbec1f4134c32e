use homecooked_core::{
    BoardRepository, BoardService, Card, CardRepository, ColumnId, InMemoryCardRepository,
    NormalizationPolicy, OrderingConfig, OrderingError, OrderingService, RepoError,
};
use std::thread;

fn column(repo: &InMemoryCardRepository) -> ColumnId {
    let board = repo.create_board("Pantry").unwrap();
    repo.create_column(board.id, "Shelf").unwrap().id
}

fn insert(repo: &InMemoryCardRepository, column_id: Option<ColumnId>, key: f64) -> Card {
    let card = Card::new(column_id, "item", key);
    repo.insert_card(&card).unwrap();
    card
}

fn keys(repo: &InMemoryCardRepository, column_id: ColumnId) -> Vec<f64> {
    repo.load_siblings(column_id)
        .unwrap()
        .iter()
        .map(|card| card.sort_key)
        .collect()
}

#[test]
fn memory_backend_matches_midpoint_scenarios() {
    let service = OrderingService::new(InMemoryCardRepository::new());
    let column_id = column(service.repo());
    for key in [1000.0, 2000.0, 3000.0] {
        insert(service.repo(), Some(column_id), key);
    }

    let mut front = insert(service.repo(), None, 0.0);
    service.move_to_column(&mut front, column_id, 0).unwrap();
    let mut middle = insert(service.repo(), None, 0.0);
    service.move_to_column(&mut middle, column_id, 2).unwrap();

    assert_eq!(front.sort_key, 0.0);
    assert_eq!(middle.sort_key, 1500.0);
    assert_eq!(
        keys(service.repo(), column_id),
        vec![0.0, 1000.0, 1500.0, 2000.0, 3000.0]
    );
}

#[test]
fn save_failure_is_returned_unchanged() {
    let repo = InMemoryCardRepository::new();
    let column_id = column(&repo);
    let mut card = insert(&repo, Some(column_id), 1000.0);
    insert(&repo, Some(column_id), 2000.0);
    let service = OrderingService::new(&repo);

    repo.fail_next_save("store offline").unwrap();
    let err = service.move_within_column(&mut card, 2).unwrap_err();

    assert!(matches!(
        err,
        OrderingError::Repo(RepoError::Unavailable(ref message)) if message == "store offline"
    ));
    assert_eq!(err.to_string(), "repository unavailable: store offline");
    assert_eq!(card.sort_key, 3000.0);
    assert_eq!(repo.get_card(card.id).unwrap().unwrap().sort_key, 1000.0);
    assert_eq!(repo.save_calls().unwrap(), 1);
}

#[test]
fn custom_config_changes_spacing() {
    let config = OrderingConfig {
        default_key: 10.0,
        key_spacing: 10.0,
        ..OrderingConfig::default()
    };
    let service = OrderingService::with_config(InMemoryCardRepository::new(), config).unwrap();
    let column_id = column(service.repo());

    let mut first = insert(service.repo(), None, 0.0);
    service.move_to_column(&mut first, column_id, 0).unwrap();
    let mut second = insert(service.repo(), None, 0.0);
    service.move_to_column(&mut second, column_id, 1).unwrap();

    assert_eq!(keys(service.repo(), column_id), vec![10.0, 20.0]);
}

#[test]
fn invalid_config_is_rejected() {
    let config = OrderingConfig {
        normalization_threshold: f64::NAN,
        ..OrderingConfig::default()
    };
    assert!(OrderingService::with_config(InMemoryCardRepository::new(), config).is_err());
}

#[test]
fn config_deserializes_with_defaults() {
    let config: OrderingConfig = serde_json::from_str(r#"{ "key_spacing": 500.0 }"#).unwrap();
    assert_eq!(config.key_spacing, 500.0);
    assert_eq!(config.default_key, 1000.0);
    assert_eq!(config.normalization_threshold, 0.001);
    assert!(config.validate().is_ok());
}

#[test]
fn concurrent_moves_into_one_column_stay_distinct() {
    const THREADS: usize = 4;
    const MOVES_PER_THREAD: usize = 30;

    let service = OrderingService::new(InMemoryCardRepository::new());
    let column_id = column(service.repo());
    insert(service.repo(), Some(column_id), 1000.0);
    insert(service.repo(), Some(column_id), 2000.0);

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..MOVES_PER_THREAD {
                    let mut card = insert(service.repo(), None, 0.0);
                    service.move_to_column(&mut card, column_id, 1).unwrap();
                }
            });
        }
    });

    let final_keys = keys(service.repo(), column_id);
    assert_eq!(final_keys.len(), 2 + THREADS * MOVES_PER_THREAD);
    assert!(final_keys.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(!NormalizationPolicy::default().should_normalize(&final_keys));
}

#[test]
fn concurrent_cross_column_moves_do_not_deadlock() {
    let service = OrderingService::new(InMemoryCardRepository::new());
    let left = column(service.repo());
    let right = column(service.repo());
    let left_cards: Vec<Card> = (0..20)
        .map(|index| insert(service.repo(), Some(left), 1000.0 * (index as f64 + 1.0)))
        .collect();
    let right_cards: Vec<Card> = (0..20)
        .map(|index| insert(service.repo(), Some(right), 1000.0 * (index as f64 + 1.0)))
        .collect();

    thread::scope(|scope| {
        scope.spawn(|| {
            for card in &left_cards {
                let mut card = card.clone();
                service.move_to_column(&mut card, right, 0).unwrap();
            }
        });
        scope.spawn(|| {
            for card in &right_cards {
                let mut card = card.clone();
                service.move_to_column(&mut card, left, 0).unwrap();
            }
        });
    });

    let left_after = service.repo().load_siblings(left).unwrap();
    let right_after = service.repo().load_siblings(right).unwrap();
    assert_eq!(left_after.len(), 20);
    assert_eq!(right_after.len(), 20);
    assert!(left_after
        .iter()
        .all(|card| right_cards.iter().any(|original| original.id == card.id)));
    assert!(right_after
        .iter()
        .all(|card| left_cards.iter().any(|original| original.id == card.id)));
}

#[test]
fn move_with_stale_copy_keeps_committed_title() {
    let repo = InMemoryCardRepository::new();
    let boards = BoardService::new(&repo);
    let ordering = OrderingService::new(&repo);
    let column_id = column(&repo);
    let mut stale = boards.add_card(column_id, "old title").unwrap();
    boards.add_card(column_id, "neighbour").unwrap();

    boards.rename_card(stale.id, "new title").unwrap();
    ordering.move_within_column(&mut stale, 2).unwrap();

    let stored = repo.get_card(stale.id).unwrap().unwrap();
    assert_eq!(stored.title, "new title");
    assert_eq!(stored.sort_key, 3000.0);
}
