//! Core domain logic for HomeCooked boards.
//! This crate owns card ordering: fractional sort keys, cross-column moves
//! and rebalancing, plus the persistence contracts it commits through.

pub mod db;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::board::{Board, BoardId, Column, ColumnId};
pub use model::card::{Card, CardId, CardValidationError};
pub use model::column_view::ColumnView;
pub use ordering::config::{OrderingConfig, OrderingConfigError};
pub use ordering::normalize::{KeyAssignment, NormalizationPolicy};
pub use ordering::sort_key::{calculate_sort_key, SortKeyCalculator};
pub use repo::memory_repo::InMemoryCardRepository;
pub use repo::sqlite_repo::SqliteCardRepository;
pub use repo::{BoardRepository, CardRepository, RepoError, RepoResult};
pub use service::board_service::{BoardService, BoardServiceError};
pub use service::ordering_service::{MoveOutcome, OrderingError, OrderingService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
