//! Card ordering use-case service.
//!
//! # Responsibility
//! - Move cards within a column or across columns at a requested index.
//! - Rebalance a column when keys get too close, in the same commit as the
//!   move that caused it.
//! - Serialize the read-siblings, compute-key, write sequence per column.
//!
//! # Invariants
//! - After a successful move `card.column_id == Some(destination)`.
//! - Only this service mutates `sort_key`/`column_id` of existing cards.
//! - Persistence errors are returned unchanged inside `OrderingError::Repo`;
//!   there is no retry and no rollback of the caller's in-memory card.

use crate::model::board::ColumnId;
use crate::model::card::{now_epoch_ms, sort_cards, Card, CardId};
use crate::ordering::config::{OrderingConfig, OrderingConfigError};
use crate::ordering::normalize::NormalizationPolicy;
use crate::ordering::sort_key::SortKeyCalculator;
use crate::repo::{CardRepository, RepoError};
use log::{error, info};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Errors from ordering operations.
#[derive(Debug)]
pub enum OrderingError {
    /// Same-column reorder requested for a card without a column.
    NoColumn(CardId),
    /// Requested index is negative.
    InvalidIndex { card_id: CardId, index: i64 },
    /// Destination column does not exist.
    ColumnNotFound(ColumnId),
    /// Persistence collaborator failure, passed through untouched.
    Repo(RepoError),
}

impl Display for OrderingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoColumn(id) => write!(f, "card must belong to a column: {id}"),
            Self::InvalidIndex { card_id, index } => {
                write!(f, "invalid destination index {index} for card {card_id}")
            }
            Self::ColumnNotFound(id) => write!(f, "destination column not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OrderingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for OrderingError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of one committed move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// Moved card with its committed placement. Only `column_id`,
    /// `sort_key` and `updated_at` are written; other fields are as passed in.
    pub card: Card,
    /// Column the card left. Equal to `destination_column` for reorders.
    pub source_column: Option<ColumnId>,
    pub destination_column: ColumnId,
    /// Whether the destination column was rebalanced.
    pub normalized: bool,
    /// Every card written by the commit, moved card included.
    pub saved: Vec<Card>,
}

impl MoveOutcome {
    /// True when the card changed columns.
    pub fn crossed_columns(&self) -> bool {
        self.source_column != Some(self.destination_column)
    }
}

/// Per-column mutex registry.
#[derive(Debug, Default)]
struct ColumnLocks {
    locks: Mutex<HashMap<ColumnId, Arc<Mutex<()>>>>,
}

impl ColumnLocks {
    /// Returns lock handles for `columns`, deduplicated and sorted by id so
    /// concurrent callers always acquire in the same order.
    fn handles(&self, columns: impl IntoIterator<Item = ColumnId>) -> Vec<Arc<Mutex<()>>> {
        let mut ids: Vec<ColumnId> = columns.into_iter().collect();
        ids.sort();
        ids.dedup();

        // The registry only maps ids to handles; a poisoned map is still usable.
        let mut registry = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        ids.into_iter()
            .map(|id| Arc::clone(registry.entry(id).or_default()))
            .collect()
    }
}

fn lock_all(handles: &[Arc<Mutex<()>>]) -> Vec<MutexGuard<'_, ()>> {
    handles
        .iter()
        .map(|handle| handle.lock().unwrap_or_else(PoisonError::into_inner))
        .collect()
}

/// Ordering service facade.
pub struct OrderingService<R: CardRepository> {
    repo: R,
    calculator: SortKeyCalculator,
    policy: NormalizationPolicy,
    locks: ColumnLocks,
}

impl<R: CardRepository> OrderingService<R> {
    /// Creates service with default spacing and thresholds.
    pub fn new(repo: R) -> Self {
        let config = OrderingConfig::default();
        Self {
            repo,
            calculator: SortKeyCalculator::from_config(&config),
            policy: NormalizationPolicy::from_config(&config),
            locks: ColumnLocks::default(),
        }
    }

    /// Creates service with custom tunables.
    pub fn with_config(repo: R, config: OrderingConfig) -> Result<Self, OrderingConfigError> {
        config.validate()?;
        Ok(Self {
            repo,
            calculator: SortKeyCalculator::from_config(&config),
            policy: NormalizationPolicy::from_config(&config),
            locks: ColumnLocks::default(),
        })
    }

    /// Underlying persistence collaborator.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Reorders a card inside its current column.
    ///
    /// # Errors
    /// - `NoColumn` when the card is unparented.
    /// - Everything `move_to_column` can return.
    pub fn move_within_column(
        &self,
        card: &mut Card,
        to_index: i64,
    ) -> Result<MoveOutcome, OrderingError> {
        let column_id = card.column_id.ok_or(OrderingError::NoColumn(card.id))?;
        self.move_to_column(card, column_id, to_index)
    }

    /// Moves a card to `destination` at `at_index`.
    ///
    /// Works for same-column reorders and cross-column drags. Indices past the
    /// end append. `card` is updated in place before the commit; when the
    /// commit fails the caller must re-read before trusting it.
    ///
    /// # Errors
    /// - `InvalidIndex` for negative indices.
    /// - `ColumnNotFound` when `destination` does not exist.
    /// - `Repo` for any persistence failure.
    pub fn move_to_column(
        &self,
        card: &mut Card,
        destination: ColumnId,
        at_index: i64,
    ) -> Result<MoveOutcome, OrderingError> {
        let started_at = Instant::now();
        let card_id = card.id;
        match self.move_card(card, destination, at_index) {
            Ok(outcome) => {
                info!(
                    "event=card_move module=ordering status=ok card_uuid={card_id} source_column={} destination_column={destination} index={at_index} normalized={} written={} duration_ms={}",
                    format_column(outcome.source_column),
                    outcome.normalized,
                    outcome.saved.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(
                    "event=card_move module=ordering status=error card_uuid={card_id} destination_column={destination} index={at_index} duration_ms={} error_code={} error={err}",
                    started_at.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    /// Rebalances one column to evenly spaced keys regardless of gap size.
    ///
    /// Returns the cards that were rewritten, in display order.
    pub fn normalize_column(&self, column_id: ColumnId) -> Result<Vec<Card>, OrderingError> {
        let started_at = Instant::now();
        if !self.repo.column_exists(column_id)? {
            return Err(OrderingError::ColumnNotFound(column_id));
        }

        let handles = self.locks.handles([column_id]);
        let _guards = lock_all(&handles);

        let mut cards = self.repo.load_siblings(column_id)?;
        let changed = self.policy.apply(&mut cards, now_epoch_ms());
        if !changed.is_empty() {
            self.repo.save_cards(&changed)?;
        }

        info!(
            "event=column_normalize module=ordering status=ok column_uuid={column_id} cards={} written={} duration_ms={}",
            cards.len(),
            changed.len(),
            started_at.elapsed().as_millis()
        );
        Ok(changed)
    }

    fn move_card(
        &self,
        card: &mut Card,
        destination: ColumnId,
        at_index: i64,
    ) -> Result<MoveOutcome, OrderingError> {
        let target_index = usize::try_from(at_index).map_err(|_| OrderingError::InvalidIndex {
            card_id: card.id,
            index: at_index,
        })?;
        if !self.repo.column_exists(destination)? {
            return Err(OrderingError::ColumnNotFound(destination));
        }

        let source_column = card.column_id;
        let handles = self
            .locks
            .handles(source_column.into_iter().chain([destination]));
        let _guards = lock_all(&handles);

        let mut siblings = self.repo.load_siblings(destination)?;
        siblings.retain(|sibling| sibling.id != card.id);
        sort_cards(&mut siblings);
        let sibling_keys: Vec<f64> = siblings.iter().map(|sibling| sibling.sort_key).collect();

        let new_key = self.calculator.calculate(target_index, &sibling_keys);
        let now = now_epoch_ms();
        card.column_id = Some(destination);
        card.assign_sort_key(new_key, now);

        // Place the card by index rather than by key so a collapsed key still
        // lands in the requested slot when the column gets rebalanced.
        let mut column_cards = siblings;
        column_cards.insert(target_index.min(column_cards.len()), card.clone());
        let column_keys: Vec<f64> = column_cards.iter().map(|member| member.sort_key).collect();

        let normalized = self.policy.should_normalize(&column_keys);
        let mut saved = if normalized {
            self.policy.apply_ordered(&mut column_cards, now)
        } else {
            Vec::new()
        };
        if let Some(rebalanced) = saved.iter().find(|member| member.id == card.id) {
            *card = rebalanced.clone();
        }
        if !saved.iter().any(|member| member.id == card.id) {
            saved.push(card.clone());
        }

        self.repo.save_cards(&saved)?;

        Ok(MoveOutcome {
            card: card.clone(),
            source_column,
            destination_column: destination,
            normalized,
            saved,
        })
    }
}

fn format_column(column_id: Option<ColumnId>) -> String {
    column_id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

fn error_code(err: &OrderingError) -> &'static str {
    match err {
        OrderingError::NoColumn(_) => "no_column",
        OrderingError::InvalidIndex { .. } => "invalid_index",
        OrderingError::ColumnNotFound(_) => "column_not_found",
        OrderingError::Repo(_) => "repo_failed",
    }
}
