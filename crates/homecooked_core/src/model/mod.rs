//! Board/column/card domain model.
//!
//! # Responsibility
//! - Define the data structures the ordering engine reads and mutates.
//!
//! # Invariants
//! - Every card, column and board is identified by a stable UUID.
//! - Column membership is a foreign-key style reference on the card, never a
//!   stored list on the column.

pub mod board;
pub mod card;
pub mod column_view;
