//! Fractional sort key engine.
//!
//! # Responsibility
//! - Compute insertion keys for positional moves.
//! - Decide when a column needs rebalancing and compute the new spacing.
//!
//! Everything here is synchronous and in-memory; persistence lives in
//! `service::ordering_service`.

pub mod config;
pub mod normalize;
pub mod sort_key;
