//! Sort key calculation for positional insertion.
//!
//! # Responsibility
//! - Compute a key that lands at a requested index among existing siblings.
//!
//! # Invariants
//! - Pure and deterministic: no I/O, no clock, no shared state.
//! - `siblings` must be ascending and must exclude the moving card.
//! - Finite inputs always produce a finite output.

use super::config::OrderingConfig;

/// Computes insertion keys with configurable edge spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortKeyCalculator {
    default_key: f64,
    key_spacing: f64,
}

impl Default for SortKeyCalculator {
    fn default() -> Self {
        Self::from_config(&OrderingConfig::default())
    }
}

impl SortKeyCalculator {
    pub fn from_config(config: &OrderingConfig) -> Self {
        Self {
            default_key: config.default_key,
            key_spacing: config.key_spacing,
        }
    }

    /// Returns the key for inserting at `target_index` among `siblings`.
    ///
    /// - empty column: the default key
    /// - index 0: one spacing before the first sibling
    /// - index at or past the end: one spacing after the last sibling
    /// - otherwise: midpoint of the two neighbours
    pub fn calculate(&self, target_index: usize, siblings: &[f64]) -> f64 {
        let (Some(first), Some(last)) = (siblings.first(), siblings.last()) else {
            return self.default_key;
        };
        if target_index == 0 {
            return first - self.key_spacing;
        }
        if target_index >= siblings.len() {
            return last + self.key_spacing;
        }
        midpoint(siblings[target_index - 1], siblings[target_index])
    }
}

/// Computes an insertion key with the default spacing.
pub fn calculate_sort_key(target_index: usize, siblings: &[f64]) -> f64 {
    SortKeyCalculator::default().calculate(target_index, siblings)
}

// Halving first keeps the sum of two huge keys from overflowing to infinity.
fn midpoint(before: f64, after: f64) -> f64 {
    before / 2.0 + after / 2.0
}
