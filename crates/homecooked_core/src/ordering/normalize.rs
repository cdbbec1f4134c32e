//! Sort key rebalancing.
//!
//! Repeated midpoint insertion at the same slot halves the gap every time, so
//! neighbouring keys converge until they round to the same `f64`. This policy
//! detects gaps below the threshold and re-spaces a column evenly.
//!
//! # Invariants
//! - Normalization preserves relative order; it never reorders cards.
//! - Normalization never changes column membership.
//! - Cards already within the rewrite tolerance of their target are skipped.

use super::config::OrderingConfig;
use crate::model::card::{sort_cards, Card, CardId};

/// One planned key rewrite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyAssignment {
    pub card_id: CardId,
    pub old_key: f64,
    pub new_key: f64,
}

/// Decides when keys are too tight and computes evenly spaced replacements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationPolicy {
    threshold: f64,
    key_spacing: f64,
    rewrite_tolerance: f64,
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self::from_config(&OrderingConfig::default())
    }
}

impl NormalizationPolicy {
    pub fn from_config(config: &OrderingConfig) -> Self {
        Self {
            threshold: config.normalization_threshold,
            key_spacing: config.key_spacing,
            rewrite_tolerance: config.rewrite_tolerance,
        }
    }

    /// Returns true when any two adjacent keys (after sorting) are closer than
    /// the threshold. Duplicate keys always qualify.
    pub fn should_normalize(&self, keys: &[f64]) -> bool {
        let mut sorted = keys.to_vec();
        sorted.sort_by(f64::total_cmp);
        sorted
            .windows(2)
            .any(|pair| (pair[1] - pair[0]).abs() < self.threshold)
    }

    /// Target key for the card at `index` after normalization.
    pub fn target_key(&self, index: usize) -> f64 {
        (index as f64 + 1.0) * self.key_spacing
    }

    /// Plans rewrites for cards given in ascending order.
    ///
    /// Cards whose key is already closer than the rewrite tolerance to
    /// `(index + 1) * spacing` are left out of the result.
    pub fn plan(&self, ordered: &[Card]) -> Vec<KeyAssignment> {
        ordered
            .iter()
            .enumerate()
            .filter_map(|(index, card)| {
                let new_key = self.target_key(index);
                if (card.sort_key - new_key).abs() < self.rewrite_tolerance {
                    return None;
                }
                Some(KeyAssignment {
                    card_id: card.id,
                    old_key: card.sort_key,
                    new_key,
                })
            })
            .collect()
    }

    /// Sorts `cards` by key, then rewrites them like [`Self::apply_ordered`].
    pub fn apply(&self, cards: &mut [Card], now: i64) -> Vec<Card> {
        sort_cards(cards);
        self.apply_ordered(cards, now)
    }

    /// Rewrites keys of cards already in display order and returns the cards
    /// that changed, in that order. `updated_at` is refreshed only on them.
    pub fn apply_ordered(&self, ordered: &mut [Card], now: i64) -> Vec<Card> {
        let plan = self.plan(ordered);
        let mut changed = Vec::with_capacity(plan.len());
        for assignment in plan {
            if let Some(card) = ordered.iter_mut().find(|card| card.id == assignment.card_id) {
                card.assign_sort_key(assignment.new_key, now);
                changed.push(card.clone());
            }
        }
        changed
    }
}
