//! Tunables for sort key spacing and rebalancing.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key assigned to the first card of an empty column.
pub const DEFAULT_SORT_KEY: f64 = 1000.0;
/// Distance between neighbours after edge insertion or normalization.
pub const KEY_SPACING: f64 = 1000.0;
/// Adjacent keys closer than this trigger normalization.
pub const NORMALIZATION_THRESHOLD: f64 = 0.001;
/// Normalization skips cards already this close to their target key.
pub const REWRITE_TOLERANCE: f64 = 0.01;

/// Ordering engine configuration.
///
/// Missing fields fall back to the defaults above when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    pub default_key: f64,
    pub key_spacing: f64,
    pub normalization_threshold: f64,
    pub rewrite_tolerance: f64,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            default_key: DEFAULT_SORT_KEY,
            key_spacing: KEY_SPACING,
            normalization_threshold: NORMALIZATION_THRESHOLD,
            rewrite_tolerance: REWRITE_TOLERANCE,
        }
    }
}

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderingConfigError {
    /// Field must be a finite number.
    NonFinite { field: &'static str, value: f64 },
    /// Field must be strictly positive.
    NotPositive { field: &'static str, value: f64 },
    /// Normalized spacing must stay wider than the normalization threshold.
    SpacingBelowThreshold { key_spacing: f64, threshold: f64 },
}

impl Display for OrderingConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite { field, value } => {
                write!(f, "ordering config `{field}` must be finite, got {value}")
            }
            Self::NotPositive { field, value } => {
                write!(f, "ordering config `{field}` must be positive, got {value}")
            }
            Self::SpacingBelowThreshold {
                key_spacing,
                threshold,
            } => write!(
                f,
                "ordering config key_spacing {key_spacing} must exceed normalization_threshold {threshold}"
            ),
        }
    }
}

impl Error for OrderingConfigError {}

impl OrderingConfig {
    /// Checks that every tunable is usable.
    pub fn validate(&self) -> Result<(), OrderingConfigError> {
        if !self.default_key.is_finite() {
            return Err(OrderingConfigError::NonFinite {
                field: "default_key",
                value: self.default_key,
            });
        }
        for (field, value) in [
            ("key_spacing", self.key_spacing),
            ("normalization_threshold", self.normalization_threshold),
            ("rewrite_tolerance", self.rewrite_tolerance),
        ] {
            if !value.is_finite() {
                return Err(OrderingConfigError::NonFinite { field, value });
            }
            if value <= 0.0 {
                return Err(OrderingConfigError::NotPositive { field, value });
            }
        }
        if self.key_spacing <= self.normalization_threshold {
            return Err(OrderingConfigError::SpacingBelowThreshold {
                key_spacing: self.key_spacing,
                threshold: self.normalization_threshold,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{OrderingConfig, OrderingConfigError};

    #[test]
    fn defaults_are_valid() {
        let config = OrderingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_key, 1000.0);
        assert_eq!(config.key_spacing, 1000.0);
        assert_eq!(config.normalization_threshold, 0.001);
        assert_eq!(config.rewrite_tolerance, 0.01);
    }

    #[test]
    fn validate_rejects_zero_spacing() {
        let config = OrderingConfig {
            key_spacing: 0.0,
            ..OrderingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(OrderingConfigError::NotPositive {
                field: "key_spacing",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_spacing_inside_threshold() {
        let config = OrderingConfig {
            key_spacing: 0.5,
            normalization_threshold: 1.0,
            ..OrderingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(OrderingConfigError::SpacingBelowThreshold { .. })
        ));
    }
}
