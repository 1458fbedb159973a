//! Weighted items: the leaves of every navigation tree.

use crate::error::{Result, TreeError};
use serde::{Deserialize, Serialize};

/// A single navigable entry, usually a music folder.
///
/// The label is the stable identity (a folder name), the weight says how
/// often it is accessed (e.g. its track count). Position in the surrounding
/// sequence is meaningful and is never changed by the builders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub label: String,
    pub weight: u64,
}

impl Item {
    pub fn new(label: impl Into<String>, weight: u64) -> Self {
        Self {
            label: label.into(),
            weight,
        }
    }

    /// Build an item from an untyped weight, as read from user files.
    ///
    /// Rejects weights that are not positive whole numbers. Nothing is
    /// rounded or clamped.
    pub fn from_raw_weight(label: impl Into<String>, weight: f64) -> Result<Self> {
        let label = label.into();
        let representable = weight.is_finite()
            && weight >= 1.0
            && weight.fract() == 0.0
            && weight < u64::MAX as f64;
        if !representable {
            return Err(TreeError::InvalidWeight { label, weight });
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let weight = weight as u64;
        Ok(Self { label, weight })
    }

    /// Build an item from a JSON number. Only exact positive integers that
    /// fit a `u64` are accepted; floats are rejected even when whole, since
    /// large ones have already lost precision during parsing.
    pub fn from_json_number(label: impl Into<String>, weight: &serde_json::Number) -> Result<Self> {
        let label = label.into();
        match weight.as_u64() {
            Some(weight) if weight > 0 => Ok(Self { label, weight }),
            _ => Err(TreeError::InvalidWeight {
                label,
                weight: weight.as_f64().unwrap_or(f64::NAN),
            }),
        }
    }

    /// Checks the invariants the builders rely on.
    pub fn validate(&self) -> Result<()> {
        if self.weight == 0 {
            return Err(TreeError::InvalidWeight {
                label: self.label.clone(),
                weight: 0.0,
            });
        }
        Ok(())
    }
}

/// Sum of weights, as used by the partitioners.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn total_weight(items: &[Item]) -> f64 {
    items.iter().map(|item| item.weight as f64).sum()
}
