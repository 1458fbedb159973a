//! # Cost Model
//!
//! Access costs describe how many key-presses it takes to select each of a
//! directory's entries on the remote control. A node's children occupy slots
//! `0..k` and slot `i` always costs `costs[i]`, regardless of depth.
//!
//! The heuristic partitioner turns these costs into target *shares*: the
//! fraction of a range's weight that should land in each slot. The shares
//! satisfy
//!
//! ```text
//! sum(shares) == 1
//! shares[i] / shares[j] == costs[j] / costs[i]
//! ```
//!
//! so cheap slots receive proportionally more weight. This is a target, not
//! an optimality guarantee; see [`crate::exhaustive`] for the exact search.

use crate::error::{Result, TreeError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Named cost structures for a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AccessProfile {
    /// Linear navigation where the cursor wraps from the last entry to the
    /// first, so the far end is cheap again.
    #[default]
    Wrappable,
    /// One key-press per entry, no wrapping.
    Linear,
    /// Every entry is equally expensive.
    Constant,
}

impl AccessProfile {
    /// Slot costs for a listing with `branching_factor` entries.
    ///
    /// ```
    /// use navtree::cost::AccessProfile;
    ///
    /// assert_eq!(AccessProfile::Wrappable.costs(4), vec![1.0, 2.0, 3.0, 2.0]);
    /// assert_eq!(AccessProfile::Linear.costs(3), vec![1.0, 2.0, 3.0]);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn costs(self, branching_factor: usize) -> Vec<f64> {
        match self {
            Self::Wrappable => (0..branching_factor)
                .map(|n| match n {
                    0 => 1.0,
                    n => (n.min(branching_factor - n) + 1) as f64,
                })
                .collect(),
            Self::Linear => (1..=branching_factor).map(|n| n as f64).collect(),
            Self::Constant => vec![1.0; branching_factor],
        }
    }
}

/// A validated cost vector. Its length is the branching factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CostVector {
    costs: Vec<f64>,
}

impl CostVector {
    /// Validate explicit costs. Every cost must be positive and finite.
    pub fn new(costs: Vec<f64>) -> Result<Self> {
        if costs.is_empty() {
            return Err(TreeError::InvalidBranchingFactor {
                branching_factor: 0,
                cost_count: 0,
            });
        }
        if let Some((slot, &cost)) = costs
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_finite() || **c <= 0.0)
        {
            return Err(TreeError::InvalidCost { slot, cost });
        }
        Ok(Self { costs })
    }

    /// Costs generated by `profile` for `branching_factor` slots.
    pub fn from_profile(profile: AccessProfile, branching_factor: usize) -> Result<Self> {
        Self::new(profile.costs(branching_factor))
    }

    /// Validate `costs` against an explicitly requested branching factor.
    pub fn with_branching_factor(costs: Vec<f64>, branching_factor: usize) -> Result<Self> {
        if branching_factor == 0 || costs.len() != branching_factor {
            return Err(TreeError::InvalidBranchingFactor {
                branching_factor,
                cost_count: costs.len(),
            });
        }
        Self::new(costs)
    }

    /// The branching factor B.
    #[must_use]
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Cost of slot `slot`.
    #[must_use]
    pub fn slot(&self, slot: usize) -> f64 {
        self.costs[slot]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.costs
    }

    /// Target weight shares for this cost vector.
    #[must_use]
    pub fn shares(&self) -> Vec<f64> {
        shares_unchecked(&self.costs)
    }
}

/// Transform costs into target weight shares.
///
/// Fails with [`TreeError::InvalidCost`] when any cost is not positive.
///
/// ```
/// use navtree::cost::target_shares;
///
/// let shares = target_shares(&[1.0, 2.0, 2.0]).unwrap();
/// assert_eq!(shares, vec![0.5, 0.25, 0.25]);
/// ```
pub fn target_shares(costs: &[f64]) -> Result<Vec<f64>> {
    Ok(CostVector::new(costs.to_vec())?.shares())
}

fn shares_unchecked(costs: &[f64]) -> Vec<f64> {
    let inverse: Vec<f64> = costs.iter().map(|c| 1.0 / c).collect();
    let sum: f64 = inverse.iter().sum();
    let shares: Vec<f64> = inverse.iter().map(|b| b / sum).collect();
    debug_assert!((shares.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    log::trace!("Derived shares {shares:?} from costs {costs:?}");
    shares
}
