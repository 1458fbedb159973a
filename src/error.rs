//! # Error Module
//!
//! Typed errors raised by the tree-construction core. Every condition is
//! detected before recursion starts, so a build either yields a complete tree
//! or exactly one of these values.
//!
//! The application layer (catalog, config, CLI) wraps these in
//! `anyhow::Error` with added context.

use thiserror::Error;

/// Errors produced while validating build inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    /// A slot cost is not a positive finite number.
    #[error("invalid access cost {cost} for slot {slot}: costs must be positive and finite")]
    InvalidCost { slot: usize, cost: f64 },

    /// An item weight is not a positive integer, or it pushes the total
    /// weight past `u64::MAX`.
    #[error("invalid weight {weight} for `{label}': weights must be positive integers")]
    InvalidWeight { label: String, weight: f64 },

    /// The branching factor does not match the cost vector or cannot hold
    /// the items.
    #[error("invalid branching factor {branching_factor} for {cost_count} slot costs")]
    InvalidBranchingFactor {
        branching_factor: usize,
        cost_count: usize,
    },

    /// No items were given. Empty inputs are rejected rather than mapped to
    /// an empty tree.
    #[error("cannot build a tree from zero items")]
    EmptyInput,
}

/// Convenience alias for core results.
pub type Result<T> = std::result::Result<T, TreeError>;
