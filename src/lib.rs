//! Weighted, order-preserving navigation trees.
//!
//! A media device that can only step through a directory entry by entry
//! makes every selection cost a number of key-presses that depends on the
//! entry's position. Given an ordered list of weighted items (for example
//! album folders and how often each is played), this crate groups them into
//! a tree with at most B entries per directory so that the weighted sum of
//! access costs is small, while the left-to-right leaf order stays exactly
//! the input order.
//!
//! Core modules:
//! - [`cost`] - Per-slot access costs and target shares
//! - [`partition`] - Share-based heuristic cut placement
//! - [`exhaustive`] - Exact minimum-cost search
//! - [`builder`] - Validation and strategy dispatch
//! - [`tree`] - The resulting tree, its cost and its renderings
//!
//! ### Supporting Modules
//!
//! - [`item`] - Labelled, weighted input items
//! - [`error`] - Validation errors of the core
//! - [`catalog`] - Item lists from music directories and JSON files
//! - [`layout`] - Directory layout plan for a finished tree
//! - [`config`] - Configuration file handling
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```
//! use navtree::builder::{Strategy, TreeBuilder};
//! use navtree::cost::{AccessProfile, CostVector};
//! use navtree::item::Item;
//!
//! let items = vec![
//!     Item::new("Abba", 1),
//!     Item::new("Beatles", 1),
//!     Item::new("Cream", 1000),
//!     Item::new("Doors", 1),
//!     Item::new("Eagles", 1),
//! ];
//! let costs = CostVector::from_profile(AccessProfile::Constant, 4)?;
//!
//! let tree = TreeBuilder::new(costs).strategy(Strategy::Heuristic).build(&items)?;
//! assert_eq!(tree.shape(), "[[1,1],1000,1,1]");
//! assert_eq!(tree.leaves().len(), 5);
//! println!("{tree}");
//! # Ok::<(), navtree::error::TreeError>(())
//! ```
//!
//! ## Strategies
//!
//! The heuristic splits each range by the cost model's shares and is fast on
//! any input size, but not always optimal. The exhaustive search is exact
//! and O(B·n³). The default hybrid strategy uses the heuristic near the root
//! and the exact search for ranges below a threshold (40 items by default).
//!
//! ## Error Handling
//!
//! The core returns [`error::TreeError`]; every input is validated before any
//! tree is built, so a build either succeeds completely or fails without
//! partial output. The catalog, config and CLI layers use `anyhow::Result`
//! with context.

pub mod builder;
pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod cost;
pub mod error;
pub mod exhaustive;
pub mod item;
pub mod layout;
pub mod partition;
pub mod tree;
