//! # Tree Builder
//!
//! Validates inputs, then recursively partitions the item sequence into a
//! [`Tree`]. Three strategies are available:
//!
//! - [`Strategy::Heuristic`]: cost-model shares with round-to-nearest cuts at
//!   every node (fast, not always optimal)
//! - [`Strategy::Exhaustive`]: exact search over the whole input
//! - [`Strategy::Hybrid`]: exact search for ranges below the configured
//!   threshold, heuristic splits above it
//!
//! Sibling subtrees share no state. With `parallel` enabled, large sibling
//! ranges are built on the rayon pool and collected in order, so the result
//! never depends on scheduling.
//!
//! ## Example
//!
//! ```
//! use navtree::builder::{Strategy, TreeBuilder};
//! use navtree::cost::CostVector;
//! use navtree::item::Item;
//!
//! let items: Vec<Item> = (0..7).map(|i| Item::new(format!("album {i}"), 1)).collect();
//! let costs = CostVector::new(vec![1.0, 2.0, 3.0, 2.0])?;
//!
//! let tree = TreeBuilder::new(costs).strategy(Strategy::Exhaustive).build(&items)?;
//! assert_eq!(tree.shape(), "[[1,1,1,1],1,1,1]");
//! # Ok::<(), navtree::error::TreeError>(())
//! ```

use crate::cost::CostVector;
use crate::error::{Result, TreeError};
use crate::exhaustive::ExhaustiveSearch;
use crate::item::Item;
use crate::partition;
use crate::tree::{Node, Tree};
use clap::ValueEnum;
use log::{debug, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::Instant;

/// Ranges smaller than this are built on the calling thread.
const PARALLEL_MIN_ITEMS: usize = 256;

/// Default item count below which the hybrid strategy searches exactly.
pub const DEFAULT_EXHAUSTIVE_THRESHOLD: usize = 40;

/// Item count from which a pure exhaustive build takes minutes.
pub const EXHAUSTIVE_WARN_ITEMS: usize = 1_000;

/// How ranges are split into child groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Share-based cuts at every node.
    Heuristic,
    /// Exact search over the whole input.
    Exhaustive,
    /// Exact search below the threshold, heuristic above it.
    #[default]
    Hybrid,
}

/// Builds navigation trees for a fixed cost vector.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    costs: CostVector,
    shares: Vec<f64>,
    strategy: Strategy,
    exhaustive_threshold: usize,
    parallel: bool,
}

impl TreeBuilder {
    /// Hybrid builder with the default threshold and parallelism enabled.
    #[must_use]
    pub fn new(costs: CostVector) -> Self {
        let shares = costs.shares();
        Self {
            costs,
            shares,
            strategy: Strategy::default(),
            exhaustive_threshold: DEFAULT_EXHAUSTIVE_THRESHOLD,
            parallel: true,
        }
    }

    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Ranges with fewer items than `threshold` are searched exhaustively by
    /// the hybrid strategy.
    #[must_use]
    pub fn exhaustive_threshold(mut self, threshold: usize) -> Self {
        self.exhaustive_threshold = threshold;
        self
    }

    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn costs(&self) -> &CostVector {
        &self.costs
    }

    /// Whether building `item_count` items would run the exact search on a
    /// range too large for it.
    #[must_use]
    pub fn exceeds_exhaustive_budget(&self, item_count: usize) -> bool {
        self.strategy == Strategy::Exhaustive && item_count >= EXHAUSTIVE_WARN_ITEMS
    }

    /// Build the tree for `items`, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure; see [`validate`]. No partial
    /// tree is ever returned.
    pub fn build(&self, items: &[Item]) -> Result<Tree> {
        validate(items, &self.costs)?;
        if self.exceeds_exhaustive_budget(items.len()) {
            warn!(
                "Exhaustive search over {} items is O(B·n³) and may take very long; consider --strategy hybrid",
                items.len()
            );
        }
        let started = Instant::now();

        let root = if items.len() == 1 {
            Node::Internal(vec![Node::Leaf(items[0].clone())])
        } else {
            match self.strategy {
                Strategy::Heuristic => self.heuristic_node(items, 0..items.len(), false),
                Strategy::Exhaustive => exhaustive_node(items, 0..items.len(), &self.costs),
                Strategy::Hybrid => self.heuristic_node(items, 0..items.len(), true),
            }
        };

        let tree = Tree::new(root, self.costs.clone());
        debug!(
            "Built {:?} tree for {} items in {:?}: depth {}, total cost {}",
            self.strategy,
            items.len(),
            started.elapsed(),
            tree.depth(),
            tree.total_cost()
        );
        Ok(tree)
    }

    /// Internal node for `range` (at least two items). With `hybrid` set,
    /// ranges below the threshold switch to the exact search.
    fn heuristic_node(&self, items: &[Item], range: Range<usize>, hybrid: bool) -> Node {
        if hybrid && range.len() < self.exhaustive_threshold {
            return exhaustive_node(items, range, &self.costs);
        }

        let parts = partition::partition(items, range.clone(), &self.shares);
        trace!("Heuristic split of {range:?} into {parts:?}");

        let child = |part: Range<usize>| match part.len() {
            1 => Node::Leaf(items[part.start].clone()),
            _ => self.heuristic_node(items, part, hybrid),
        };
        let children = if self.parallel && range.len() >= PARALLEL_MIN_ITEMS {
            parts.into_par_iter().map(child).collect()
        } else {
            parts.into_iter().map(child).collect()
        };
        Node::Internal(children)
    }
}

/// Exact subtree for `range` (at least two items).
fn exhaustive_node(items: &[Item], range: Range<usize>, costs: &CostVector) -> Node {
    let weights: Vec<u64> = items[range.clone()].iter().map(|item| item.weight).collect();
    let search = ExhaustiveSearch::new(&weights, costs);
    let offset = range.start;

    fn node_for(search: &ExhaustiveSearch, items: &[Item], offset: usize, local: Range<usize>) -> Node {
        if local.len() == 1 {
            return Node::Leaf(items[offset + local.start].clone());
        }
        Node::Internal(
            search
                .split(local)
                .into_iter()
                .map(|part| node_for(search, items, offset, part))
                .collect(),
        )
    }

    node_for(&search, items, offset, 0..range.len())
}

/// Check every build precondition before any recursion.
///
/// # Errors
///
/// - [`TreeError::EmptyInput`] for zero items
/// - [`TreeError::InvalidBranchingFactor`] when a single slot must hold more
///   than one item
/// - [`TreeError::InvalidWeight`] for the first zero-weight item, or for the
///   item that pushes the total weight past `u64::MAX`
#[allow(clippy::cast_precision_loss)]
pub fn validate(items: &[Item], costs: &CostVector) -> Result<()> {
    if items.is_empty() {
        return Err(TreeError::EmptyInput);
    }
    if costs.len() < 2 && items.len() > 1 {
        return Err(TreeError::InvalidBranchingFactor {
            branching_factor: costs.len(),
            cost_count: costs.len(),
        });
    }
    items.iter().try_for_each(Item::validate)?;
    // Prefix sums and subtree weights are plain u64 from here on.
    items
        .iter()
        .try_fold(0u64, |total, item| {
            total.checked_add(item.weight).ok_or_else(|| TreeError::InvalidWeight {
                label: item.label.clone(),
                weight: item.weight as f64,
            })
        })
        .map(|_| ())
}

/// Hybrid build with default settings.
///
/// # Errors
///
/// See [`TreeBuilder::build`].
pub fn build_tree(items: &[Item], costs: &CostVector) -> Result<Tree> {
    TreeBuilder::new(costs.clone()).build(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::AccessProfile;

    fn weighted(weights: &[u64]) -> Vec<Item> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Item::new(format!("item{i:03}"), w))
            .collect()
    }

    fn wrappable() -> CostVector {
        CostVector::from_profile(AccessProfile::Wrappable, 4).unwrap()
    }

    fn constant() -> CostVector {
        CostVector::from_profile(AccessProfile::Constant, 4).unwrap()
    }

    #[test]
    fn test_heavy_middle_item_regression() {
        let tree = TreeBuilder::new(constant())
            .strategy(Strategy::Heuristic)
            .build(&weighted(&[1, 1, 1000, 1, 1]))
            .unwrap();
        assert_eq!(tree.shape(), "[[1,1],1000,1,1]");
    }

    #[test]
    fn test_heavy_tail_regression() {
        let tree = TreeBuilder::new(constant())
            .strategy(Strategy::Heuristic)
            .build(&weighted(&[1, 1, 1, 1, 1, 1, 1, 9247]))
            .unwrap();
        assert_eq!(tree.root().children().len(), 4);
        assert_ne!(tree.shape(), "[[1,1,1,1,1,1,1],9247]");
    }

    #[test]
    fn test_seven_equal_items_heuristic_vs_exhaustive() {
        let items = weighted(&[1; 7]);
        let heuristic = TreeBuilder::new(wrappable())
            .strategy(Strategy::Heuristic)
            .build(&items)
            .unwrap();
        let exhaustive = TreeBuilder::new(wrappable())
            .strategy(Strategy::Exhaustive)
            .build(&items)
            .unwrap();

        assert_eq!(heuristic.shape(), "[[1,1,1],[1,1],1,1]");
        assert_eq!(exhaustive.shape(), "[[1,1,1,1],1,1,1]");
        assert_eq!(heuristic.total_cost(), 21.0);
        assert_eq!(exhaustive.total_cost(), 19.0);
    }

    #[test]
    fn test_hybrid_below_threshold_matches_exhaustive() {
        let items = weighted(&[1; 7]);
        let hybrid = TreeBuilder::new(wrappable()).build(&items).unwrap();
        assert_eq!(hybrid.shape(), "[[1,1,1,1],1,1,1]");

        let forced_heuristic = TreeBuilder::new(wrappable())
            .exhaustive_threshold(0)
            .build(&items)
            .unwrap();
        assert_eq!(forced_heuristic.shape(), "[[1,1,1],[1,1],1,1]");
    }

    #[test]
    fn test_single_item_is_one_level_deep() {
        for strategy in [Strategy::Heuristic, Strategy::Exhaustive, Strategy::Hybrid] {
            let tree = TreeBuilder::new(wrappable())
                .strategy(strategy)
                .build(&weighted(&[9]))
                .unwrap();
            assert_eq!(tree.depth(), 1);
            assert_eq!(tree.shape(), "[9]");
        }
    }

    #[test]
    fn test_few_items_stay_flat() {
        for n in 2..=4 {
            let weights: Vec<u64> = (1..=n).collect();
            for strategy in [Strategy::Heuristic, Strategy::Exhaustive] {
                let tree = TreeBuilder::new(wrappable())
                    .strategy(strategy)
                    .build(&weighted(&weights))
                    .unwrap();
                assert_eq!(tree.depth(), 1, "{strategy:?} nested {n} items");
            }
        }
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(TreeBuilder::new(wrappable()).build(&[]), Err(TreeError::EmptyInput));

        let single_slot = CostVector::new(vec![1.0]).unwrap();
        assert!(matches!(
            TreeBuilder::new(single_slot.clone()).build(&weighted(&[1, 1])),
            Err(TreeError::InvalidBranchingFactor { branching_factor: 1, .. })
        ));
        assert!(TreeBuilder::new(single_slot).build(&weighted(&[1])).is_ok());

        let mut items = weighted(&[1, 2, 3]);
        items[1].weight = 0;
        assert!(matches!(
            TreeBuilder::new(wrappable()).build(&items),
            Err(TreeError::InvalidWeight { ref label, .. }) if label == "item001"
        ));
    }

    #[test]
    fn test_total_weight_overflow_is_rejected() {
        let items = vec![Item::new("a", u64::MAX), Item::new("b", 1), Item::new("c", 1)];
        for strategy in [Strategy::Heuristic, Strategy::Exhaustive, Strategy::Hybrid] {
            assert!(matches!(
                TreeBuilder::new(wrappable()).strategy(strategy).build(&items),
                Err(TreeError::InvalidWeight { ref label, .. }) if label == "b"
            ));
        }
        let fits = vec![Item::new("a", u64::MAX - 1), Item::new("b", 1)];
        assert!(validate(&fits, &wrappable()).is_ok());
    }

    #[test]
    fn test_only_large_exhaustive_builds_exceed_budget() {
        let exhaustive = TreeBuilder::new(wrappable()).strategy(Strategy::Exhaustive);
        assert!(!exhaustive.exceeds_exhaustive_budget(EXHAUSTIVE_WARN_ITEMS - 1));
        assert!(exhaustive.exceeds_exhaustive_budget(EXHAUSTIVE_WARN_ITEMS));
        assert!(!TreeBuilder::new(wrappable()).exceeds_exhaustive_budget(50_000));
    }

    #[test]
    fn test_build_tree_uses_hybrid_defaults() {
        let items = weighted(&[5, 1, 1, 8, 2, 2, 9, 1, 3]);
        assert_eq!(
            build_tree(&items, &wrappable()).unwrap(),
            TreeBuilder::new(wrappable()).build(&items).unwrap()
        );
    }

    #[test]
    fn test_parallel_and_sequential_builds_agree() {
        let weights: Vec<u64> = (0..2000u64).map(|i| 1 + (i * 7919) % 23).collect();
        let items = weighted(&weights);
        let parallel = TreeBuilder::new(wrappable()).build(&items).unwrap();
        let sequential = TreeBuilder::new(wrappable()).parallel(false).build(&items).unwrap();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.leaves().len(), 2000);
        assert!(parallel.is_well_formed());
    }
}
