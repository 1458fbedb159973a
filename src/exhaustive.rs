//! # Exhaustive Search
//!
//! Finds the exact minimum of `Σ weight(leaf) × cost(path to leaf)` over all
//! order-preserving trees with at most B children per node.
//!
//! A subtree's cost depends only on the range it covers, so every range is
//! solved once. For a fixed range end `e`, a suffix table `g(slot, p)` holds
//! the cheapest way to cover `p..e` with groups placed in `slot, slot+1, …`.
//! A range `s..e` is then one leading group in slot 0 followed by a suffix
//! from slot 1, which covers every cut sequence without enumerating them.
//! Work is O(B·n³), memory O(B·n²).
//!
//! ## Tie-break
//!
//! Costs within a relative tolerance of `1e-9` are equal. Among equally cheap
//! partitions of a range the search prefers:
//!
//! 1. more children at that node (broader, shallower trees), then
//! 2. the earliest cut positions (shorter leading groups).
//!
//! The rule is applied identically on every run, so the same input always
//! yields the same tree.

use crate::cost::CostVector;
use crate::item::Item;
use log::debug;
use std::ops::Range;
use std::time::Instant;

const TOLERANCE: f64 = 1e-9;

/// `a` is cheaper than `b` beyond floating point noise.
fn cheaper(a: f64, b: f64) -> bool {
    a < b - TOLERANCE * 1f64.max(a.abs()).max(b.abs())
}

/// One entry of the suffix table.
#[derive(Debug, Clone, Copy)]
struct Step {
    cost: f64,
    children: usize,
    /// End of the group that starts this suffix.
    next: usize,
}

impl Step {
    fn beats(&self, best: Option<&Step>) -> bool {
        match best {
            None => true,
            Some(best) => {
                cheaper(self.cost, best.cost)
                    || (!cheaper(best.cost, self.cost) && self.children > best.children)
            }
        }
    }
}

/// Solved optimum for every sub-range of a weight sequence.
#[derive(Debug, Clone)]
pub struct ExhaustiveSearch {
    len: usize,
    /// `cost[s * (len + 1) + e]`: optimal cost of the subtree for `s..e`.
    cost: Vec<f64>,
    /// Group boundaries of the optimal split of `s..e`, excluding `s`.
    bounds: Vec<Vec<usize>>,
}

impl ExhaustiveSearch {
    /// Solve every range of `weights`. `costs` must hold at least two slots
    /// whenever `weights` holds more than one item, and the weights must sum
    /// to at most `u64::MAX`; [`crate::builder::validate`] checks both.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(weights: &[u64], costs: &CostVector) -> Self {
        debug_assert!(
            weights.len() < 2 || costs.len() >= 2,
            "{} items cannot be split with {} slot(s)",
            weights.len(),
            costs.len()
        );
        let started = Instant::now();
        let len = weights.len();
        let slots = costs.len();
        let stride = len + 1;

        let mut prefix = Vec::with_capacity(stride);
        prefix.push(0u64);
        for &w in weights {
            prefix.push(prefix[prefix.len() - 1] + w);
        }
        let weight = |s: usize, e: usize| (prefix[e] - prefix[s]) as f64;

        let mut cost = vec![0.0; stride * stride];
        let mut bounds = vec![Vec::new(); stride * stride];
        let mut evaluated = 0usize;

        for end in 1..=len {
            // suffix[slot * stride + p] for ranges p..end
            let mut suffix: Vec<Option<Step>> = vec![None; slots * stride];

            for start in (0..end).rev() {
                if end - start >= 2 {
                    let mut best: Option<Step> = None;
                    for cut in start + 1..end {
                        let Some(rest) = suffix.get(stride + cut).copied().flatten() else {
                            continue;
                        };
                        evaluated += 1;
                        let candidate = Step {
                            cost: costs.slot(0) * weight(start, cut)
                                + cost[start * stride + cut]
                                + rest.cost,
                            children: 1 + rest.children,
                            next: cut,
                        };
                        if candidate.beats(best.as_ref()) {
                            best = Some(candidate);
                        }
                    }
                    if let Some(best) = best {
                        cost[start * stride + end] = best.cost;
                        let mut cuts = vec![best.next];
                        let (mut slot, mut at) = (1, best.next);
                        while at < end {
                            let Some(step) = suffix.get(slot * stride + at).copied().flatten() else {
                                break;
                            };
                            cuts.push(step.next);
                            at = step.next;
                            slot += 1;
                        }
                        bounds[start * stride + end] = cuts;
                    }
                }

                // Slot 0 only ever starts a range, so its suffixes are unused.
                for slot in (1..slots).rev() {
                    let mut best: Option<Step> = None;
                    for cut in start + 1..=end {
                        if cut < end && slot + 1 >= slots {
                            continue;
                        }
                        let head = costs.slot(slot) * weight(start, cut) + cost[start * stride + cut];
                        let candidate = if cut == end {
                            Step { cost: head, children: 1, next: cut }
                        } else {
                            let Some(rest) = suffix[(slot + 1) * stride + cut] else {
                                continue;
                            };
                            Step {
                                cost: head + rest.cost,
                                children: 1 + rest.children,
                                next: cut,
                            }
                        };
                        evaluated += 1;
                        if candidate.beats(best.as_ref()) {
                            best = Some(candidate);
                        }
                    }
                    suffix[slot * stride + start] = best;
                }
            }
        }

        debug!(
            "Exhaustive search over {len} items with {slots} slots: {evaluated} candidates in {:?}",
            started.elapsed()
        );
        Self { len, cost, bounds }
    }

    /// Number of items the search covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Optimal subtree cost for `range`, excluding the cost of reaching the
    /// subtree itself. Single items cost nothing.
    #[must_use]
    pub fn cost(&self, range: Range<usize>) -> f64 {
        self.cost[range.start * (self.len + 1) + range.end]
    }

    /// Optimal split of `range` into contiguous groups. Ranges of one item
    /// are returned unchanged.
    #[must_use]
    pub fn split(&self, range: Range<usize>) -> Vec<Range<usize>> {
        if range.len() < 2 {
            return vec![range];
        }
        let cuts = &self.bounds[range.start * (self.len + 1) + range.end];
        let mut start = range.start;
        cuts.iter()
            .map(|&end| {
                let group = start..end;
                start = end;
                group
            })
            .collect()
    }
}

/// Exact top-level split of `range` within `items`.
///
/// Solves only the sub-ranges of `range`; the returned ranges are absolute.
#[must_use]
pub fn optimal_partition(items: &[Item], range: Range<usize>, costs: &CostVector) -> Vec<Range<usize>> {
    let weights: Vec<u64> = items[range.clone()].iter().map(|item| item.weight).collect();
    let search = ExhaustiveSearch::new(&weights, costs);
    search
        .split(0..weights.len())
        .into_iter()
        .map(|r| r.start + range.start..r.end + range.start)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::AccessProfile;

    fn costs(values: &[f64]) -> CostVector {
        CostVector::new(values.to_vec()).unwrap()
    }

    #[test]
    fn test_seven_equal_items_find_true_optimum() {
        let search = ExhaustiveSearch::new(&[1; 7], &costs(&[1.0, 2.0, 3.0, 2.0]));
        assert_eq!(search.cost(0..7), 19.0);
        assert_eq!(search.split(0..7), vec![0..4, 4..5, 5..6, 6..7]);
        assert_eq!(search.split(0..4), vec![0..1, 1..2, 2..3, 3..4]);
    }

    #[test]
    fn test_pair_costs_both_slots() {
        let search = ExhaustiveSearch::new(&[3, 5], &costs(&[1.0, 2.0]));
        assert_eq!(search.cost(0..2), 13.0);
        assert_eq!(search.cost(0..1), 0.0);
    }

    #[test]
    fn test_heavy_tail_is_spread() {
        let weights = [1, 1, 1, 1, 1, 1, 1, 9247];
        let search = ExhaustiveSearch::new(&weights, &CostVector::from_profile(AccessProfile::Constant, 4).unwrap());
        assert_eq!(search.cost(0..8), 9260.0);
        assert_eq!(search.split(0..8).len(), 4);
    }

    #[test]
    fn test_cheap_later_slot_can_beat_flat_listing() {
        // Two heavy items and a light one with a very expensive third slot.
        let search = ExhaustiveSearch::new(&[1, 1000, 1000], &costs(&[1.0, 5.0, 100.0, 100.0]));
        assert_eq!(search.split(0..3), vec![0..2, 2..3]);
        assert_eq!(search.cost(0..3), 11002.0);
    }

    #[test]
    fn test_flat_listing_wins_when_strictly_cheaper() {
        let search = ExhaustiveSearch::new(&[1, 1, 1], &costs(&[1.0, 1.0, 1.0]));
        assert_eq!(search.split(0..3).len(), 3);
    }

    #[test]
    fn test_ties_prefer_more_children() {
        // [0..1, 1..4, 4..5] also costs 11 and cuts earlier, but has only
        // three children.
        let search = ExhaustiveSearch::new(&[1, 1, 2, 1, 2], &costs(&[1.0, 1.0, 1.0, 2.0]));
        assert_eq!(search.cost(0..5), 11.0);
        assert_eq!(search.split(0..5), vec![0..2, 2..3, 3..4, 4..5]);
    }

    #[test]
    fn test_equal_ties_prefer_earliest_cuts() {
        // [[1,1],1,1,1] costs 7 as well.
        let search = ExhaustiveSearch::new(&[1; 5], &CostVector::from_profile(AccessProfile::Constant, 4).unwrap());
        assert_eq!(search.cost(0..5), 7.0);
        assert_eq!(search.split(0..5), vec![0..1, 1..2, 2..3, 3..5]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "cannot be split")]
    fn test_single_slot_cannot_split_several_items() {
        let _ = ExhaustiveSearch::new(&[1, 1], &costs(&[1.0]));
    }

    #[test]
    fn test_optimal_partition_offsets_ranges() {
        let items: Vec<Item> = (0..10).map(|i| Item::new(format!("{i}"), 1)).collect();
        let parts = optimal_partition(&items, 3..10, &costs(&[1.0, 2.0, 3.0, 2.0]));
        assert_eq!(parts, vec![3..7, 7..8, 8..9, 9..10]);
    }

    #[test]
    fn test_repeated_searches_agree() {
        let weights = [4, 1, 1, 7, 2, 2, 9, 1, 3, 3, 3, 5];
        let c = costs(&[1.0, 2.0, 3.0, 2.0]);
        let first = ExhaustiveSearch::new(&weights, &c);
        let second = ExhaustiveSearch::new(&weights, &c);
        for s in 0..weights.len() {
            for e in s + 1..=weights.len() {
                assert_eq!(first.split(s..e), second.split(s..e));
            }
        }
    }
}
