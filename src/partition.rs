//! # Heuristic Partitioner
//!
//! Splits an ordered run of weights into at most B contiguous groups whose
//! sizes follow the cost model's target shares.
//!
//! ## Cut placement
//!
//! For every share except the last, the remaining weights are accumulated and
//! normalized to the remaining total. The boundary is placed at the first item
//! whose normalized cumulative weight reaches the (rescaled) share, then
//! rounded to the nearest side: the item stays in the group unless its
//! overshoot is at least the undershoot of leaving it out. Floor or ceiling
//! rounding mis-splits near-degenerate inputs such as `[ε,ε,w,ε,ε]`.
//!
//! After each cut the remaining shares are rescaled to sum to one over the
//! remaining weight, so groups already placed do not bias later cuts.
//!
//! While items outnumber the slots still to be filled, a group never takes so
//! many items that a later slot would be left empty. Without this a heavy
//! final item swallows the whole range: `[ε,…,ε,w]` would become `[[ε,…],w]`.
//!
//! ## Known limitation
//!
//! The result is not globally optimal. Seven equal weights with costs
//! `[1,2,3,2]` produce `[[1,1,1],[1,1],1,1]` (cost 21) whereas
//! `[[1,1,1,1],1,1,1]` costs 19. Whether round-to-nearest is sufficient for
//! optimality in some restricted class of inputs is an open question.

use crate::item::Item;
use log::trace;
use std::ops::Range;

/// Positions at which `weights` is cut, relative to the slice start.
///
/// Returns at most `shares.len() - 1` strictly increasing positions, each in
/// `1..weights.len()`. An empty result means the run stays in one group.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn split_positions(weights: &[u64], shares: &[f64]) -> Vec<usize> {
    let len = weights.len();
    let mut positions = Vec::with_capacity(shares.len().saturating_sub(1));
    if len < 2 || shares.len() < 2 {
        return positions;
    }

    let mut base = 0;
    let mut rescale = 1.0;
    let slots = shares.len();

    // The last share is implied: whatever remains forms the final group.
    for (slot, &share) in shares[..slots - 1].iter().enumerate() {
        let remaining = &weights[base..];
        let remaining_total: u64 = remaining.iter().sum();
        let mut running = 0u64;
        let cumulative: Vec<f64> = remaining
            .iter()
            .map(|&w| {
                running += w;
                running as f64 / remaining_total as f64
            })
            .collect();

        let target = share / rescale;
        rescale *= 1.0 - target;

        let candidate = cumulative
            .iter()
            .position(|&c| c >= target)
            .unwrap_or(cumulative.len() - 1);
        let mut cut = if candidate == 0 {
            1
        } else if target - cumulative[candidate - 1] < cumulative[candidate] - target {
            candidate
        } else {
            candidate + 1
        };

        let slots_after = slots - 1 - slot;
        if remaining.len() > slots_after {
            cut = cut.min(remaining.len() - slots_after);
        }
        trace!(
            "slot {slot}: target {target:.6}, candidate {candidate}, cut {cut} of {}",
            remaining.len()
        );

        if cut >= remaining.len() {
            break;
        }
        base += cut;
        positions.push(base);
    }

    positions
}

/// Heuristic split of `range` within `items` into contiguous sub-ranges.
///
/// A range of at most `shares.len()` items is split into single items. The
/// returned ranges are non-empty and cover `range` exactly, in order.
#[must_use]
pub fn partition(items: &[Item], range: Range<usize>, shares: &[f64]) -> Vec<Range<usize>> {
    let slice = &items[range.clone()];
    if slice.len() <= shares.len() {
        return range.map(|i| i..i + 1).collect();
    }

    let weights: Vec<u64> = slice.iter().map(|item| item.weight).collect();
    let cuts = split_positions(&weights, shares);
    ranges_from_cuts(range, &cuts)
}

/// Turn relative cut positions into absolute sub-ranges of `range`.
#[must_use]
pub fn ranges_from_cuts(range: Range<usize>, cuts: &[usize]) -> Vec<Range<usize>> {
    let start = range.start;
    let bounds: Vec<usize> = std::iter::once(start)
        .chain(cuts.iter().map(|c| start + c))
        .chain(std::iter::once(range.end))
        .collect();
    bounds
        .windows(2)
        .filter(|w| w[0] < w[1])
        .map(|w| w[0]..w[1])
        .collect()
}
