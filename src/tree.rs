//! # Navigation Tree
//!
//! The output of every builder: an ordered tree whose leaves are exactly the
//! input items, in input order. Internal nodes hold 1..=B children; child `k`
//! of any node sits in slot `k` and costs `costs[k]` to select.
//!
//! The root is always an internal node, so a single item becomes a one-level
//! tree rather than a bare leaf.

use crate::cost::CostVector;
use crate::item::Item;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

/// A node of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    /// Exactly one item, no children.
    Leaf(Item),
    /// Ordered children, no item of its own.
    Internal(Vec<Node>),
}

impl Node {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Children of an internal node; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Leaf(_) => &[],
            Self::Internal(children) => children,
        }
    }

    /// Items below this node, in order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Item> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Item>) {
        match self {
            Self::Leaf(item) => out.push(item),
            Self::Internal(children) => children.iter().for_each(|c| c.collect_leaves(out)),
        }
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Internal(children) => children.iter().map(Node::leaf_count).sum(),
        }
    }

    #[must_use]
    pub fn weight(&self) -> u64 {
        match self {
            Self::Leaf(item) => item.weight,
            Self::Internal(children) => children.iter().map(Node::weight).sum(),
        }
    }

    #[must_use]
    pub fn first_leaf(&self) -> Option<&Item> {
        match self {
            Self::Leaf(item) => Some(item),
            Self::Internal(children) => children.first().and_then(Node::first_leaf),
        }
    }

    #[must_use]
    pub fn last_leaf(&self) -> Option<&Item> {
        match self {
            Self::Leaf(item) => Some(item),
            Self::Internal(children) => children.last().and_then(Node::last_leaf),
        }
    }

    /// Number of levels below this node. A leaf has height 0.
    #[must_use]
    pub fn height(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Internal(children) => {
                1 + children.iter().map(Node::height).max().unwrap_or(0)
            }
        }
    }

    /// Cost of every leaf below this node, measured from this node.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn subtree_cost(&self, costs: &CostVector) -> f64 {
        self.children()
            .iter()
            .enumerate()
            .map(|(slot, child)| {
                costs.slot(slot) * child.weight() as f64 + child.subtree_cost(costs)
            })
            .sum()
    }

    /// Compact weight-only rendering, e.g. `[[1,1,1],[1,1],1,1]`.
    #[must_use]
    pub fn shape(&self) -> String {
        match self {
            Self::Leaf(item) => item.weight.to_string(),
            Self::Internal(children) => {
                let inner: Vec<String> = children.iter().map(Node::shape).collect();
                format!("[{}]", inner.join(","))
            }
        }
    }
}

/// A complete tree together with the costs it was built for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tree {
    root: Node,
    costs: CostVector,
}

impl Tree {
    /// Wrap a root node. Callers guarantee the root is internal and respects
    /// the branching factor of `costs`.
    pub(crate) fn new(root: Node, costs: CostVector) -> Self {
        debug_assert!(!root.is_leaf(), "tree root must be an internal node");
        Self { root, costs }
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub fn costs(&self) -> &CostVector {
        &self.costs
    }

    #[must_use]
    pub fn branching_factor(&self) -> usize {
        self.costs.len()
    }

    #[must_use]
    pub fn leaves(&self) -> Vec<&Item> {
        self.root.leaves()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.height()
    }

    /// `Σ weight(leaf) × cost(path to leaf)`.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.root.subtree_cost(&self.costs)
    }

    /// Total cost divided by total weight.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_cost(&self) -> f64 {
        match self.root.weight() {
            0 => 0.0,
            weight => self.total_cost() / weight as f64,
        }
    }

    #[must_use]
    pub fn shape(&self) -> String {
        self.root.shape()
    }

    /// Checks the structural invariants: every internal node has between one
    /// and B children.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        fn check(node: &Node, max: usize) -> bool {
            match node {
                Node::Leaf(_) => true,
                Node::Internal(children) => {
                    (1..=max).contains(&children.len()) && children.iter().all(|c| check(c, max))
                }
            }
        }
        check(&self.root, self.branching_factor())
    }

    /// Indented listing with the access cost of every leaf.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&self.root, 0, 0.0, &mut out);
        out
    }

    fn render_into(&self, node: &Node, depth: usize, path_cost: f64, out: &mut String) {
        for (slot, child) in node.children().iter().enumerate() {
            let cost = path_cost + self.costs.slot(slot);
            let indent = "  ".repeat(depth);
            match child {
                Node::Leaf(item) => {
                    let _ = writeln!(out, "{indent}{} (weight {}, cost {cost})", item.label, item.weight);
                }
                Node::Internal(_) => {
                    let first = child.first_leaf().map_or("", |i| i.label.as_str());
                    let last = child.last_leaf().map_or("", |i| i.label.as_str());
                    let _ = writeln!(out, "{indent}[{first} .. {last}] ({} items)", child.leaf_count());
                    self.render_into(child, depth + 1, cost, out);
                }
            }
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(label: &str, weight: u64) -> Node {
        Node::Leaf(Item::new(label, weight))
    }

    fn sample() -> Tree {
        let root = Node::Internal(vec![
            Node::Internal(vec![leaf("a", 1), leaf("b", 1), leaf("c", 1), leaf("d", 1)]),
            leaf("e", 1),
            leaf("f", 1),
            leaf("g", 1),
        ]);
        Tree::new(root, CostVector::new(vec![1.0, 2.0, 3.0, 2.0]).unwrap())
    }

    #[test]
    fn test_cost_of_known_tree() {
        let tree = sample();
        assert_eq!(tree.total_cost(), 19.0);
        assert!((tree.average_cost() - 19.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_shape_and_depth() {
        let tree = sample();
        assert_eq!(tree.shape(), "[[1,1,1,1],1,1,1]");
        assert_eq!(tree.depth(), 2);
        assert!(tree.is_well_formed());
    }

    #[test]
    fn test_leaves_keep_order() {
        let tree = sample();
        let labels: Vec<&str> = tree.leaves().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c", "d", "e", "f", "g"]);
    }

    #[test]
    fn test_single_leaf_root_costs_first_slot() {
        let tree = Tree::new(
            Node::Internal(vec![leaf("solo", 5)]),
            CostVector::new(vec![2.0, 1.0]).unwrap(),
        );
        assert_eq!(tree.total_cost(), 10.0);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_render_lists_groups_and_costs() {
        let text = sample().render();
        assert!(text.contains("[a .. d] (4 items)"));
        assert!(text.contains("  a (weight 1, cost 2)"));
        assert!(text.contains("f (weight 1, cost 3)"));
    }

    #[test]
    fn test_overfull_node_is_not_well_formed() {
        let root = Node::Internal(vec![leaf("a", 1), leaf("b", 1), leaf("c", 1)]);
        let tree = Tree::new(root, CostVector::new(vec![1.0, 1.0]).unwrap());
        assert!(!tree.is_well_formed());
    }

    #[test]
    fn test_json_output_names_node_kinds() {
        let json = serde_json::to_string(sample().root()).unwrap();
        assert!(json.starts_with("{\"internal\":[{\"internal\""));
        assert!(json.contains("{\"leaf\":{\"label\":\"e\",\"weight\":1}}"));
    }
}
