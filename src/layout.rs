//! # Layout Plan
//!
//! Translates a [`Tree`] into the directory layout an external script turns
//! into symlinks. Every internal node below the root becomes a directory named
//! after the first and last entries it contains, e.g. `Abba-Beatles`; every
//! leaf becomes an entry inside its parent's directory.
//!
//! Nothing here touches the filesystem.

use crate::tree::{Node, Tree};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default number of characters taken from each label for branch names.
pub const DEFAULT_SHORTCUT_LEN: usize = 10;

/// Where one item ends up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    /// Directory relative to the layout root; empty for top-level entries.
    pub directory: PathBuf,
    pub label: String,
}

impl fmt::Display for PlanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.directory.join(&self.label).display())
    }
}

/// Directory name for an internal node: `{first}-{last}`, each shortened to
/// `shortcut_len` characters.
#[must_use]
pub fn branch_name(node: &Node, shortcut_len: usize) -> String {
    let shorten = |label: Option<&str>| label.unwrap_or_default().chars().take(shortcut_len).collect::<String>();
    format!(
        "{}-{}",
        shorten(node.first_leaf().map(|i| i.label.as_str())),
        shorten(node.last_leaf().map(|i| i.label.as_str()))
    )
}

/// One entry per leaf, in leaf order.
#[must_use]
pub fn plan(tree: &Tree, shortcut_len: usize) -> Vec<PlanEntry> {
    let mut entries = Vec::with_capacity(tree.root().leaf_count());
    plan_into(tree.root(), Path::new(""), shortcut_len, &mut entries);
    entries
}

fn plan_into(node: &Node, directory: &Path, shortcut_len: usize, out: &mut Vec<PlanEntry>) {
    // Sibling branches with identical shortened names get a numeric suffix.
    let mut taken: HashMap<String, usize> = HashMap::new();
    for child in node.children() {
        match child {
            Node::Leaf(item) => out.push(PlanEntry {
                directory: directory.to_path_buf(),
                label: item.label.clone(),
            }),
            Node::Internal(_) => {
                let base = branch_name(child, shortcut_len);
                let seen = taken.entry(base.clone()).or_insert(0);
                *seen += 1;
                let name = match *seen {
                    1 => base,
                    n => format!("{base} ({n})"),
                };
                plan_into(child, &directory.join(name), shortcut_len, out);
            }
        }
    }
}
