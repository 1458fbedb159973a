//! # Configuration Module
//!
//! Build settings for the nightly rebuild. Settings are read from a JSON file
//! and every field is optional:
//!
//! ```json
//! {
//!   "branching_factor": 4,
//!   "profile": "wrappable",
//!   "strategy": "hybrid",
//!   "exhaustive_threshold": 40
//! }
//! ```
//!
//! ## Locations
//!
//! Without an explicit `--config`, the platform configuration directory is
//! consulted:
//! - Linux: `~/.config/navtree/config.json`
//! - macOS: `~/Library/Application Support/navtree/config.json`
//! - Windows: `%APPDATA%\navtree\config.json`
//!
//! A missing default file means defaults; a missing explicit file is an error.

use crate::builder::{Strategy, TreeBuilder, DEFAULT_EXHAUSTIVE_THRESHOLD};
use crate::cost::{AccessProfile, CostVector};
use crate::layout::DEFAULT_SHORTCUT_LEN;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings that shape the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Maximum number of entries per directory.
    pub branching_factor: usize,
    /// Cost structure used when `costs` is not given.
    pub profile: AccessProfile,
    /// Explicit per-slot costs; must have `branching_factor` entries.
    pub costs: Option<Vec<f64>>,
    pub strategy: Strategy,
    /// Ranges with fewer items are searched exhaustively (hybrid strategy).
    pub exhaustive_threshold: usize,
    /// Build sibling subtrees on the rayon pool.
    pub parallel: bool,
    /// Characters taken from each label for branch directory names.
    pub shortcut_len: usize,
    /// Weight for entries without an override.
    pub default_weight: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            branching_factor: 4,
            profile: AccessProfile::Wrappable,
            costs: None,
            strategy: Strategy::Hybrid,
            exhaustive_threshold: DEFAULT_EXHAUSTIVE_THRESHOLD,
            parallel: true,
            shortcut_len: DEFAULT_SHORTCUT_LEN,
            default_weight: 1,
        }
    }
}

impl BuildConfig {
    /// Read settings from `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Read `explicit` if given, else the default location if it exists,
    /// else return defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// The validated cost vector these settings describe.
    pub fn cost_vector(&self) -> Result<CostVector> {
        let costs = match &self.costs {
            Some(costs) => CostVector::with_branching_factor(costs.clone(), self.branching_factor),
            None if self.branching_factor == 0 => CostVector::with_branching_factor(Vec::new(), 0),
            None => CostVector::from_profile(self.profile, self.branching_factor),
        };
        costs.context("Invalid cost configuration")
    }

    /// A builder configured from these settings.
    pub fn builder(&self) -> Result<TreeBuilder> {
        Ok(TreeBuilder::new(self.cost_vector()?)
            .strategy(self.strategy)
            .exhaustive_threshold(self.exhaustive_threshold)
            .parallel(self.parallel))
    }
}

/// Platform default location of the config file, if a config directory
/// exists on this system.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("navtree").join("config.json"))
}
