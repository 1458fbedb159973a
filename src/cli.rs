//! # Command-Line Interface Module
//!
//! Defines the `navtree` command line with Clap derive macros and merges the
//! parsed flags over the file configuration.
//!
//! ## Commands
//!
//! - `build`: Build the navigation tree and print it as text, JSON or a layout plan
//! - `report`: Compare heuristic, hybrid and exhaustive costs for the same input
//! - `costs`: Show a cost vector and the target shares derived from it
//! - `completion`: Generate shell completions
//!
//! ## Examples
//!
//! ```bash
//! navtree build --dir /media/music --weights ~/custom-weights.json
//! navtree build --items albums.json -b 6 --profile linear --format json
//! navtree report --dir /media/music
//! navtree costs -b 8
//! ```

use crate::builder::Strategy;
use crate::catalog;
use crate::config::BuildConfig;
use crate::cost::AccessProfile;
use crate::item::Item;
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use log::info;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// How `build` prints the finished tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented outline with weights and access costs
    #[default]
    Text,
    /// The tree as JSON
    Json,
    /// One `directory/label` line per item
    Plan,
}

/// Main application arguments structure.
#[derive(Parser)]
#[command(name = "navtree")]
#[command(about = "navtree: weighted navigation trees for step-through media devices")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Build the navigation tree for a music directory or item file
    ///
    /// Entries are kept in device order. Heavier entries end up closer to
    /// the root and on cheaper positions within their directory.
    Build {
        #[command(flatten)]
        build: BuildArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Compare the cost of each build strategy on the same input
    ///
    /// The exhaustive search only runs when the input is smaller than the
    /// exhaustive threshold.
    Report {
        #[command(flatten)]
        build: BuildArgs,
    },

    /// Show per-slot costs and the target shares derived from them
    Costs {
        /// Number of entries per directory [default: 4, or the number of --costs]
        #[arg(short, long)]
        branching_factor: Option<usize>,

        /// Access profile
        #[arg(long, value_enum, default_value_t = AccessProfile::Wrappable)]
        profile: AccessProfile,

        /// Explicit per-slot costs, overriding the profile
        #[arg(long, value_delimiter = ',')]
        costs: Option<Vec<f64>>,
    },

    /// Generate shell completions
    ///
    /// Outputs completion script for the specified shell to stdout.
    /// Redirect to appropriate file for your shell.
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Input and tuning flags shared by `build` and `report`. Flags that are
/// given override the configuration file.
#[derive(ClapArgs, Debug, Default)]
pub struct BuildArgs {
    /// Music directory; one item per entry
    #[arg(long, value_hint = clap::ValueHint::DirPath, required_unless_present = "items", conflicts_with = "items")]
    pub dir: Option<PathBuf>,

    /// JSON array of {"label", "weight"} objects, used in file order
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub items: Option<PathBuf>,

    /// JSON object of label to weight overrides for --dir
    #[arg(long, value_hint = clap::ValueHint::FilePath, requires = "dir", conflicts_with = "items")]
    pub weights: Option<PathBuf>,

    /// Number of entries per directory
    #[arg(short, long)]
    pub branching_factor: Option<usize>,

    /// Access profile used to derive per-slot costs
    #[arg(long, value_enum)]
    pub profile: Option<AccessProfile>,

    /// Explicit comma-separated per-slot costs
    #[arg(long, value_delimiter = ',')]
    pub costs: Option<Vec<f64>>,

    /// Partitioning strategy
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Ranges with fewer items are searched exhaustively
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Build on the calling thread only
    #[arg(long)]
    pub no_parallel: bool,

    /// Configuration file instead of the default location
    #[arg(long, env = "NAVTREE_CONFIG", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

impl BuildArgs {
    /// Load the configuration file and apply the flags on top of it.
    pub fn resolve_config(&self) -> Result<BuildConfig> {
        let mut config = BuildConfig::load(self.config.as_deref())?;
        self.apply_to(&mut config);
        Ok(config)
    }

    /// Overwrite every setting a flag was given for.
    pub fn apply_to(&self, config: &mut BuildConfig) {
        if let Some(branching_factor) = self.branching_factor {
            config.branching_factor = branching_factor;
            // File costs were sized for the file's branching factor.
            if self.costs.is_none() && self.profile.is_none() {
                config.costs = None;
            }
        }
        if let Some(profile) = self.profile {
            config.profile = profile;
            config.costs = None;
        }
        if let Some(costs) = &self.costs {
            config.costs = Some(costs.clone());
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(threshold) = self.threshold {
            config.exhaustive_threshold = threshold;
        }
        if self.no_parallel {
            config.parallel = false;
        }
    }

    /// Read the ordered item list from `--items` or `--dir`.
    pub fn load_items(&self, config: &BuildConfig) -> Result<Vec<Item>> {
        if let Some(path) = &self.items {
            let items = catalog::load_item_file(path)?;
            info!("Loaded {} items from {}", items.len(), path.display());
            return Ok(items);
        }

        let dir = self
            .dir
            .as_ref()
            .context("Either --dir or --items is required")?;
        let labels = catalog::list_folder(dir)?;
        let overrides = match &self.weights {
            Some(path) => catalog::load_weight_overrides(path)?,
            None => BTreeMap::new(),
        };
        info!(
            "Found {} entries in {} ({} weight overrides)",
            labels.len(),
            dir.display(),
            overrides.len()
        );
        Ok(catalog::apply_weights(labels, &overrides, config.default_weight))
    }
}

/// Settings for the `costs` command. Without `-b`, explicit costs define
/// the branching factor.
#[must_use]
pub fn costs_config(branching_factor: Option<usize>, profile: AccessProfile, costs: Option<Vec<f64>>) -> BuildConfig {
    let branching_factor = branching_factor
        .or_else(|| costs.as_ref().map(Vec::len))
        .unwrap_or_else(|| BuildConfig::default().branching_factor);
    BuildConfig {
        branching_factor,
        profile,
        costs,
        ..BuildConfig::default()
    }
}
