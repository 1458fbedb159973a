//! # navtree
//!
//! Builds weighted, order-preserving navigation trees for devices that can
//! only step through a directory one entry at a time.
//!
//! ## Usage
//!
//! ```bash
//! # Tree for a music directory with custom weights
//! navtree build --dir /media/music --weights ~/custom-weights.json
//!
//! # Directory layout as one path per line
//! navtree build --dir /media/music --format plan
//!
//! # How far is the heuristic from the optimum?
//! navtree report --items albums.json
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use navtree::builder::Strategy;
use navtree::cli::{self, BuildArgs, OutputFormat};
use navtree::completion;
use navtree::cost::AccessProfile;
use navtree::item::total_weight;
use navtree::layout;

/// Main entry point for navtree.
///
/// Initializes logging, then parses the arguments and routes the command.
/// Logging is controlled via `RUST_LOG`, e.g. `RUST_LOG=debug navtree build ...`.
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Build { build, format } => run_build(&build, format)?,
        cli::Command::Report { build } => run_report(&build)?,
        cli::Command::Costs {
            branching_factor,
            profile,
            costs,
        } => run_costs(branching_factor, profile, costs)?,
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        }
    }

    Ok(())
}

fn run_build(build: &BuildArgs, format: OutputFormat) -> Result<()> {
    let config = build.resolve_config()?;
    debug!("Effective configuration: {config:?}");
    let items = build.load_items(&config)?;
    let tree = config.builder()?.build(&items).context("Failed to build navigation tree")?;

    info!(
        "Built tree of depth {} for {} items: total cost {}, average cost {:.3}",
        tree.depth(),
        items.len(),
        tree.total_cost(),
        tree.average_cost()
    );

    match format {
        OutputFormat::Text => print!("{}", tree.render()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
        OutputFormat::Plan => {
            for entry in layout::plan(&tree, config.shortcut_len) {
                println!("{entry}");
            }
        }
    }
    Ok(())
}

fn run_report(build: &BuildArgs) -> Result<()> {
    let config = build.resolve_config()?;
    let items = build.load_items(&config)?;
    let builder = config.builder()?;

    println!(
        "{} items, total weight {}, costs {:?}",
        items.len(),
        total_weight(&items),
        builder.costs().as_slice()
    );
    for strategy in [Strategy::Heuristic, Strategy::Hybrid, Strategy::Exhaustive] {
        if strategy == Strategy::Exhaustive && items.len() >= config.exhaustive_threshold {
            println!(
                "{strategy:?}: skipped ({} items, threshold {})",
                items.len(),
                config.exhaustive_threshold
            );
            continue;
        }
        let tree = builder
            .clone()
            .strategy(strategy)
            .build(&items)
            .with_context(|| format!("Failed to build {strategy:?} tree"))?;
        println!(
            "{strategy:?}: total cost {}, average cost {:.3}, depth {}",
            tree.total_cost(),
            tree.average_cost(),
            tree.depth()
        );
    }
    Ok(())
}

fn run_costs(branching_factor: Option<usize>, profile: AccessProfile, costs: Option<Vec<f64>>) -> Result<()> {
    let costs = cli::costs_config(branching_factor, profile, costs).cost_vector()?;
    for (slot, (cost, share)) in costs.as_slice().iter().zip(costs.shares()).enumerate() {
        println!("slot {slot}: cost {cost}, share {share:.4}");
    }
    Ok(())
}
