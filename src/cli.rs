use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Heatdays extreme-heat exposure pipeline.
#[derive(Parser)]
#[command(
    name = "heatdays",
    version,
    about = "Population-weighted extreme-heat exposure from climate projections"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// List the (model, scenario, year) tasks covered by a directory of projection files.
    Plan(PlanArgs),
    /// Reduce per-model regional values to ensemble statistics.
    Summarize(SummarizeArgs),
}

/// Arguments for the `plan` subcommand.
#[derive(clap::Args)]
pub struct PlanArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "heatdays.toml")]
    pub config: PathBuf,

    /// Directory holding CMIP6 projection files.
    #[arg(short, long)]
    pub models_dir: PathBuf,

    /// Path for the task plan JSON (stdout if omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `summarize` subcommand.
#[derive(clap::Args)]
pub struct SummarizeArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "heatdays.toml")]
    pub config: PathBuf,

    /// JSON file of per-model regional values.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path for the ensemble table JSON.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
