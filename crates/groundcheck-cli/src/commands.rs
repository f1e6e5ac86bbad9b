//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use groundcheck::WaitPolicy;
use std::path::PathBuf;

/// Groundcheck: object-map driven acceptance tests for the ground control station
#[derive(Parser, Debug)]
#[command(name = "groundcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Harness configuration file (YAML)
    #[arg(long, global = true, env = "GROUNDCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the simulated GCS
    Run(RunArgs),

    /// List built-in scenarios
    List,

    /// Validate an object map against the initial GCS widget tree
    CheckMap(CheckMapArgs),

    /// Print the live widget tree of the simulated GCS
    Tree(TreeArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenario files to run (defaults to the built-in scenarios)
    pub files: Vec<PathBuf>,

    /// Run the built-in scenarios in addition to any files
    #[arg(long)]
    pub all: bool,

    /// How `wait` steps are executed
    #[arg(long)]
    pub policy: Option<PolicyArg>,

    /// Simulation seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Object lookup timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Object map file (defaults to the built-in map)
    #[arg(long)]
    pub map: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "text")]
    pub format: ReportFormat,

    /// Stop after the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,
}

/// Arguments for the check-map command
#[derive(Parser, Debug)]
pub struct CheckMapArgs {
    /// Object map file (defaults to the built-in map)
    #[arg(long)]
    pub map: Option<PathBuf>,
}

/// Arguments for the tree command
#[derive(Parser, Debug)]
pub struct TreeArgs {
    /// Run this built-in scenario first and print the tree it leaves behind
    #[arg(long)]
    pub after: Option<String>,
}

/// Wait policy argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
    /// Poll `until` conditions with a bounded timeout
    Poll,
    /// Pause for exactly the recorded duration
    Recorded,
}

impl From<PolicyArg> for WaitPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Poll => Self::Poll,
            PolicyArg::Recorded => Self::Recorded,
        }
    }
}

/// Report output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// One line per step
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
