//! Groundcheck CLI Library
//!
//! Command-line interface for running GCS acceptance scenarios.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod logging;
pub mod output;
pub mod runner;

pub use commands::{
    CheckMapArgs, Cli, ColorArg, Commands, PolicyArg, ReportFormat, RunArgs, TreeArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
