//! Groundcheck CLI: run GCS acceptance scenarios
//!
//! ## Usage
//!
//! ```bash
//! groundcheck run                          # Run the built-in scenarios
//! groundcheck run my.yaml --policy recorded
//! groundcheck check-map --map names.yaml   # Check map entries are unique
//! groundcheck tree --after take_off        # Dump the widget tree
//! ```

use clap::Parser;
use groundcheck_cli::{
    logging, output, runner, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    output::set_colors(config.color.should_color());
    logging::init(&config);

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Run(args) => runner::run_scenarios(&config, &args, &mut stdout),
        Commands::List => runner::list_scenarios(&config, &mut stdout),
        Commands::CheckMap(args) => runner::check_map(&config, &args, &mut stdout),
        Commands::Tree(args) => runner::print_tree(&config, &args, &mut stdout),
    }
}

fn build_config(cli: &Cli) -> CliResult<CliConfig> {
    let color: ColorChoice = cli.color.into();
    let config = CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color);
    match &cli.config {
        Some(path) => config.load_harness(path),
        None => Ok(config),
    }
}
