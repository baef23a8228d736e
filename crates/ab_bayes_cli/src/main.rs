use std::process::ExitCode;

use ab_bayes_cli::args::CliArgs;
use ab_bayes_cli::commands::run_cli;
use ab_bayes_cli::tracing_utils::configure_tracing;
use clap::Parser;
use colored::Colorize;
use tracing::info;

/// Main entry point of the ab-bayes CLI.
fn main() -> ExitCode {
    let args = CliArgs::parse();
    configure_tracing(args.global_options.log_level);
    info!("Starting ab-bayes with args: \n{:?}", args);

    match run_cli(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", format!("Error: {err}").red());
            ExitCode::FAILURE
        }
    }
}
