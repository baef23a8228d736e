use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::metadata::LevelFilter;

#[cfg(test)]
#[path = "args_test.rs"]
mod args_test;

/// An (enrollments, conversions) pair as given on the command line.
pub type Counts = (u64, u64);

#[derive(Debug, Parser)]
#[clap(name = "ab-bayes", version, about = "Bayesian comparison of A/B test conversion rates.")]
pub struct CliArgs {
    #[clap(flatten)]
    pub global_options: GlobalOptions,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOptions {
    /// Default log level. `RUST_LOG` directives take precedence.
    #[clap(long, global = true, default_value = "warn")]
    pub log_level: LevelFilter,

    /// JSON configuration file. Missing params keep their default values.
    #[clap(long, global = true)]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Runs the remote analysis and persists the service response.
    Remote {
        /// Control variant counts.
        #[clap(
            long,
            short = 'c',
            num_args = 2,
            value_names = ["ENROLLMENTS", "CONVERSIONS"],
            required = true
        )]
        control: Vec<u64>,

        /// Test variant counts. Repeat for every test variant.
        #[clap(
            long = "variant",
            short = 'v',
            num_args = 2,
            value_names = ["ENROLLMENTS", "CONVERSIONS"],
            action = ArgAction::Append,
            required = true
        )]
        variants: Vec<u64>,

        #[clap(long, short = 'o', default_value = "output.json")]
        output_path: PathBuf,
    },
    /// Compares a single test variant against the control and reports densities.
    Compare {
        /// Control variant counts.
        #[clap(
            short = 'a',
            num_args = 2,
            value_names = ["ENROLLMENTS", "CONVERSIONS"],
            required = true
        )]
        control: Vec<u64>,

        /// Test variant counts.
        #[clap(
            short = 'b',
            num_args = 2,
            value_names = ["ENROLLMENTS", "CONVERSIONS"],
            required = true
        )]
        variant: Vec<u64>,

        #[clap(long, value_enum, default_value_t = BackendChoice::Remote)]
        backend: BackendChoice,

        #[clap(long, short = 'o', default_value = "report.json")]
        output_path: PathBuf,
    },
    /// Writes the default configuration dump.
    DumpConfig {
        #[clap(long, short = 'o', default_value = "config_dump.json")]
        output_path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendChoice {
    Remote,
    Local,
    /// Runs the remote and the local backends concurrently.
    Both,
}

/// Groups a flat `ENR CONV ENR CONV ...` argument list into pairs. Clap guarantees an even length.
pub fn counts_pairs(values: &[u64]) -> Vec<Counts> {
    values.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}
