use std::path::PathBuf;

use assert_matches::assert_matches;
use clap::Parser;
use pretty_assertions::assert_eq;
use rstest::rstest;
use tracing::metadata::LevelFilter;

use crate::args::{counts_pairs, BackendChoice, CliArgs, Command};

fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
    CliArgs::try_parse_from(std::iter::once("ab-bayes").chain(args.iter().copied()))
}

#[test]
fn remote_collects_repeated_variants() {
    let args = parse(&["remote", "-c", "68130", "2725", "-v", "55901", "2683", "-v", "100", "10"])
        .unwrap();

    assert_matches!(args.command, Command::Remote { control, variants, output_path } => {
        assert_eq!(counts_pairs(&control), [(68130, 2725)]);
        assert_eq!(counts_pairs(&variants), [(55901, 2683), (100, 10)]);
        assert_eq!(output_path, PathBuf::from("output.json"));
    });
    assert_eq!(args.global_options.log_level, LevelFilter::WARN);
    assert_eq!(args.global_options.config_file, None);
}

#[test]
fn compare_defaults_to_the_remote_backend() {
    let args = parse(&["compare", "-a", "1000", "50", "-b", "1000", "100"]).unwrap();

    assert_matches!(args.command, Command::Compare { control, variant, backend, output_path } => {
        assert_eq!(counts_pairs(&control), [(1000, 50)]);
        assert_eq!(counts_pairs(&variant), [(1000, 100)]);
        assert_eq!(backend, BackendChoice::Remote);
        assert_eq!(output_path, PathBuf::from("report.json"));
    });
}

#[rstest]
#[case::remote("remote", BackendChoice::Remote)]
#[case::local("local", BackendChoice::Local)]
#[case::both("both", BackendChoice::Both)]
fn backend_choice(#[case] value: &str, #[case] expected: BackendChoice) {
    let args = parse(&["compare", "-a", "10", "1", "-b", "10", "2", "--backend", value]).unwrap();
    assert_matches!(args.command, Command::Compare { backend, .. } if backend == expected);
}

#[test]
fn global_options_follow_the_subcommand() {
    let args = parse(&[
        "dump-config",
        "-o",
        "dump.json",
        "--log-level",
        "debug",
        "--config-file",
        "config.json",
    ])
    .unwrap();

    assert_eq!(args.global_options.log_level, LevelFilter::DEBUG);
    assert_eq!(args.global_options.config_file, Some(PathBuf::from("config.json")));
    assert_matches!(
        args.command,
        Command::DumpConfig { output_path } if output_path == PathBuf::from("dump.json")
    );
}

#[rstest]
#[case::missing_variant(&["remote", "-c", "100", "10"])]
#[case::half_a_pair(&["remote", "-c", "100", "-v", "100", "10"])]
#[case::negative_count(&["compare", "-a", "100", "-10", "-b", "100", "10"])]
#[case::unknown_backend(&["compare", "-a", "10", "1", "-b", "10", "2", "--backend", "cloud"])]
fn invalid_arguments(#[case] args: &[&str]) {
    assert!(parse(args).is_err());
}
