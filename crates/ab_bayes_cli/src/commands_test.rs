use std::fs;
use std::path::Path;
use std::time::Duration;

use ab_bayes_types::errors::{InferenceError, RemoteInferenceError, ValidationError};
use ab_bayes_types::remote_objects::RemoteInferenceResponse;
use ab_bayes_types::test_utils::response_for;
use ab_bayes_types::variant::VariantSet;
use assert_matches::assert_matches;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::args::CliArgs;
use crate::commands::{calculation_time_line, run_cli, variant_set, CliError};

fn write_config(dir: &TempDir, config: Value) -> String {
    let path = dir.path().join("config.json");
    fs::write(&path, config.to_string()).unwrap();
    path.to_string_lossy().into_owned()
}

fn run(args: &[&str]) -> Result<(), CliError> {
    let args = std::iter::once("ab-bayes").chain(args.iter().copied());
    run_cli(CliArgs::try_parse_from(args).unwrap())
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn variants_are_named_in_argument_order() {
    let variants = variant_set(&[100, 10], &[100, 12, 100, 8]).unwrap();

    let names: Vec<_> = variants.iter().map(|variant| variant.name()).collect();
    assert_eq!(names, ["A", "B", "C"]);
    assert_eq!(variants.control().enrollments(), 100);
    assert_eq!(variants.control().conversions(), 10);
}

#[test]
fn invalid_counts_are_rejected() {
    assert_matches!(
        variant_set(&[100, 10], &[100, 120]),
        Err(ValidationError::ConversionsExceedEnrollments { .. })
    );
    assert_matches!(variant_set(&[], &[100, 12]), Err(ValidationError::MissingControl));
}

#[test]
fn dump_config_redacts_the_api_key() {
    let dir = TempDir::new().unwrap();
    let config_file = write_config(&dir, json!({"remote": {"api_key": "secret"}}));
    let dump_path = dir.path().join("dump.json");

    run(&["dump-config", "-o", dump_path.to_str().unwrap(), "--config-file", &config_file])
        .unwrap();

    let dump = read_json(&dump_path);
    assert_eq!(dump["remote.api_key"]["value"], Value::Null);
    assert_eq!(dump["density.resolution"]["value"], json!(200));
}

#[test]
fn compare_with_the_local_backend_writes_a_report() {
    let dir = TempDir::new().unwrap();
    let config_file = write_config(&dir, json!({"local": {"seed": 7}}));
    let report_path = dir.path().join("report.json");

    run(&[
        "compare",
        "-a",
        "1000",
        "50",
        "-b",
        "1000",
        "100",
        "--backend",
        "local",
        "-o",
        report_path.to_str().unwrap(),
        "--config-file",
        &config_file,
    ])
    .unwrap();

    let report = read_json(&report_path);
    let backends = report["backends"].as_array().unwrap();
    assert_eq!(backends.len(), 1);
    assert_eq!(backends[0]["backend"], "local");
    assert!(backends[0]["summary"]["prob_b_better"].as_f64().unwrap() > 0.95);
    let labels: Vec<_> =
        backends[0]["densities"].as_array().unwrap().iter().map(|d| d["label"].clone()).collect();
    assert_eq!(labels, [json!("A"), json!("B"), json!("b_vs_a_diff")]);
    assert_eq!(report["warnings"], json!([]));
}

#[test]
fn remote_writes_the_service_response() {
    let variants = VariantSet::from_counts((68130, 2725), &[(55901, 2683)]).unwrap();
    let response = response_for(&variants, vec![None, None]);
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::PartialJson(json!({"return_posteriors": false})))
        .with_status(200)
        .with_body(serde_json::to_string(&response).unwrap())
        .create();

    let dir = TempDir::new().unwrap();
    let config_file =
        write_config(&dir, json!({"remote": {"url": server.url(), "return_posteriors": false}}));
    let output_path = dir.path().join("output.json");

    run(&[
        "remote",
        "-c",
        "68130",
        "2725",
        "-v",
        "55901",
        "2683",
        "-o",
        output_path.to_str().unwrap(),
        "--config-file",
        &config_file,
    ])
    .unwrap();

    mock.assert();
    let written: RemoteInferenceResponse =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(written, response);
    assert_eq!(written.execution_details.execution_time(), Duration::from_micros(1_250_000));
}

#[test]
fn calculation_time_is_the_service_time() {
    let variants = VariantSet::from_counts((100, 10), &[(100, 12)]).unwrap();
    let mut response = response_for(&variants, vec![None, None]);
    response.execution_details.execution_time_micro_seconds = 2_345_600;

    assert_eq!(calculation_time_line(&response), "Bayesian calculation time: 2.346 seconds");
}

#[test]
fn remote_failure_leaves_no_output() {
    let mut server = mockito::Server::new();
    let _mock = server.mock("POST", "/").with_status(503).with_body("busy").create();

    let dir = TempDir::new().unwrap();
    let config_file = write_config(&dir, json!({"remote": {"url": server.url()}}));
    let output_path = dir.path().join("output.json");

    let result = run(&[
        "remote",
        "-c",
        "100",
        "10",
        "-v",
        "100",
        "12",
        "-o",
        output_path.to_str().unwrap(),
        "--config-file",
        &config_file,
    ]);

    assert_matches!(
        result,
        Err(CliError::InferenceError(InferenceError::RemoteInferenceError(
            RemoteInferenceError::StatusError { status: 503, .. }
        )))
    );
    assert!(!output_path.exists());
}

#[test]
fn invalid_config_file_fails_before_running() {
    let dir = TempDir::new().unwrap();
    let config_file = write_config(&dir, json!({"density": {"resolution": 1}}));

    assert_matches!(
        run(&["dump-config", "-o", "unused.json", "--config-file", &config_file]),
        Err(CliError::ConfigError(_))
    );
}
