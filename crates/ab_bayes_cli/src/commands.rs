use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ab_bayes::analysis::{analyze, Analysis};
use ab_bayes::comparison::ComparisonEngine;
use ab_bayes::density::DensityEstimator;
use ab_bayes::diagnostics::{CollectingDiagnostics, TracingDiagnostics};
use ab_bayes::local_backend::LocalMcmcBackend;
use ab_bayes::remote_backend::RemoteInferenceBackend;
use ab_bayes::timing::{timed, Timed};
use ab_bayes_config::config::AbBayesConfig;
use ab_bayes_config::dumping::SerializeConfig;
use ab_bayes_config::loading::load_config_or_default;
use ab_bayes_config::ConfigError;
use ab_bayes_types::errors::{InferenceError, RemoteInferenceError, ValidationError};
use ab_bayes_types::remote_objects::RemoteInferenceResponse;
use ab_bayes_types::variant::VariantSet;
use ab_bayes_types::{InferenceResult, SharedDiagnosticsSink, SharedInferenceBackend};
use colored::Colorize;
use thiserror::Error;
use tracing::info;

use crate::args::{counts_pairs, BackendChoice, CliArgs, Command};
use crate::output::{write_json_atomically, OutputError};
use crate::report::{backend_report, CompareReport};

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

const REMOTE_DESCRIPTION: &str = "Bayesian calculation";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    #[error(transparent)]
    InferenceError(#[from] InferenceError),
    #[error(transparent)]
    OutputError(#[from] OutputError),
    #[error("The {backend} backend panicked.")]
    BackendPanicked { backend: &'static str },
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        Self::InferenceError(err.into())
    }
}

impl From<RemoteInferenceError> for CliError {
    fn from(err: RemoteInferenceError) -> Self {
        Self::InferenceError(err.into())
    }
}

type BackendRun = (&'static str, Timed<InferenceResult<Analysis>>);

pub fn run_cli(args: CliArgs) -> Result<(), CliError> {
    let config = load_config_or_default(args.global_options.config_file.as_deref())?;

    match args.command {
        Command::Remote { control, variants, output_path } => {
            run_remote(&config, &variant_set(&control, &variants)?, &output_path)
        }
        Command::Compare { control, variant, backend, output_path } => {
            run_compare(&config, &variant_set(&control, &variant)?, backend, &output_path)
        }
        Command::DumpConfig { output_path } => {
            config.dump_to_file(&output_path.to_string_lossy())?;
            println!("Config dump written to: {}", output_path.display());
            Ok(())
        }
    }
}

/// Names the control `A` and the test variants `B`, `C`, ... in argument order.
fn variant_set(control: &[u64], variants: &[u64]) -> Result<VariantSet, ValidationError> {
    let control =
        counts_pairs(control).into_iter().next().ok_or(ValidationError::MissingControl)?;
    VariantSet::from_counts(control, &counts_pairs(variants))
}

fn run_remote(
    config: &AbBayesConfig,
    variants: &VariantSet,
    output_path: &Path,
) -> Result<(), CliError> {
    let backend = RemoteInferenceBackend::new(config.remote.clone(), Arc::new(TracingDiagnostics))?;

    let Timed { value: response, elapsed } = timed(REMOTE_DESCRIPTION, || {
        backend.run_analysis(variants, config.remote.return_posteriors)
    });
    let response = response?;
    print_execution_time(REMOTE_DESCRIPTION, elapsed);
    println!("{}", calculation_time_line(&response));

    write_json_atomically(output_path, &response)?;
    println!("Analysis written to: {}", output_path.display());
    Ok(())
}

fn run_compare(
    config: &AbBayesConfig,
    variants: &VariantSet,
    choice: BackendChoice,
    output_path: &Path,
) -> Result<(), CliError> {
    let diagnostics = Arc::new(CollectingDiagnostics::new());
    let sink: SharedDiagnosticsSink = diagnostics.clone();
    let engine = ComparisonEngine::new(config.comparison.clone(), sink.clone());
    let backends = selected_backends(config, choice, sink)?;
    let estimator = DensityEstimator::new(config.density.clone());

    let runs = run_concurrently(&backends, variants, &engine)?;
    let mut report = CompareReport::default();
    for (backend, Timed { value: analysis, elapsed }) in runs {
        let analysis = analysis?;
        print_execution_time(&inference_description(backend), elapsed);
        if let Some(backend_report) = backend_report(&analysis, elapsed, &estimator) {
            let summary =
                serde_json::to_string_pretty(&backend_report.summary).map_err(OutputError::from)?;
            println!("{} summary:\n{summary}", backend.bold());
            report.backends.push(backend_report);
        }
    }
    report.warnings = diagnostics.take_warnings();
    info!(n_warnings = report.warnings.len(), "Comparison finished.");

    write_json_atomically(output_path, &report)?;
    println!("Report written to: {}", output_path.display());
    Ok(())
}

fn selected_backends(
    config: &AbBayesConfig,
    choice: BackendChoice,
    diagnostics: SharedDiagnosticsSink,
) -> Result<Vec<SharedInferenceBackend>, CliError> {
    let mut backends: Vec<SharedInferenceBackend> = Vec::new();
    if matches!(choice, BackendChoice::Remote | BackendChoice::Both) {
        backends.push(Arc::new(RemoteInferenceBackend::new(config.remote.clone(), diagnostics)?));
    }
    if matches!(choice, BackendChoice::Local | BackendChoice::Both) {
        backends.push(Arc::new(LocalMcmcBackend::new(config.local.clone())));
    }
    Ok(backends)
}

/// Runs every backend on its own scoped thread. Results keep the order of `backends`.
fn run_concurrently(
    backends: &[SharedInferenceBackend],
    variants: &VariantSet,
    engine: &ComparisonEngine,
) -> Result<Vec<BackendRun>, CliError> {
    thread::scope(|scope| {
        let handles: Vec<_> = backends
            .iter()
            .map(|backend| {
                let handle = scope.spawn(move || {
                    timed(&inference_description(backend.name()), || {
                        analyze(backend.as_ref(), variants, engine)
                    })
                });
                (backend.name(), handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(backend, handle)| {
                handle
                    .join()
                    .map(|run| (backend, run))
                    .map_err(|_| CliError::BackendPanicked { backend })
            })
            .collect()
    })
}

/// The calculation time reported by the service, which excludes transport.
fn calculation_time_line(response: &RemoteInferenceResponse) -> String {
    let service_time = response.execution_details.execution_time();
    format!("Bayesian calculation time: {:.3} seconds", service_time.as_secs_f64())
}

fn inference_description(backend: &str) -> String {
    format!("{backend} inference")
}

fn print_execution_time(description: &str, elapsed: Duration) {
    let line = format!("{description} done. Execution time: {:.3} seconds", elapsed.as_secs_f64());
    println!("{}", line.green());
}
