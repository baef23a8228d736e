use std::fs;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use tempfile::TempDir;
use validator::Validate;

use crate::config::{
    AbBayesConfig,
    BandwidthMethod,
    ComparisonConfig,
    DensityConfig,
    LocalSamplerConfig,
    RemoteBackendConfig,
};
use crate::dumping::SerializeConfig;
use crate::{ConfigError, ParamPrivacy};

#[test]
fn default_config_is_valid() {
    AbBayesConfig::default().validate().unwrap();
}

#[test]
fn defaults() {
    let config = AbBayesConfig::default();
    assert_eq!(config.remote.query_timeout_sec, 30);
    assert!(config.remote.return_posteriors);
    assert_eq!(config.local.draws, 2000);
    assert_eq!(config.local.seed, None);
    assert_eq!(config.comparison.significance_level, 0.05);
    assert_eq!(config.density.resolution, 200);
    assert_eq!(config.density.bandwidth_factor, 0.4);
    assert_eq!(config.density.bandwidth_method, BandwidthMethod::ScaledScott);
}

#[rstest]
#[case::zero(0.0)]
#[case::one(1.0)]
#[case::negative(-0.1)]
#[case::nan(f64::NAN)]
fn invalid_significance_level(#[case] significance_level: f64) {
    let config = ComparisonConfig { significance_level, ..Default::default() };
    let errors = config.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("significance_level"));
}

#[rstest]
#[case::resolution(DensityConfig { resolution: 1, ..Default::default() }, "resolution")]
#[case::zero_bandwidth(
    DensityConfig { bandwidth_factor: 0.0, ..Default::default() },
    "bandwidth_factor"
)]
fn invalid_density_config(#[case] config: DensityConfig, #[case] field: &str) {
    let errors = config.validate().unwrap_err();
    assert!(errors.field_errors().contains_key(field));
}

#[rstest]
#[case::too_few_draws(LocalSamplerConfig { draws: 999, ..Default::default() }, "draws")]
#[case::zero_step(
    LocalSamplerConfig { initial_step_size: 0.0, ..Default::default() },
    "initial_step_size"
)]
#[case::empty_window(
    LocalSamplerConfig { adaptation_window: 0, ..Default::default() },
    "adaptation_window"
)]
fn invalid_sampler_config(#[case] config: LocalSamplerConfig, #[case] field: &str) {
    let errors = config.validate().unwrap_err();
    assert!(errors.field_errors().contains_key(field));
}

#[test]
fn nested_validation_fails_on_invalid_section() {
    let config = AbBayesConfig {
        remote: RemoteBackendConfig { query_timeout_sec: 0, ..Default::default() },
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn dump_flattens_sections() {
    let dump = AbBayesConfig::default().dump();

    assert_eq!(dump["comparison.significance_level"].value, json!(0.05));
    assert_eq!(dump["density.bandwidth_method"].value, json!("scaled_scott"));
    assert_eq!(dump["local.seed.#is_none"].value, json!(true));
    assert_eq!(dump["remote.api_key"].privacy, ParamPrivacy::Private);
    assert_eq!(dump["remote.url"].value, json!("https://inference.example.com/bayes-ab"));
    assert!(dump.keys().all(|path| path.contains('.')));
}

#[test]
fn dump_of_set_seed() {
    let config = LocalSamplerConfig { seed: Some(17), ..Default::default() };
    let dump = config.dump();
    assert_eq!(dump["seed"].value, json!(17));
    assert_eq!(dump["seed.#is_none"].value, json!(false));
}

#[test]
fn dump_to_file_redacts_private_params() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config_dump.json");
    let config = AbBayesConfig {
        remote: RemoteBackendConfig { api_key: "secret-key".to_string(), ..Default::default() },
        ..Default::default()
    };

    config.dump_to_file(path.to_str().unwrap()).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("secret-key"));
    let dumped: Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(dumped["remote.api_key"]["value"], Value::Null);
    assert_eq!(dumped["remote.query_timeout_sec"]["value"], json!(30));
}

#[test]
fn bandwidth_method_serde() {
    assert_eq!(serde_json::to_value(BandwidthMethod::SampleStd).unwrap(), json!("sample_std"));
    let method: BandwidthMethod = serde_json::from_value(json!("scaled_scott")).unwrap();
    assert_eq!(method, BandwidthMethod::ScaledScott);
}

#[test]
fn dump_to_file_replaces_the_target_in_place() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config_dump.json");
    fs::write(&path, "stale").unwrap();

    AbBayesConfig::default().dump_to_file(path.to_str().unwrap()).unwrap();

    let dumped: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(dumped["density.resolution"]["value"], json!(200));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn dump_to_missing_directory_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent").join("config_dump.json");

    assert_matches!(
        AbBayesConfig::default().dump_to_file(path.to_str().unwrap()),
        Err(ConfigError::Io { .. })
    );
}
