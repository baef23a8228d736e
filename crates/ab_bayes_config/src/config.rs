use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::dumping::{prepend_sub_config_name, ser_optional_param, ser_param, SerializeConfig};
use crate::{ParamPath, ParamPrivacy, SerializedParam};

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_INFERENCE_URL: &str = "https://inference.example.com/bayes-ab";

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AbBayesConfig {
    #[validate(nested)]
    pub remote: RemoteBackendConfig,
    #[validate(nested)]
    pub local: LocalSamplerConfig,
    #[validate(nested)]
    pub comparison: ComparisonConfig,
    #[validate(nested)]
    pub density: DensityConfig,
}

impl SerializeConfig for AbBayesConfig {
    fn dump(&self) -> BTreeMap<ParamPath, SerializedParam> {
        let mut dump = BTreeMap::new();
        dump.extend(prepend_sub_config_name(self.remote.dump(), "remote"));
        dump.extend(prepend_sub_config_name(self.local.dump(), "local"));
        dump.extend(prepend_sub_config_name(self.comparison.dump(), "comparison"));
        dump.extend(prepend_sub_config_name(self.density.dump(), "density"));
        dump
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteBackendConfig {
    pub url: Url,
    pub api_key: String,
    #[validate(range(min = 1))]
    pub query_timeout_sec: u64,
    pub return_posteriors: bool,
}

impl Default for RemoteBackendConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_INFERENCE_URL).expect("Invalid URL"),
            api_key: String::new(),
            query_timeout_sec: 30,
            return_posteriors: true,
        }
    }
}

impl SerializeConfig for RemoteBackendConfig {
    fn dump(&self) -> BTreeMap<ParamPath, SerializedParam> {
        BTreeMap::from_iter([
            ser_param(
                "url",
                &self.url,
                "Endpoint of the binomial-conversion inference service.",
                ParamPrivacy::Public,
            ),
            ser_param(
                "api_key",
                &self.api_key,
                "API key sent in the `x-api-key` header.",
                ParamPrivacy::Private,
            ),
            ser_param(
                "query_timeout_sec",
                &self.query_timeout_sec,
                "The timeout (seconds) for a single inference request.",
                ParamPrivacy::Public,
            ),
            ser_param(
                "return_posteriors",
                &self.return_posteriors,
                "Whether raw posterior samples are requested from the service.",
                ParamPrivacy::Public,
            ),
        ])
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LocalSamplerConfig {
    /// Retained draws per variant, after warm-up.
    #[validate(range(min = 1000))]
    pub draws: usize,
    pub warmup: usize,
    pub seed: Option<u64>,
    #[validate(range(exclusive_min = 0.0))]
    pub initial_step_size: f64,
    #[validate(range(min = 1))]
    pub adaptation_window: usize,
}

impl Default for LocalSamplerConfig {
    fn default() -> Self {
        Self {
            draws: 2000,
            warmup: 1000,
            seed: None,
            initial_step_size: 0.5,
            adaptation_window: 50,
        }
    }
}

impl SerializeConfig for LocalSamplerConfig {
    fn dump(&self) -> BTreeMap<ParamPath, SerializedParam> {
        let mut dump = BTreeMap::from_iter([
            ser_param(
                "draws",
                &self.draws,
                "Number of posterior draws kept per variant.",
                ParamPrivacy::Public,
            ),
            ser_param(
                "warmup",
                &self.warmup,
                "Number of warm-up iterations discarded before draws are kept.",
                ParamPrivacy::Public,
            ),
            ser_param(
                "initial_step_size",
                &self.initial_step_size,
                "Initial standard deviation of the random-walk proposal (logit scale).",
                ParamPrivacy::Public,
            ),
            ser_param(
                "adaptation_window",
                &self.adaptation_window,
                "Number of warm-up iterations between proposal step-size adjustments.",
                ParamPrivacy::Public,
            ),
        ]);
        dump.extend(ser_optional_param(
            &self.seed,
            0,
            "seed",
            "Seed of the sampler's random number generator.",
            ParamPrivacy::Public,
        ));
        dump
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonConfig {
    /// `alpha`; the credible interval covers `1 - alpha`.
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub significance_level: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_excluded_fraction: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self { significance_level: 0.05, max_excluded_fraction: 0.05 }
    }
}

impl SerializeConfig for ComparisonConfig {
    fn dump(&self) -> BTreeMap<ParamPath, SerializedParam> {
        BTreeMap::from_iter([
            ser_param(
                "significance_level",
                &self.significance_level,
                "Significance level alpha of the two-sided credible interval.",
                ParamPrivacy::Public,
            ),
            ser_param(
                "max_excluded_fraction",
                &self.max_excluded_fraction,
                "Fraction of sample pairs that may be excluded from the relative difference \
                 (zero control draws) before a correctness warning is raised.",
                ParamPrivacy::Public,
            ),
        ])
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BandwidthMethod {
    /// `bandwidth_factor * n^(-1/5) * std`: a scaled Scott's rule.
    #[default]
    ScaledScott,
    /// `bandwidth_factor * std`.
    SampleStd,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DensityConfig {
    #[validate(range(min = 2))]
    pub resolution: usize,
    #[validate(range(exclusive_min = 0.0))]
    pub bandwidth_factor: f64,
    pub bandwidth_method: BandwidthMethod,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            resolution: 200,
            bandwidth_factor: 0.4,
            bandwidth_method: BandwidthMethod::default(),
        }
    }
}

impl SerializeConfig for DensityConfig {
    fn dump(&self) -> BTreeMap<ParamPath, SerializedParam> {
        BTreeMap::from_iter([
            ser_param(
                "resolution",
                &self.resolution,
                "Number of grid points of a density curve.",
                ParamPrivacy::Public,
            ),
            ser_param(
                "bandwidth_factor",
                &self.bandwidth_factor,
                "Multiplier applied to the kernel bandwidth rule; tuned for presentation.",
                ParamPrivacy::Public,
            ),
            ser_param(
                "bandwidth_method",
                &self.bandwidth_method,
                "Bandwidth rule the factor applies to: `scaled_scott` or `sample_std`.",
                ParamPrivacy::Public,
            ),
        ])
    }
}
