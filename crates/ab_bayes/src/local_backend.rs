//! In-process inference: one independent Metropolis chain per variant.

use ab_bayes_config::config::LocalSamplerConfig;
use ab_bayes_types::errors::ComparisonError;
use ab_bayes_types::posterior::VariantPosterior;
use ab_bayes_types::variant::{VariantInput, VariantSet};
use ab_bayes_types::{InferenceBackend, InferenceResult};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::mcmc::{expand_outcomes, BernoulliModel, MetropolisSampler};

#[cfg(test)]
#[path = "local_backend_test.rs"]
mod local_backend_test;

#[derive(Clone, Debug)]
pub struct LocalMcmcBackend {
    config: LocalSamplerConfig,
    sampler: MetropolisSampler,
}

impl LocalMcmcBackend {
    pub fn new(config: LocalSamplerConfig) -> Self {
        let sampler = MetropolisSampler::new(config.clone());
        Self { config, sampler }
    }

    /// Samples the posterior of a single variant from the given random stream of `seed`.
    pub fn sample_variant(
        &self,
        variant: &VariantInput,
        seed: u64,
        stream: u64,
    ) -> Result<VariantPosterior, ComparisonError> {
        let model = BernoulliModel::from_outcomes(expand_outcomes(
            variant.enrollments(),
            variant.conversions(),
        ));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);

        let chain = self.sampler.sample(&model, &mut rng);
        debug!(
            variant = variant.name(),
            acceptance_rate = chain.acceptance_rate,
            step_size = chain.final_step_size,
            "Sampled posterior."
        );
        VariantPosterior::new(variant, chain.draws)
    }
}

impl InferenceBackend for LocalMcmcBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    #[instrument(skip_all, fields(n_variants = variants.len(), draws = self.config.draws))]
    fn infer(&self, variants: &VariantSet) -> InferenceResult<Vec<VariantPosterior>> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        variants
            .iter()
            .zip(0_u64..)
            .map(|(variant, stream)| Ok(self.sample_variant(variant, seed, stream)?))
            .collect()
    }
}
