//! Random-walk Metropolis sampling of a Beta-Bernoulli conversion-rate posterior.
//!
//! The rate `p` is sampled on the logit scale `eta = ln(p / (1 - p))`. With a uniform Beta(1, 1)
//! prior, `s` successes and `f` failures, the log density of `eta` (including the Jacobian of the
//! transform) is, up to a constant,
//!
//! ```text
//! log pi(eta) = (s + 1) * ln(p) + (f + 1) * ln(1 - p)
//! ```
//!
//! During warm-up the proposal step size is tuned every `adaptation_window` iterations towards
//! an acceptance rate of [`TARGET_ACCEPTANCE_RATE`]. Warm-up draws are always discarded.

use ab_bayes_config::config::LocalSamplerConfig;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

#[cfg(test)]
#[path = "mcmc_test.rs"]
mod mcmc_test;

/// Optimal acceptance rate of a one-dimensional random-walk Metropolis sampler.
pub const TARGET_ACCEPTANCE_RATE: f64 = 0.44;

const MIN_STEP_SIZE: f64 = 1e-4;
const MAX_STEP_SIZE: f64 = 10.0;

/// Bernoulli likelihood of a binary outcome sequence under a Beta(1, 1) prior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BernoulliModel {
    successes: u64,
    failures: u64,
}

impl BernoulliModel {
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = bool>) -> Self {
        let (successes, failures) =
            outcomes.into_iter().fold((0, 0), |(successes, failures), converted| {
                if converted { (successes + 1, failures) } else { (successes, failures + 1) }
            });
        Self { successes, failures }
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Log posterior density of the logit-transformed rate, up to an additive constant.
    pub fn log_density(&self, eta: f64) -> f64 {
        // ln(p) = -softplus(-eta), ln(1 - p) = -softplus(eta).
        -(u64_to_f64(self.successes) + 1.0) * softplus(-eta)
            - (u64_to_f64(self.failures) + 1.0) * softplus(eta)
    }

    /// Logit of the posterior mean, a convenient starting point for a chain.
    pub fn initial_position(&self) -> f64 {
        let successes = u64_to_f64(self.successes) + 1.0;
        let failures = u64_to_f64(self.failures) + 1.0;
        successes.ln() - failures.ln()
    }
}

/// Expands aggregate counts into a raw outcome sequence: `conversions` successes followed by
/// `enrollments - conversions` failures.
pub fn expand_outcomes(enrollments: u64, conversions: u64) -> impl Iterator<Item = bool> {
    let failures = enrollments.saturating_sub(conversions);
    std::iter::repeat(true)
        .take(to_usize(conversions))
        .chain(std::iter::repeat(false).take(to_usize(failures)))
}

/// Post-warm-up draws of one chain.
#[derive(Clone, Debug, PartialEq)]
pub struct Chain {
    /// Conversion-rate draws in (0, 1).
    pub draws: Vec<f64>,
    pub n_warmup: usize,
    pub acceptance_rate: f64,
    pub final_step_size: f64,
}

#[derive(Clone, Debug)]
pub struct MetropolisSampler {
    config: LocalSamplerConfig,
}

impl MetropolisSampler {
    pub fn new(config: LocalSamplerConfig) -> Self {
        Self { config }
    }

    pub fn sample(&self, model: &BernoulliModel, rng: &mut ChaCha8Rng) -> Chain {
        let mut state = ChainState::new(model, self.config.initial_step_size);

        let window = self.config.adaptation_window.max(1);
        let mut window_accepted: usize = 0;
        for iteration in 1..=self.config.warmup {
            if state.step(model, rng) {
                window_accepted += 1;
            }
            if iteration % window == 0 {
                let acceptance_rate = as_f64(window_accepted) / as_f64(window);
                state.adapt(acceptance_rate);
                window_accepted = 0;
            }
        }

        let mut accepted: usize = 0;
        let mut draws = Vec::with_capacity(self.config.draws);
        for _ in 0..self.config.draws {
            if state.step(model, rng) {
                accepted += 1;
            }
            draws.push(sigmoid(state.position));
        }

        Chain {
            acceptance_rate: as_f64(accepted) / as_f64(self.config.draws.max(1)),
            draws,
            n_warmup: self.config.warmup,
            final_step_size: state.step_size,
        }
    }
}

struct ChainState {
    position: f64,
    log_density: f64,
    step_size: f64,
}

impl ChainState {
    fn new(model: &BernoulliModel, step_size: f64) -> Self {
        let position = model.initial_position();
        Self { position, log_density: model.log_density(position), step_size }
    }

    /// One Metropolis transition. Returns whether the proposal was accepted.
    fn step(&mut self, model: &BernoulliModel, rng: &mut ChaCha8Rng) -> bool {
        let noise: f64 = rng.sample(StandardNormal);
        let proposal = self.position + self.step_size * noise;
        let proposal_log_density = model.log_density(proposal);

        let log_uniform = rng.gen::<f64>().ln();
        if log_uniform < proposal_log_density - self.log_density {
            self.position = proposal;
            self.log_density = proposal_log_density;
            return true;
        }
        false
    }

    fn adapt(&mut self, acceptance_rate: f64) {
        self.step_size = (self.step_size * (acceptance_rate - TARGET_ACCEPTANCE_RATE).exp())
            .clamp(MIN_STEP_SIZE, MAX_STEP_SIZE);
    }
}

fn softplus(x: f64) -> f64 {
    if x > 0.0 { x + (-x).exp().ln_1p() } else { x.exp().ln_1p() }
}

fn sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let exp_eta = eta.exp();
        exp_eta / (1.0 + exp_eta)
    }
}

#[allow(clippy::as_conversions)]
fn as_f64(value: usize) -> f64 {
    value as f64
}

#[allow(clippy::as_conversions)]
fn u64_to_f64(value: u64) -> f64 {
    value as f64
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
