pub mod diagnostics;
pub mod errors;
pub mod posterior;
pub mod remote_objects;
pub mod summary;
#[cfg(any(feature = "testing", test))]
pub mod test_utils;
pub mod variant;

use std::sync::Arc;

use diagnostics::CorrectnessWarning;
use errors::InferenceError;
#[cfg(any(feature = "testing", test))]
use mockall::automock;
use posterior::VariantPosterior;
use variant::VariantSet;

pub type InferenceResult<T> = Result<T, InferenceError>;
pub type SharedInferenceBackend = Arc<dyn InferenceBackend>;
pub type SharedDiagnosticsSink = Arc<dyn DiagnosticsSink>;

/// A source of latent conversion-rate posteriors. Implementations are pure functions of their
/// inputs plus backend-internal randomness, so they can be driven from several threads at once.
#[cfg_attr(any(feature = "testing", test), automock)]
pub trait InferenceBackend: Send + Sync {
    /// Short human-readable name, used for labels and logs.
    fn name(&self) -> &'static str;

    /// Returns one posterior per variant, in the order of `variants`.
    fn infer(&self, variants: &VariantSet) -> InferenceResult<Vec<VariantPosterior>>;
}

/// Receives non-fatal correctness warnings raised while reconciling or comparing posteriors.
#[cfg_attr(any(feature = "testing", test), automock)]
pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, warning: CorrectnessWarning);
}
