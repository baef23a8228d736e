use thiserror::Error;
use uuid::Uuid;

/// Malformed variant input. Always fatal to the current request.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Variant list is empty.")]
    EmptyVariantList,
    #[error("Variant '{name}' has no enrollments.")]
    NonPositiveEnrollments { name: String },
    #[error(
        "Variant '{name}' has {conversions} conversions but only {enrollments} enrollments."
    )]
    ConversionsExceedEnrollments { name: String, enrollments: u64, conversions: u64 },
    #[error("No control variant was provided.")]
    MissingControl,
    #[error("Expected exactly one control variant, found {count}.")]
    MultipleControls { count: usize },
    #[error("Variant key {key} is shared by more than one variant.")]
    DuplicateVariantKey { key: Uuid },
    #[error("At most {max} variants are supported, got {count}.")]
    TooManyVariants { max: usize, count: usize },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RemoteInferenceError {
    #[error("Failed to build the HTTP client: {0}")]
    ClientBuildError(String),
    #[error("Request to the inference service failed: {message}")]
    RequestError { message: String, retryable: bool },
    #[error("Request to the inference service timed out after {timeout_sec} seconds.")]
    Timeout { timeout_sec: u64 },
    #[error("Inference service responded with status {status}: {body}")]
    StatusError { status: u16, body: String },
    #[error("Failed to parse the inference service response: {0}")]
    ParseError(String),
    #[error("Missing field `{field}` in the statistics of variant {key}.")]
    MissingField { field: String, key: Uuid },
    #[error("Invalid field `{field}` for variant {key}: {reason}")]
    InvalidField { field: String, key: Uuid, reason: String },
    #[error("Posterior samples were requested but are missing for variant {key}.")]
    MissingPosteriorData { key: Uuid },
}

impl RemoteInferenceError {
    /// Whether a caller may reasonably retry the same request. The engine itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::RequestError { retryable, .. } => *retryable,
            Self::StatusError { status, .. } => *status == 429 || (500..600).contains(status),
            Self::ClientBuildError(_)
            | Self::ParseError(_)
            | Self::MissingField { .. }
            | Self::InvalidField { .. }
            | Self::MissingPosteriorData { .. } => false,
        }
    }
}

/// Key-correlation failure or unusable posterior input. Never downgraded to a partial result.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("Posterior '{label}' has no samples.")]
    EmptyPosterior { label: String },
    #[error("Posterior '{label}' has a non-finite sample at index {index}.")]
    NonFiniteSample { label: String, index: usize },
    #[error("Response has no versus-control comparison; the control variant cannot be located.")]
    MissingVersusControl,
    #[error("Versus-control comparison {key} does not name the variant it was compared to.")]
    MissingComparedToVariant { key: Uuid },
    #[error("Response control key {found} does not match the requested control {expected}.")]
    ControlKeyMismatch { expected: Uuid, found: Uuid },
    #[error("No pairwise comparison found for variant {key}.")]
    UnmatchedVariantKey { key: Uuid },
    #[error("Posterior set has no control variant.")]
    MissingControlPosterior,
    #[error("All {total} control samples are zero; the relative difference is undefined.")]
    NoValidRelativeDifferences { total: usize },
}

/// Degenerate input to density estimation. Recoverable: only the plotting step is skipped.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EstimationError {
    #[error("Posterior '{label}' has fewer than 2 distinct values.")]
    DegenerateSamples { label: String },
    #[error("Density grid resolution must be at least 2, got {0}.")]
    InvalidResolution(usize),
    #[error("Kernel bandwidth must be positive and finite, got {0}.")]
    InvalidBandwidth(f64),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error(transparent)]
    ValidationError(#[from] ValidationError),
    #[error(transparent)]
    RemoteInferenceError(#[from] RemoteInferenceError),
    #[error(transparent)]
    ComparisonError(#[from] ComparisonError),
}
