use std::time::Duration;

use ab_bayes_config::config::RemoteBackendConfig;
use ab_bayes_types::errors::RemoteInferenceError;
use ab_bayes_types::posterior::VariantPosterior;
use ab_bayes_types::remote_objects::{RemoteInferenceRequest, RemoteInferenceResponse};
use ab_bayes_types::variant::VariantSet;
use ab_bayes_types::{InferenceBackend, InferenceResult, SharedDiagnosticsSink};
use reqwest::blocking::Client as BlockingClient;
use tracing::{debug, instrument};

use crate::correlation::variant_posteriors;

#[cfg(test)]
#[path = "remote_backend_test.rs"]
mod remote_backend_test;

pub const API_KEY_HEADER: &str = "x-api-key";

pub type RemoteInferenceResult<T> = Result<T, RemoteInferenceError>;

/// Client of the remote binomial-conversion inference service.
pub struct RemoteInferenceBackend {
    config: RemoteBackendConfig,
    client: BlockingClient,
    diagnostics: SharedDiagnosticsSink,
}

impl RemoteInferenceBackend {
    pub fn new(
        config: RemoteBackendConfig,
        diagnostics: SharedDiagnosticsSink,
    ) -> RemoteInferenceResult<Self> {
        let client = BlockingClient::builder()
            .timeout(Duration::from_secs(config.query_timeout_sec))
            .build()
            .map_err(|err| RemoteInferenceError::ClientBuildError(err.to_string()))?;
        Ok(Self { config, client, diagnostics })
    }

    pub fn config(&self) -> &RemoteBackendConfig {
        &self.config
    }

    // Note: This function is blocking; it waits for the service to respond or for the configured
    // timeout to pass.
    #[instrument(skip(self, variants), fields(n_variants = variants.len()), err)]
    pub fn run_analysis(
        &self,
        variants: &VariantSet,
        return_posteriors: bool,
    ) -> RemoteInferenceResult<RemoteInferenceResponse> {
        let request = RemoteInferenceRequest::new(variants, return_posteriors);
        let response = self
            .client
            .post(self.config.url.clone())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        let body = response.text().map_err(|err| self.transport_error(err))?;
        if !status.is_success() {
            return Err(RemoteInferenceError::StatusError { status: status.as_u16(), body });
        }

        let response: RemoteInferenceResponse = serde_json::from_str(&body)
            .map_err(|err| RemoteInferenceError::ParseError(err.to_string()))?;
        response.validate()?;
        debug!(
            execution_time_secs = response.execution_details.execution_time().as_secs_f64(),
            execution_size = response.execution_details.execution_size,
            "Received inference response."
        );
        Ok(response)
    }

    fn transport_error(&self, err: reqwest::Error) -> RemoteInferenceError {
        if err.is_timeout() {
            return RemoteInferenceError::Timeout { timeout_sec: self.config.query_timeout_sec };
        }
        RemoteInferenceError::RequestError { retryable: err.is_connect(), message: err.to_string() }
    }
}

impl InferenceBackend for RemoteInferenceBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    /// Always requests raw posteriors, whatever `return_posteriors` is configured to.
    fn infer(&self, variants: &VariantSet) -> InferenceResult<Vec<VariantPosterior>> {
        let response = self.run_analysis(variants, true)?;
        variant_posteriors(&response, variants, self.diagnostics.as_ref())
    }
}
