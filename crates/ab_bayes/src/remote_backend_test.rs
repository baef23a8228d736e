use std::net::TcpListener;
use std::sync::Arc;

use ab_bayes_config::config::RemoteBackendConfig;
use ab_bayes_types::errors::{ComparisonError, InferenceError, RemoteInferenceError};
use ab_bayes_types::remote_objects::{RemoteInferenceRequest, RemoteInferenceResponse};
use ab_bayes_types::test_utils::response_for;
use ab_bayes_types::variant::VariantSet;
use ab_bayes_types::InferenceBackend;
use assert_matches::assert_matches;
use mockito::Matcher;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use serde_json::json;
use url::Url;

use crate::diagnostics::TracingDiagnostics;
use crate::remote_backend::{RemoteInferenceBackend, API_KEY_HEADER};

const API_KEY: &str = "test-api-key";

#[fixture]
fn variants() -> VariantSet {
    VariantSet::from_counts((68130, 2725), &[(55901, 2683)]).unwrap()
}

fn backend_for(url: &str) -> RemoteInferenceBackend {
    let config = RemoteBackendConfig {
        url: Url::parse(url).unwrap(),
        api_key: API_KEY.to_string(),
        query_timeout_sec: 5,
        ..Default::default()
    };
    RemoteInferenceBackend::new(config, Arc::new(TracingDiagnostics)).unwrap()
}

fn serve(
    server: &mut mockito::ServerGuard,
    request_body: Matcher,
    status: usize,
    response_body: String,
) -> mockito::Mock {
    server
        .mock("POST", "/")
        .match_header(API_KEY_HEADER, API_KEY)
        .match_header("content-type", "application/json")
        .match_body(request_body)
        .with_status(status)
        .with_body(response_body)
        .create()
}

fn posteriors_response(variants: &VariantSet) -> RemoteInferenceResponse {
    response_for(variants, vec![Some(vec![0.040, 0.041, 0.039]), Some(vec![0.048, 0.047, 0.049])])
}

#[rstest]
fn run_analysis_posts_the_request(variants: VariantSet) {
    let mut server = mockito::Server::new();
    let expected_response = posteriors_response(&variants);
    let request = serde_json::to_value(RemoteInferenceRequest::new(&variants, false)).unwrap();
    let mock = serve(
        &mut server,
        Matcher::Json(request),
        200,
        serde_json::to_string(&expected_response).unwrap(),
    );

    let response = backend_for(&server.url()).run_analysis(&variants, false).unwrap();

    mock.assert();
    assert_eq!(response, expected_response);
}

#[rstest]
fn infer_requests_posteriors_and_matches_keys(variants: VariantSet) {
    let mut server = mockito::Server::new();
    let mock = serve(
        &mut server,
        Matcher::PartialJson(json!({"return_posteriors": true})),
        200,
        serde_json::to_string(&posteriors_response(&variants)).unwrap(),
    );

    let posteriors = backend_for(&server.url()).infer(&variants).unwrap();

    mock.assert();
    assert_eq!(posteriors.len(), 2);
    assert_eq!(posteriors[0].variant_key, variants.control().variant_key());
    assert_eq!(posteriors[0].posterior.points(), [0.040, 0.041, 0.039]);
    assert_eq!(posteriors[1].name, "B");
    assert_eq!(posteriors[1].posterior.points(), [0.048, 0.047, 0.049]);
}

#[rstest]
#[case::server_error(500, true)]
#[case::rate_limited(429, true)]
#[case::unauthorized(401, false)]
fn failure_status(variants: VariantSet, #[case] status: usize, #[case] retryable: bool) {
    let mut server = mockito::Server::new();
    let _mock = serve(&mut server, Matcher::Any, status, "service says no".to_string());

    let err = backend_for(&server.url()).run_analysis(&variants, true).unwrap_err();

    assert_eq!(
        err,
        RemoteInferenceError::StatusError {
            status: u16::try_from(status).unwrap(),
            body: "service says no".to_string()
        }
    );
    assert_eq!(err.is_retryable(), retryable);
}

#[rstest]
fn malformed_body_is_a_parse_error(variants: VariantSet) {
    let mut server = mockito::Server::new();
    let _mock = serve(&mut server, Matcher::Any, 200, "{\"versus_control\": [".to_string());

    assert_matches!(
        backend_for(&server.url()).run_analysis(&variants, true),
        Err(RemoteInferenceError::ParseError(_))
    );
}

#[rstest]
fn response_violating_the_contract_is_rejected(variants: VariantSet) {
    let mut server = mockito::Server::new();
    let mut response = posteriors_response(&variants);
    response.versus_control[0].statistics.winning_probability = Some(1.5);
    let _mock = serve(&mut server, Matcher::Any, 200, serde_json::to_string(&response).unwrap());

    assert_matches!(
        backend_for(&server.url()).run_analysis(&variants, true),
        Err(RemoteInferenceError::InvalidField { field, .. }) if field == "winning_probability"
    );
}

#[rstest]
fn empty_versus_control_fails_inference(variants: VariantSet) {
    let mut server = mockito::Server::new();
    let mut response = posteriors_response(&variants);
    response.versus_control.clear();
    let _mock = serve(&mut server, Matcher::Any, 200, serde_json::to_string(&response).unwrap());

    assert_eq!(
        backend_for(&server.url()).infer(&variants).unwrap_err(),
        InferenceError::ComparisonError(ComparisonError::MissingVersusControl)
    );
}

#[rstest]
fn refused_connection_is_retryable(variants: VariantSet) {
    let address = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

    let err =
        backend_for(&format!("http://{address}/")).run_analysis(&variants, true).unwrap_err();

    assert_matches!(err, RemoteInferenceError::RequestError { retryable: true, .. });
    assert!(err.is_retryable());
}

#[rstest]
fn silent_service_times_out(variants: VariantSet) {
    // Accepted by the kernel backlog but never answered.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    let config = RemoteBackendConfig {
        url: Url::parse(&format!("http://{address}/")).unwrap(),
        query_timeout_sec: 1,
        ..Default::default()
    };
    let backend = RemoteInferenceBackend::new(config, Arc::new(TracingDiagnostics)).unwrap();

    let err = backend.run_analysis(&variants, true).unwrap_err();

    assert_eq!(err, RemoteInferenceError::Timeout { timeout_sec: 1 });
    assert!(err.is_retryable());
    drop(listener);
}
