//! End-to-end classification checks against a mock endpoint.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use probr_common::headers::HeaderSet;
use probr_common::target;
use probr_core::probe::{ProbeError, ProbeOutcome, ServiceProbe};

const BANNER: &str = "Ollama is running";

fn test_probe() -> ServiceProbe {
    ServiceProbe::new(
        &HeaderSet::with_agent("probr-test-agent"),
        Duration::from_secs(5),
        None,
    )
    .expect("probe construction failed")
}

async fn mock_instance(banner_status: u16, banner: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(banner_status).set_body_string(banner))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn fingerprint_match_yields_confirmed_with_version() {
    let server = mock_instance(200, BANNER).await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"version": "0.1.0"})),
        )
        .mount(&server)
        .await;

    let endpoint = target::normalize(&server.uri());
    let outcome = test_probe().probe(&endpoint).await.unwrap();

    assert_eq!(
        outcome,
        ProbeOutcome::Confirmed {
            endpoint: endpoint.clone(),
            content_length: BANNER.len(),
            version: Some("0.1.0".to_string()),
        }
    );
}

#[tokio::test]
async fn version_endpoint_failure_does_not_downgrade_the_match() {
    // No /api/version mock mounted: the secondary request 404s
    let server = mock_instance(200, BANNER).await;

    let endpoint = target::normalize(&server.uri());
    let outcome = test_probe().probe(&endpoint).await.unwrap();

    match outcome {
        ProbeOutcome::Confirmed { version, .. } => {
            assert_eq!(version, None, "version should be absent, not fabricated")
        }
        other => panic!("expected Confirmed, got {:?}", other),
    }
}

#[tokio::test]
async fn foreign_body_yields_rejected_with_observed_status() {
    let server = mock_instance(200, "<html>some other service</html>").await;

    let endpoint = target::normalize(&server.uri());
    let outcome = test_probe().probe(&endpoint).await.unwrap();

    assert_eq!(
        outcome,
        ProbeOutcome::Rejected {
            endpoint: endpoint.clone(),
            status: 200,
        }
    );
}

#[tokio::test]
async fn not_found_yields_rejected_404() {
    let server = mock_instance(404, "not found").await;

    let endpoint = target::normalize(&server.uri());
    let outcome = test_probe().probe(&endpoint).await.unwrap();

    assert!(matches!(
        outcome,
        ProbeOutcome::Rejected { status: 404, .. }
    ));
}

#[tokio::test]
async fn marker_tokens_must_both_be_present() {
    // Name token without the state token is not a match
    let server = mock_instance(200, "Ollama").await;

    let endpoint = target::normalize(&server.uri());
    let outcome = test_probe().probe(&endpoint).await.unwrap();

    assert!(matches!(outcome, ProbeOutcome::Rejected { .. }));
}

#[tokio::test]
async fn status_503_trips_the_circuit_breaker() {
    let server = mock_instance(503, "go away").await;

    let endpoint = target::normalize(&server.uri());
    let result = test_probe().probe(&endpoint).await;

    assert!(matches!(result, Err(ProbeError::CircuitBreak { .. })));
}

#[tokio::test]
async fn unreachable_target_yields_errored() {
    // Port 1 on loopback refuses connections
    let endpoint = "http://127.0.0.1:1/";
    let outcome = test_probe().probe(endpoint).await.unwrap();

    match outcome {
        ProbeOutcome::Errored {
            endpoint: reported, ..
        } => assert_eq!(reported, endpoint),
        other => panic!("expected Errored, got {:?}", other),
    }
}
