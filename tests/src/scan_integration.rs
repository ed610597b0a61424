//! Batch semantics: throttled iteration, failure isolation, the 503 hard
//! stop, and sink routing.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use probr_common::headers::HeaderSet;
use probr_common::target;
use probr_core::probe::{ProbeError, ServiceProbe};
use probr_core::report::MemorySink;
use probr_core::scanner::{ScanError, ScanSession};

const BANNER: &str = "Ollama is running";

fn test_probe() -> ServiceProbe {
    ServiceProbe::new(
        &HeaderSet::with_agent("probr-test-agent"),
        Duration::from_secs(5),
        None,
    )
    .expect("probe construction failed")
}

async fn confirming_instance(version: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BANNER))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"version": version})),
        )
        .mount(&server)
        .await;
    server
}

async fn rejecting_instance(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(status).set_body_string("something else"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn mixed_batch_confirms_rejects_and_isolates_failures() {
    // One confirming, one rejecting with 404, one refusing the
    // connection outright.
    let confirming = confirming_instance("0.1.0").await;
    let rejecting = rejecting_instance(404).await;

    let candidates = vec![
        confirming.uri(),
        format!("{}/", rejecting.uri()),
        "127.0.0.1:1".to_string(),
    ];

    let probe = test_probe();
    let mut results = MemorySink::default();
    let mut failures = MemorySink::default();
    let confirmed = {
        let mut session =
            ScanSession::new(&probe, Duration::from_millis(1), &mut results, &mut failures);
        session.run_batch(&candidates).await.unwrap()
    };

    assert_eq!(confirmed, 1, "exactly one candidate should confirm");

    assert_eq!(results.lines.len(), 1);
    let expected_endpoint = target::normalize(&confirming.uri());
    assert!(
        results.lines[0].starts_with(&expected_endpoint),
        "result line '{}' should start with '{}'",
        results.lines[0],
        expected_endpoint
    );

    assert_eq!(failures.lines.len(), 1, "one transport error, one log line");
    assert!(
        failures.lines[0].contains("127.0.0.1:1"),
        "failure line should name the refusing target: {}",
        failures.lines[0]
    );
}

#[tokio::test]
async fn failure_in_the_middle_does_not_abort_the_batch() {
    let first = confirming_instance("0.2.0").await;
    let last = confirming_instance("0.3.0").await;

    let candidates = vec![first.uri(), "127.0.0.1:1".to_string(), last.uri()];

    let probe = test_probe();
    let mut results = MemorySink::default();
    let mut failures = MemorySink::default();
    let confirmed = {
        let mut session =
            ScanSession::new(&probe, Duration::from_millis(1), &mut results, &mut failures);
        session.run_batch(&candidates).await.unwrap()
    };

    assert_eq!(confirmed, 2, "both reachable candidates should confirm");
    assert_eq!(results.lines.len(), 2);
    assert_eq!(failures.lines.len(), 1);

    // The candidate after the failing one was actually probed
    let last_hits = last.received_requests().await.unwrap();
    assert!(!last_hits.is_empty(), "batch stopped at the failing target");
}

#[tokio::test]
async fn circuit_breaker_processes_zero_subsequent_candidates() {
    let breaker = rejecting_instance(503).await;
    let untouched = confirming_instance("0.1.0").await;

    let candidates = vec![breaker.uri(), untouched.uri(), untouched.uri()];

    let probe = test_probe();
    let mut results = MemorySink::default();
    let mut failures = MemorySink::default();
    let result = {
        let mut session =
            ScanSession::new(&probe, Duration::from_millis(1), &mut results, &mut failures);
        session.run_batch(&candidates).await
    };

    assert!(matches!(
        result,
        Err(ScanError::Probe(ProbeError::CircuitBreak { .. }))
    ));

    let hits = untouched.received_requests().await.unwrap();
    assert!(
        hits.is_empty(),
        "no candidate after the 503 may be probed, saw {} requests",
        hits.len()
    );
    assert!(results.lines.is_empty());
}

#[tokio::test]
async fn empty_candidate_list_is_a_no_op() {
    let probe = test_probe();
    let mut results = MemorySink::default();
    let mut failures = MemorySink::default();
    let confirmed = {
        let mut session =
            ScanSession::new(&probe, Duration::from_millis(1), &mut results, &mut failures);
        session.run_batch(Vec::<String>::new()).await.unwrap()
    };

    assert_eq!(confirmed, 0);
    assert!(results.lines.is_empty());
    assert!(failures.lines.is_empty());
}

#[tokio::test]
async fn version_miss_is_logged_but_still_counts_as_confirmed() {
    // Fingerprint matches but api/version is not mocked
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BANNER))
        .mount(&server)
        .await;

    let probe = test_probe();
    let mut results = MemorySink::default();
    let mut failures = MemorySink::default();
    let confirmed = {
        let mut session =
            ScanSession::new(&probe, Duration::from_millis(1), &mut results, &mut failures);
        session.run_batch(vec![server.uri()]).await.unwrap()
    };

    assert_eq!(confirmed, 1, "a version miss must not downgrade the match");
    assert_eq!(results.lines.len(), 1);
    assert_eq!(failures.lines.len(), 1, "the miss itself is logged");
}

#[tokio::test]
async fn rejected_outcomes_leave_no_persistent_record() {
    let rejecting = rejecting_instance(200).await;

    let probe = test_probe();
    let mut results = MemorySink::default();
    let mut failures = MemorySink::default();
    let confirmed = {
        let mut session =
            ScanSession::new(&probe, Duration::from_millis(1), &mut results, &mut failures);
        session.run_batch(vec![rejecting.uri()]).await.unwrap()
    };

    assert_eq!(confirmed, 0);
    assert!(results.lines.is_empty(), "rejections must not be persisted");
    assert!(failures.lines.is_empty(), "rejections are not failures");
}

#[tokio::test]
async fn observer_sees_every_outcome_in_order() {
    use std::sync::{Arc, Mutex};

    let confirming = confirming_instance("0.1.0").await;
    let rejecting = rejecting_instance(404).await;

    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_ref = seen.clone();

    let probe = test_probe();
    let mut results = MemorySink::default();
    let mut failures = MemorySink::default();
    {
        let mut session =
            ScanSession::new(&probe, Duration::from_millis(1), &mut results, &mut failures)
                .with_observer(Box::new(move |outcome| {
                    seen_ref.lock().unwrap().push(outcome.endpoint().to_string());
                }));
        session
            .run_batch(vec![confirming.uri(), rejecting.uri()])
            .await
            .unwrap();
    }

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            target::normalize(&confirming.uri()),
            target::normalize(&rejecting.uri()),
        ]
    );
}
