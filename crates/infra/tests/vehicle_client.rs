//! Integration tests for the resilient vehicle service client
//!
//! A wiremock server stands in for the vehicle service. Backoff is shortened
//! to a few milliseconds and the breaker runs on a `MockClock`, so the open →
//! half-open transition is driven without sleeping.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use threadpilot_common::resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, MockClock, RetryConfig,
};
use threadpilot_core::VehicleLookup;
use threadpilot_domain::{FetchFailure, FetchOutcome, RegistrationNumber};
use threadpilot_infra::{HttpClient, VehicleServiceClient};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BREAK_DURATION: Duration = Duration::from_secs(30);

struct Harness {
    server: MockServer,
    clock: MockClock,
    client: VehicleServiceClient<Arc<MockClock>>,
}

struct Settings {
    max_attempts: u32,
    failure_threshold: u32,
    timeout: Duration,
    transient_statuses: Vec<u16>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            failure_threshold: 3,
            timeout: Duration::from_secs(5),
            transient_statuses: vec![408],
        }
    }
}

async fn harness(settings: Settings) -> Harness {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let (client, clock) = build_client(base_url, &settings);
    Harness { server, clock, client }
}

fn build_client(
    base_url: Url,
    settings: &Settings,
) -> (VehicleServiceClient<Arc<MockClock>>, MockClock) {
    let clock = MockClock::new();
    let breaker = CircuitBreaker::with_clock(
        "vehicle-service",
        CircuitBreakerConfig::builder()
            .failure_threshold(settings.failure_threshold)
            .break_duration(BREAK_DURATION)
            .build()
            .unwrap(),
        Arc::new(clock.clone()),
    )
    .unwrap();
    let retry = RetryConfig::builder()
        .max_attempts(settings.max_attempts)
        .fixed_backoff(Duration::from_millis(5))
        .build()
        .unwrap();
    let http = HttpClient::builder().timeout(settings.timeout).build().unwrap();

    let client = VehicleServiceClient::new(
        http,
        base_url,
        retry,
        settings.transient_statuses.clone(),
        breaker,
    )
    .unwrap();
    (client, clock)
}

fn camry_body() -> serde_json::Value {
    json!({
        "vehicle": {
            "registrationNumber": "ABC123",
            "make": "Toyota",
            "model": "Camry",
            "year": 2022,
            "color": "Blue",
            "vinNumber": "1HGBH41JXMN109186"
        }
    })
}

fn abc123() -> RegistrationNumber {
    RegistrationNumber::from("ABC123")
}

#[tokio::test]
async fn found_vehicle_is_returned() {
    let h = harness(Settings::default()).await;
    Mock::given(method("GET"))
        .and(path("/api/vehicle/ABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(camry_body()))
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = h.client.fetch(&abc123()).await;

    let vehicle = outcome.found().expect("vehicle found");
    assert_eq!(vehicle.make, "Toyota");
    assert_eq!(vehicle.vin_number, "1HGBH41JXMN109186");
    let metrics = h.client.metrics().snapshot();
    assert_eq!(metrics.found, 1);
    assert_eq!(metrics.retries, 0);
}

#[tokio::test]
async fn pascal_case_fields_are_accepted() {
    let h = harness(Settings::default()).await;
    Mock::given(method("GET"))
        .and(path("/api/vehicle/XYZ789"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Vehicle": {
                "RegistrationNumber": "XYZ789",
                "Make": "Honda",
                "Model": "Civic",
                "Year": 2021,
                "Color": "Red",
                "VinNumber": "2HGBH41JXMN109187"
            }
        })))
        .mount(&h.server)
        .await;

    let outcome = h.client.fetch(&"XYZ789".into()).await;

    assert_eq!(outcome.found().map(|v| v.model), Some("Civic".to_string()));
}

#[tokio::test]
async fn not_found_is_not_retried_and_keeps_breaker_closed() {
    let h = harness(Settings::default()).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = h.client.fetch(&abc123()).await;

    assert_eq!(outcome, FetchOutcome::Unavailable(FetchFailure::Rejected { status: 404 }));
    let breaker = h.client.breaker().metrics();
    assert_eq!(breaker.state, CircuitState::Closed);
    assert_eq!(breaker.consecutive_failures, 0);
}

#[tokio::test]
async fn server_errors_exhaust_retries_and_open_the_breaker() {
    let h = harness(Settings::default()).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&h.server)
        .await;

    let outcome = h.client.fetch(&abc123()).await;

    assert!(matches!(
        outcome,
        FetchOutcome::Unavailable(FetchFailure::RetriesExhausted { attempts: 3, .. })
    ));
    assert_eq!(h.client.breaker().state(), CircuitState::Open);
    assert_eq!(h.client.metrics().snapshot().retries, 2);
}

#[tokio::test]
async fn open_breaker_rejects_without_a_request() {
    let h = harness(Settings::default()).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&h.server)
        .await;

    let _ = h.client.fetch(&abc123()).await;
    let outcome = h.client.fetch(&"XYZ789".into()).await;

    assert_eq!(outcome, FetchOutcome::Unavailable(FetchFailure::CircuitOpen));
    let metrics = h.client.metrics().snapshot();
    assert_eq!(metrics.circuit_rejections, 1);
    assert_eq!(metrics.unavailable, 2);
    assert_eq!(h.client.breaker().metrics().rejected_calls, 1);
}

#[tokio::test]
async fn breaker_opening_mid_lookup_ends_the_lookup() {
    let h = harness(Settings { failure_threshold: 2, ..Settings::default() }).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&h.server)
        .await;

    let outcome = h.client.fetch(&abc123()).await;

    assert_eq!(
        outcome,
        FetchOutcome::Unavailable(FetchFailure::RetriesExhausted {
            attempts: 2,
            last_error: "unexpected status 502".to_string(),
        })
    );
    let metrics = h.client.metrics().snapshot();
    assert_eq!(metrics.retries, 1);
    assert_eq!(metrics.circuit_rejections, 0);
    assert_eq!(h.client.breaker().state(), CircuitState::Open);
}

#[tokio::test]
async fn failed_half_open_attempt_ends_the_lookup_with_its_own_error() {
    let h = harness(Settings::default()).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&h.server)
        .await;

    let _ = h.client.fetch(&abc123()).await;
    assert_eq!(h.client.breaker().state(), CircuitState::Open);

    h.clock.advance(BREAK_DURATION);
    let outcome = h.client.fetch(&abc123()).await;

    assert_eq!(
        outcome,
        FetchOutcome::Unavailable(FetchFailure::RetriesExhausted {
            attempts: 1,
            last_error: "unexpected status 503".to_string(),
        })
    );
    assert_eq!(h.client.breaker().state(), CircuitState::Open);
    let metrics = h.client.metrics().snapshot();
    assert_eq!(metrics.retries, 2);
    assert_eq!(metrics.circuit_rejections, 0);
}

#[tokio::test]
async fn probe_after_break_closes_the_breaker() {
    let h = harness(Settings::default()).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(3)
        .expect(3)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/vehicle/ABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(camry_body()))
        .expect(1)
        .mount(&h.server)
        .await;

    let _ = h.client.fetch(&abc123()).await;
    assert_eq!(h.client.breaker().state(), CircuitState::Open);

    h.clock.advance(BREAK_DURATION);
    let outcome = h.client.fetch(&abc123()).await;

    assert!(outcome.is_found());
    assert_eq!(h.client.breaker().state(), CircuitState::Closed);
}

#[tokio::test]
async fn transient_failure_then_success() {
    let h = harness(Settings::default()).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(camry_body()))
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = h.client.fetch(&abc123()).await;

    assert!(outcome.is_found());
    assert_eq!(h.client.metrics().snapshot().retries, 1);
    assert_eq!(h.client.breaker().metrics().consecutive_failures, 0);
}

#[tokio::test]
async fn configured_status_is_treated_as_transient() {
    let h = harness(Settings { transient_statuses: vec![429], ..Settings::default() }).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&h.server)
        .await;

    let outcome = h.client.fetch(&abc123()).await;

    assert!(matches!(
        outcome,
        FetchOutcome::Unavailable(FetchFailure::RetriesExhausted { attempts: 3, .. })
    ));
}

#[tokio::test]
async fn malformed_body_is_not_retried() {
    let h = harness(Settings::default()).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = h.client.fetch(&abc123()).await;

    assert!(matches!(outcome, FetchOutcome::Unavailable(FetchFailure::Malformed { .. })));
    assert_eq!(h.client.breaker().state(), CircuitState::Closed);
}

#[tokio::test]
async fn null_vehicle_is_malformed() {
    let h = harness(Settings::default()).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vehicle": null })))
        .mount(&h.server)
        .await;

    let outcome = h.client.fetch(&abc123()).await;

    assert!(matches!(outcome, FetchOutcome::Unavailable(FetchFailure::Malformed { .. })));
}

#[tokio::test]
async fn slow_responses_time_out_and_are_retried() {
    let h = harness(Settings {
        timeout: Duration::from_millis(100),
        failure_threshold: 10,
        ..Settings::default()
    })
    .await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(camry_body())
                .set_delay(Duration::from_secs(2)),
        )
        .expect(3)
        .mount(&h.server)
        .await;

    let outcome = h.client.fetch(&abc123()).await;

    assert!(matches!(
        outcome,
        FetchOutcome::Unavailable(FetchFailure::RetriesExhausted { attempts: 3, .. })
    ));
}

#[tokio::test]
async fn registration_is_path_escaped() {
    let h = harness(Settings::default()).await;
    Mock::given(method("GET"))
        .and(path("/api/vehicle/AB%2FC%201"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = h.client.fetch(&"AB/C 1".into()).await;

    assert_eq!(outcome, FetchOutcome::Unavailable(FetchFailure::Rejected { status: 404 }));
}

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base_url = Url::parse(&format!("http://{addr}/api")).unwrap();
    let (client, _clock) = build_client(base_url, &Settings::default());

    let outcome = client.fetch(&abc123()).await;

    assert!(matches!(
        outcome,
        FetchOutcome::Unavailable(FetchFailure::RetriesExhausted { attempts: 3, .. })
    ));
    assert_eq!(client.breaker().state(), CircuitState::Open);
}
