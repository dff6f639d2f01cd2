//! Resilient client for the vehicle service
//!
//! Every lookup runs through a retry executor wrapped around a circuit
//! breaker shared by all lookups against the same destination:
//!
//! ```text
//! fetch_vehicle ─▶ RetryExecutor ─▶ CircuitBreaker::execute ─▶ HTTP GET
//!                  (per lookup)     (per attempt, shared)      (one attempt)
//! ```
//!
//! Each attempt is individually visible to the breaker, so three failed
//! attempts of a single lookup are enough to open it with the default
//! threshold. An attempt that leaves the breaker open ends the lookup without
//! another backoff, keeping that attempt's own failure as the reason.
//!
//! A lookup never returns an error. Whatever goes wrong is folded into
//! [`FetchOutcome::Unavailable`] with a [`FetchFailure`] describing why.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use threadpilot_common::error::{ErrorClassification, ErrorSeverity};
use threadpilot_common::resilience::{
    BackoffStrategy, CircuitBreaker, CircuitBreakerConfig, CircuitState, Clock, ResilienceError,
    RetryConfig, RetryDecision, RetryError, RetryEvent, RetryExecutor, RetryOutcome, RetryPolicy,
    SystemClock,
};
use threadpilot_core::VehicleLookup;
use threadpilot_domain::constants::VEHICLE_SERVICE_NAME;
use threadpilot_domain::{
    Config, FetchFailure, FetchOutcome, RegistrationNumber, ResilienceConfig, Result,
    ThreadPilotError, VehicleInfo,
};
use tracing::{event, info, instrument, warn, Level};
use url::Url;

use crate::errors::InfraError;
use crate::http::{is_transient_error, HttpClient};
use crate::observability::metrics::FetchMetrics;

/// Why a single attempt against the vehicle service failed
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
        transient: bool,
    },

    #[error("unexpected status {status}")]
    Status { status: u16, transient: bool },

    #[error("circuit breaker is open")]
    CircuitOpen,

    #[error("malformed vehicle response: {0}")]
    Malformed(String),
}

impl ErrorClassification for AttemptError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { transient, .. } | Self::Status { transient, .. } => *transient,
            Self::CircuitOpen | Self::Malformed(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Transport { .. } => ErrorSeverity::Warning,
            Self::Status { transient: true, .. } => ErrorSeverity::Warning,
            Self::Status { transient: false, .. } => ErrorSeverity::Info,
            Self::CircuitOpen => ErrorSeverity::Warning,
            Self::Malformed(_) => ErrorSeverity::Error,
        }
    }
}

impl From<ResilienceError<AttemptError>> for AttemptError {
    fn from(value: ResilienceError<AttemptError>) -> Self {
        match value {
            ResilienceError::CircuitOpen => Self::CircuitOpen,
            ResilienceError::OperationFailed(error) => error,
        }
    }
}

/// Retries transient attempt failures while the breaker still admits calls
///
/// A failure that opened the breaker (the one reaching the threshold, or a
/// failed half-open probe) stops the lookup straight away.
pub struct RetryWhileClosed<C: Clock> {
    breaker: Arc<CircuitBreaker<C>>,
}

impl<C: Clock> RetryPolicy<AttemptError> for RetryWhileClosed<C> {
    fn should_retry(&self, error: &AttemptError, _attempt: u32) -> RetryDecision {
        if error.is_retryable() && self.breaker.state() != CircuitState::Open {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}

impl<C: Clock> fmt::Debug for RetryWhileClosed<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryWhileClosed").field("breaker", &self.breaker.name()).finish()
    }
}

/// Build the retry configuration for vehicle lookups
///
/// The delay before retry *n* is `backoff_base_secs^n` seconds.
pub fn retry_config(resilience: &ResilienceConfig) -> Result<RetryConfig> {
    let config = RetryConfig {
        max_attempts: resilience.max_attempts,
        backoff: BackoffStrategy::power_of(resilience.backoff_base_secs),
    };
    config.validate().map_err(|e| ThreadPilotError::Config(format!("retry: {e:?}")))?;
    Ok(config)
}

/// Build the circuit breaker configuration for vehicle lookups
pub fn breaker_config(resilience: &ResilienceConfig) -> Result<CircuitBreakerConfig> {
    CircuitBreakerConfig::builder()
        .failure_threshold(resilience.failure_threshold)
        .break_duration(resilience.break_duration())
        .build()
        .map_err(|e| ThreadPilotError::Config(format!("circuit breaker: {e}")))
}

/// Resilient HTTP lookup of vehicles by registration number
pub struct VehicleServiceClient<C: Clock = SystemClock> {
    http: HttpClient,
    base_url: Url,
    transient_statuses: Vec<u16>,
    retry: RetryExecutor<RetryWhileClosed<C>>,
    breaker: Arc<CircuitBreaker<C>>,
    metrics: Arc<FetchMetrics>,
}

impl VehicleServiceClient<SystemClock> {
    /// Build a client from service configuration
    ///
    /// # Errors
    /// Returns `ThreadPilotError::Config` when the base URL, retry settings
    /// or breaker settings are invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.vehicle_service.base_url)
            .map_err(|e| ThreadPilotError::from(InfraError::from(e)))?;

        let http = HttpClient::builder()
            .timeout(config.vehicle_service.timeout())
            .user_agent(concat!("threadpilot-insurance-service/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let breaker = CircuitBreaker::new(VEHICLE_SERVICE_NAME, breaker_config(&config.resilience)?)
            .map_err(|e| ThreadPilotError::Config(format!("circuit breaker: {e}")))?;

        Self::new(
            http,
            base_url,
            retry_config(&config.resilience)?,
            config.resilience.transient_statuses.clone(),
            breaker,
        )
    }
}

impl<C: Clock> VehicleServiceClient<C> {
    /// Assemble a client from its parts
    ///
    /// `base_url` must be able to carry path segments (`http`/`https`).
    pub fn new(
        http: HttpClient,
        base_url: Url,
        retry: RetryConfig,
        transient_statuses: Vec<u16>,
        breaker: CircuitBreaker<C>,
    ) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ThreadPilotError::Config(format!(
                "vehicle service URL cannot carry a path: {base_url}"
            )));
        }

        let metrics = Arc::new(FetchMetrics::new());
        let listener_metrics = Arc::clone(&metrics);
        let destination = breaker.name().to_string();
        let breaker = Arc::new(breaker);
        let policy = RetryWhileClosed { breaker: Arc::clone(&breaker) };
        let retry = RetryExecutor::new(retry, policy).with_listener(Arc::new(
            move |event: &RetryEvent| {
                listener_metrics.record_retry();
                warn!(
                    destination = %destination,
                    attempt = event.attempt,
                    delay_ms = event.delay.as_millis() as u64,
                    "vehicle lookup attempt failed, retrying after backoff"
                );
            },
        ));

        Ok(Self { http, base_url, transient_statuses, retry, breaker, metrics })
    }

    /// Breaker guarding the vehicle service
    pub fn breaker(&self) -> &CircuitBreaker<C> {
        &self.breaker
    }

    pub fn metrics(&self) -> Arc<FetchMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Look up one vehicle, absorbing every failure into the outcome
    #[instrument(skip(self), fields(destination = %self.breaker.name()))]
    pub async fn fetch_vehicle(&self, registration: &RegistrationNumber) -> FetchOutcome<VehicleInfo> {
        let started = Instant::now();
        let url = self.vehicle_url(registration);

        let url = &url;
        let RetryOutcome { result, attempts, total_delay } =
            self.retry.execute_with_outcome(move || self.attempt(url)).await;

        let severity = match &result {
            Ok(_) => ErrorSeverity::Info,
            Err(error) => error.last_error().map_or(ErrorSeverity::Error, |e| e.severity()),
        };
        let outcome = match result {
            Ok(vehicle) => FetchOutcome::Found(vehicle),
            Err(error) => FetchOutcome::Unavailable(failure_from(error)),
        };

        self.record(registration, &outcome, severity, attempts, total_delay, started.elapsed());
        outcome
    }

    /// `{base}/vehicle/{registration}` with the registration path-escaped
    fn vehicle_url(&self, registration: &RegistrationNumber) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("vehicle").push(registration.as_str());
        }
        url
    }

    async fn attempt(&self, url: &Url) -> std::result::Result<VehicleInfo, AttemptError> {
        self.breaker.execute(|| self.request_once(url)).await.map_err(AttemptError::from)
    }

    async fn request_once(&self, url: &Url) -> std::result::Result<VehicleInfo, AttemptError> {
        let request =
            self.http.request(Method::GET, url.clone()).header(ACCEPT, "application/json");
        let response = self.http.send(request).await.map_err(transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AttemptError::Status {
                status: status.as_u16(),
                transient: self.is_transient_status(status),
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        parse_vehicle(&body)
    }

    fn is_transient_status(&self, status: StatusCode) -> bool {
        status.is_server_error() || self.transient_statuses.contains(&status.as_u16())
    }

    fn record(
        &self,
        registration: &RegistrationNumber,
        outcome: &FetchOutcome<VehicleInfo>,
        severity: ErrorSeverity,
        attempts: u32,
        total_delay: Duration,
        elapsed: Duration,
    ) {
        self.metrics.record_fetch_time(elapsed);
        let total_delay_ms = total_delay.as_millis() as u64;

        match outcome {
            FetchOutcome::Found(_) => {
                self.metrics.record_found();
                info!(
                    destination = %self.breaker.name(),
                    %registration,
                    attempts,
                    total_delay_ms,
                    "vehicle lookup succeeded"
                );
            }
            FetchOutcome::Unavailable(failure) => {
                self.metrics.record_unavailable();
                if matches!(failure, FetchFailure::CircuitOpen) {
                    self.metrics.record_circuit_rejection();
                }
                let destination = self.breaker.name();
                macro_rules! unavailable {
                    ($level:expr) => {
                        event!(
                            $level,
                            destination = %destination,
                            %registration,
                            reason = failure.kind(),
                            error = %failure,
                            %severity,
                            attempts,
                            total_delay_ms,
                            "vehicle lookup unavailable"
                        )
                    };
                }
                match severity {
                    ErrorSeverity::Info => unavailable!(Level::INFO),
                    ErrorSeverity::Warning => unavailable!(Level::WARN),
                    ErrorSeverity::Error | ErrorSeverity::Critical => unavailable!(Level::ERROR),
                }
            }
        }
    }
}

impl<C: Clock> fmt::Debug for VehicleServiceClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VehicleServiceClient")
            .field("base_url", &self.base_url.as_str())
            .field("transient_statuses", &self.transient_statuses)
            .field("retry", &self.retry)
            .field("breaker", &self.breaker)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<C: Clock> VehicleLookup for VehicleServiceClient<C> {
    async fn fetch(&self, registration: &RegistrationNumber) -> FetchOutcome<VehicleInfo> {
        self.fetch_vehicle(registration).await
    }
}

fn transport_error(source: reqwest::Error) -> AttemptError {
    let transient = is_transient_error(&source);
    AttemptError::Transport { source, transient }
}

fn failure_from(error: RetryError<AttemptError>) -> FetchFailure {
    match error {
        RetryError::AttemptsExhausted { attempts, last } => {
            FetchFailure::RetriesExhausted { attempts, last_error: last.to_string() }
        }
        // Stopped early because the failure opened the breaker
        RetryError::NonRetryable { attempts, error } if error.is_retryable() => {
            FetchFailure::RetriesExhausted { attempts, last_error: error.to_string() }
        }
        RetryError::NonRetryable { error, .. } => match error {
            AttemptError::CircuitOpen => FetchFailure::CircuitOpen,
            AttemptError::Status { status, .. } => FetchFailure::Rejected { status },
            AttemptError::Malformed(message) => FetchFailure::Malformed { message },
            AttemptError::Transport { source, .. } => {
                FetchFailure::Transport { message: source.to_string() }
            }
        },
        RetryError::InvalidConfiguration { message } => FetchFailure::Transport { message },
    }
}

/// Wire shape of `GET /vehicle/{registration}`, with keys lower-cased
#[derive(Debug, Deserialize)]
struct VehicleEnvelope {
    #[serde(default)]
    vehicle: Option<VehicleDto>,
}

#[derive(Debug, Deserialize)]
struct VehicleDto {
    #[serde(rename = "registrationnumber")]
    registration_number: String,
    make: String,
    model: String,
    year: i32,
    color: String,
    #[serde(rename = "vinnumber")]
    vin_number: String,
}

impl From<VehicleDto> for VehicleInfo {
    fn from(dto: VehicleDto) -> Self {
        Self {
            registration_number: dto.registration_number,
            make: dto.make,
            model: dto.model,
            year: dto.year,
            color: dto.color,
            vin_number: dto.vin_number,
        }
    }
}

/// Decode a vehicle response body, matching field names case-insensitively
fn parse_vehicle(body: &[u8]) -> std::result::Result<VehicleInfo, AttemptError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| AttemptError::Malformed(e.to_string()))?;
    let envelope: VehicleEnvelope = serde_json::from_value(lowercase_keys(value))
        .map_err(|e| AttemptError::Malformed(e.to_string()))?;

    envelope
        .vehicle
        .map(VehicleInfo::from)
        .ok_or_else(|| AttemptError::Malformed("response contains no vehicle".to_string()))
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter().map(|(k, v)| (k.to_ascii_lowercase(), lowercase_keys(v))).collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}
