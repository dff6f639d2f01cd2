//! Circuit breaker guarding calls to a single downstream destination
//!
//! One breaker instance exists per destination and is shared (via `Clone`,
//! which shares state) by every caller for the lifetime of the process. All
//! state lives behind one mutex so that a failure increment, a state
//! transition and half-open probe admission happen as a single step: two
//! concurrent failures can never double-trip the breaker, and at most one
//! probe is in flight while half-open.
//!
//! ```text
//!            threshold consecutive            break_duration elapsed,
//!            transient failures               next caller admitted as probe
//!   Closed ───────────────────────► Open ─────────────────────────────► HalfOpen
//!     ▲                              ▲                                     │
//!     │        probe succeeded       │        probe failed (timer restarts)│
//!     └──────────────────────────────┼─────────────────────────────────────┤
//!                                    └─────────────────────────────────────┘
//! ```

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::ErrorClassification;

//==============================================================================
// Time Abstraction for Testability
//==============================================================================

/// Trait for time operations to enable deterministic testing
///
/// Production code uses [`SystemClock`]; tests use [`MockClock`] to move
/// time forward without sleeping.
pub trait Clock: Send + Sync + 'static {
    /// Get current instant (monotonic time)
    fn now(&self) -> Instant;
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient cloning
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same elapsed offset, so a test can hand one clone to a
/// breaker and advance time through another.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a new mock clock starting at the current instant
    pub fn new() -> Self {
        Self { start: Instant::now(), elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    /// Advance the mock clock by milliseconds (convenience method)
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Get the current elapsed time
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock()
    }
}

//==============================================================================
// Error Types
//==============================================================================

/// Simple configuration error for validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Configuration result type using simple config errors
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Returned by [`CircuitBreaker::try_acquire`] when no call may start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("circuit breaker is {state}, rejecting call")]
pub struct CircuitOpenError {
    /// State the breaker was in when the call was rejected
    pub state: CircuitState,
}

/// Errors produced by [`CircuitBreaker::execute`]
#[derive(Debug, Error)]
pub enum ResilienceError<E> {
    /// Circuit breaker is open, the operation was not attempted
    #[error("Circuit breaker is open, rejecting calls")]
    CircuitOpen,

    /// The underlying operation ran and failed
    #[error("Operation failed: {0}")]
    OperationFailed(E),
}

/// Result type for resilience operations
pub type ResilienceResult<T, E> = Result<T, ResilienceError<E>>;

//==============================================================================
// State & Configuration
//==============================================================================

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, allowing requests
    Closed,
    /// Circuit is open, rejecting requests
    Open,
    /// Circuit is half-open, allowing a single probe to test recovery
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures that open the circuit
    pub failure_threshold: u32,
    /// How long the circuit stays open before admitting a probe
    pub break_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { failure_threshold: 3, break_duration: Duration::from_secs(30) }
    }
}

impl CircuitBreakerConfig {
    /// Create a configuration builder
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::Invalid {
                message: "failure_threshold must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for CircuitBreakerConfig
#[derive(Debug)]
pub struct CircuitBreakerConfigBuilder {
    config: CircuitBreakerConfig,
}

impl Default for CircuitBreakerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreakerConfigBuilder {
    pub fn new() -> Self {
        Self { config: CircuitBreakerConfig::default() }
    }

    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    pub fn break_duration(mut self, duration: Duration) -> Self {
        self.config.break_duration = duration;
        self
    }

    pub fn build(self) -> ConfigResult<CircuitBreakerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

//==============================================================================
// Events & Metrics
//==============================================================================

/// State transitions reported to monitoring, one per transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakerEvent {
    /// The circuit opened (from Closed, or from HalfOpen after a failed probe)
    Opened { break_duration: Duration },
    /// The break elapsed and a probe call was admitted
    HalfOpened,
    /// A probe succeeded and the circuit closed again
    Reset,
}

/// Callback invoked for every [`BreakerEvent`], outside the state lock
pub type BreakerListener = Arc<dyn Fn(&str, &BreakerEvent) + Send + Sync>;

/// Circuit breaker metrics for monitoring
#[derive(Debug, Clone)]
pub struct CircuitBreakerMetrics {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub total_calls: u64,
    pub rejected_calls: u64,
    pub opened_at: Option<Instant>,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

//==============================================================================
// Circuit Breaker
//==============================================================================

/// Circuit breaker for one downstream destination
///
/// Cloning is cheap and shares state; hand clones to every caller of the same
/// destination rather than constructing a breaker per call.
pub struct CircuitBreaker<C: Clock = SystemClock> {
    name: Arc<str>,
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<BreakerInner>>,
    total_calls: Arc<AtomicU64>,
    rejected_calls: Arc<AtomicU64>,
    clock: Arc<C>,
    listener: Option<BreakerListener>,
}

impl<C: Clock> fmt::Debug for CircuitBreaker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("state", &inner.state)
            .field("consecutive_failures", &inner.consecutive_failures)
            .finish_non_exhaustive()
    }
}

impl<C: Clock> Clone for CircuitBreaker<C> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            config: self.config.clone(),
            inner: Arc::clone(&self.inner),
            total_calls: Arc::clone(&self.total_calls),
            rejected_calls: Arc::clone(&self.rejected_calls),
            clock: Arc::clone(&self.clock),
            listener: self.listener.clone(),
        }
    }
}

impl CircuitBreaker<SystemClock> {
    /// Create a new circuit breaker for `name` using the system clock
    pub fn new(name: impl Into<Arc<str>>, config: CircuitBreakerConfig) -> ConfigResult<Self> {
        Self::with_clock(name, config, SystemClock)
    }
}

impl<C: Clock> CircuitBreaker<C> {
    /// Create a new circuit breaker with a custom clock (useful for testing)
    pub fn with_clock(
        name: impl Into<Arc<str>>,
        config: CircuitBreakerConfig,
        clock: C,
    ) -> ConfigResult<Self> {
        config.validate()?;

        Ok(Self {
            name: name.into(),
            config,
            inner: Arc::new(Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                probe_in_flight: false,
            })),
            total_calls: Arc::new(AtomicU64::new(0)),
            rejected_calls: Arc::new(AtomicU64::new(0)),
            clock: Arc::new(clock),
            listener: None,
        })
    }

    /// Register a listener for state transition events
    #[must_use]
    pub fn with_listener(mut self, listener: BreakerListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Destination name used in logs and events
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration this breaker was built with
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Ask permission to start one call
    ///
    /// While open and inside the break window the call is rejected without
    /// side effects on the failure window. Once the window has elapsed the
    /// first caller transitions the breaker to half-open and receives the
    /// probe permit; everyone else is rejected until the probe reports back or
    /// its permit is dropped.
    pub fn try_acquire(&self) -> Result<CallPermit<'_, C>, CircuitOpenError> {
        let now = self.clock.now();
        let mut event = None;

        let admitted = {
            let mut inner = self.inner.lock();
            match inner.state {
                CircuitState::Closed => Ok(false),
                CircuitState::Open => {
                    let elapsed = inner
                        .opened_at
                        .map_or(Duration::MAX, |opened| now.saturating_duration_since(opened));
                    if elapsed >= self.config.break_duration {
                        inner.state = CircuitState::HalfOpen;
                        inner.probe_in_flight = true;
                        event = Some(BreakerEvent::HalfOpened);
                        Ok(true)
                    } else {
                        Err(CircuitOpenError { state: CircuitState::Open })
                    }
                }
                CircuitState::HalfOpen if inner.probe_in_flight => {
                    Err(CircuitOpenError { state: CircuitState::HalfOpen })
                }
                CircuitState::HalfOpen => {
                    inner.probe_in_flight = true;
                    Ok(true)
                }
            }
        };

        if let Some(event) = event {
            self.emit(&event);
        }

        match admitted {
            Ok(is_probe) => {
                self.total_calls.fetch_add(1, Ordering::Relaxed);
                Ok(CallPermit { breaker: self, is_probe, completed: false })
            }
            Err(rejection) => {
                self.rejected_calls.fetch_add(1, Ordering::Relaxed);
                debug!(breaker = %self.name, state = %rejection.state, "circuit breaker rejecting call");
                Err(rejection)
            }
        }
    }

    /// Execute an operation with circuit breaker protection
    ///
    /// Only retryable (transient) errors count against the failure window; a
    /// non-retryable error proves the destination answered and is recorded as
    /// a success.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> ResilienceResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ErrorClassification,
    {
        let permit = self.try_acquire().map_err(|_| ResilienceError::CircuitOpen)?;

        match operation().await {
            Ok(value) => {
                permit.record_success();
                Ok(value)
            }
            Err(error) => {
                if error.is_retryable() {
                    permit.record_failure();
                } else {
                    permit.record_success();
                }
                Err(ResilienceError::OperationFailed(error))
            }
        }
    }

    /// Get the current state of the circuit breaker
    ///
    /// This does not perform the open → half-open transition; only
    /// [`try_acquire`](Self::try_acquire) does.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Get circuit breaker metrics
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let inner = self.inner.lock();
        CircuitBreakerMetrics {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            total_calls: self.total_calls.load(Ordering::Relaxed),
            rejected_calls: self.rejected_calls.load(Ordering::Relaxed),
            opened_at: inner.opened_at,
        }
    }

    fn on_success(&self, is_probe: bool) {
        let event = {
            let mut inner = self.inner.lock();
            match inner.state {
                CircuitState::Closed => {
                    inner.consecutive_failures = 0;
                    None
                }
                CircuitState::HalfOpen if is_probe => {
                    inner.state = CircuitState::Closed;
                    inner.consecutive_failures = 0;
                    inner.opened_at = None;
                    inner.probe_in_flight = false;
                    Some(BreakerEvent::Reset)
                }
                // Outcome of a call admitted before the circuit opened.
                _ => None,
            }
        };

        if let Some(event) = event {
            self.emit(&event);
        }
    }

    fn on_failure(&self, is_probe: bool) {
        let now = self.clock.now();
        let event = {
            let mut inner = self.inner.lock();
            match inner.state {
                CircuitState::Closed => {
                    inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                    if inner.consecutive_failures >= self.config.failure_threshold {
                        inner.state = CircuitState::Open;
                        inner.opened_at = Some(now);
                        Some(BreakerEvent::Opened { break_duration: self.config.break_duration })
                    } else {
                        None
                    }
                }
                CircuitState::HalfOpen if is_probe => {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(now);
                    inner.probe_in_flight = false;
                    Some(BreakerEvent::Opened { break_duration: self.config.break_duration })
                }
                _ => None,
            }
        };

        if let Some(event) = event {
            self.emit(&event);
        }
    }

    fn on_abandoned(&self, is_probe: bool) {
        if !is_probe {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.state == CircuitState::HalfOpen {
            inner.probe_in_flight = false;
        }
    }

    fn emit(&self, event: &BreakerEvent) {
        match event {
            BreakerEvent::Opened { break_duration } => warn!(
                breaker = %self.name,
                break_duration_ms = break_duration.as_millis() as u64,
                "circuit breaker opened"
            ),
            BreakerEvent::HalfOpened => {
                info!(breaker = %self.name, "circuit breaker half-open, admitting probe")
            }
            BreakerEvent::Reset => info!(breaker = %self.name, "circuit breaker reset"),
        }

        if let Some(listener) = &self.listener {
            listener(&self.name, event);
        }
    }
}

/// Permission to run one call through a [`CircuitBreaker`]
///
/// Report the outcome with [`record_success`](Self::record_success) or
/// [`record_failure`](Self::record_failure). Dropping the permit without
/// reporting (for example when the caller's future is cancelled) leaves the
/// failure window untouched and frees the half-open probe slot.
#[must_use = "report the call outcome through the permit"]
pub struct CallPermit<'a, C: Clock> {
    breaker: &'a CircuitBreaker<C>,
    is_probe: bool,
    completed: bool,
}

impl<C: Clock> CallPermit<'_, C> {
    /// Whether this permit is the single half-open probe
    pub fn is_probe(&self) -> bool {
        self.is_probe
    }

    /// The call succeeded (or failed in a way that proves the destination is
    /// healthy)
    pub fn record_success(mut self) {
        self.completed = true;
        self.breaker.on_success(self.is_probe);
    }

    /// The call failed transiently
    pub fn record_failure(mut self) {
        self.completed = true;
        self.breaker.on_failure(self.is_probe);
    }
}

impl<C: Clock> Drop for CallPermit<'_, C> {
    fn drop(&mut self) {
        if !self.completed {
            self.breaker.on_abandoned(self.is_probe);
        }
    }
}

impl<C: Clock> fmt::Debug for CallPermit<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallPermit")
            .field("breaker", &self.breaker.name)
            .field("is_probe", &self.is_probe)
            .finish()
    }
}
