//! Generic retry executor with exponential backoff
//!
//! The executor runs an operation up to `max_attempts` times. After each
//! failure the [`RetryPolicy`] decides whether the failure is worth another
//! attempt; if it is, the executor waits out the backoff delay and tries
//! again. When attempts run out, the *last* failure is handed back inside
//! [`RetryError::AttemptsExhausted`] so the caller can decide what the failure
//! means. The executor never decides that on its own.
//!
//! Every scheduled retry is reported through an optional [`RetryListener`]
//! and a `tracing` event. Neither can influence control flow.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

/// Errors returned once the executor stops retrying
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error
    #[error("All retry attempts exhausted after {attempts} tries: {last}")]
    AttemptsExhausted { attempts: u32, last: E },

    /// The policy refused to retry this failure
    #[error("Operation failed with non-retryable error: {error}")]
    NonRetryable { attempts: u32, error: E },

    /// The retry configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            Self::AttemptsExhausted { attempts, .. } | Self::NonRetryable { attempts, .. } => {
                *attempts
            }
            Self::InvalidConfiguration { .. } => 0,
        }
    }

    /// The last failure produced by the operation, if any attempt ran
    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::AttemptsExhausted { last, .. } => Some(last),
            Self::NonRetryable { error, .. } => Some(error),
            Self::InvalidConfiguration { .. } => None,
        }
    }

    /// Consume the error and return the last failure, if any attempt ran
    pub fn into_last_error(self) -> Option<E> {
        match self {
            Self::AttemptsExhausted { last, .. } => Some(last),
            Self::NonRetryable { error, .. } => Some(error),
            Self::InvalidConfiguration { .. } => None,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Outcome of a retry execution including result and summary statistics.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: RetryResult<T, E>,
    pub attempts: u32,
    pub total_delay: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide what to do after `attempt` (1-based) failed with `error`
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Retry the operation with a custom delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: `initial_delay * base^retry`, capped at `max_delay`
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Exponential backoff where the delay before retry *n* is `base_secs^n`
    /// seconds (2s, 4s, 8s, ... for a base of 2)
    pub fn power_of(base_secs: u32) -> Self {
        Self::Exponential {
            initial_delay: Duration::from_secs(u64::from(base_secs)),
            base: f64::from(base_secs),
            max_delay: Duration::from_secs(300),
        }
    }

    /// Calculate the delay before the retry with the given 0-based index
    pub fn calculate_delay(&self, retry: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
                let delay = initial_delay.as_millis() as f64 * base.powi(exponent);
                let delay_ms = delay.min(max_delay.as_millis() as f64) as u64;
                Duration::from_millis(delay_ms)
            }
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, backoff: BackoffStrategy::power_of(2) }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }

        match &self.backoff {
            BackoffStrategy::Exponential { base, .. } if *base <= 0.0 => {
                return Err(RetryError::InvalidConfiguration {
                    message: "exponential base must be greater than 0".to_string(),
                });
            }
            _ => {}
        }

        Ok(())
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryError<()>> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// A retry that is about to be scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryEvent {
    /// The attempt that just failed (1-based)
    pub attempt: u32,
    /// Delay before the next attempt
    pub delay: Duration,
}

/// Callback invoked before each backoff sleep
pub type RetryListener = Arc<dyn Fn(&RetryEvent) + Send + Sync>;

/// The main retry executor
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
    listener: Option<RetryListener>,
}

impl<P: fmt::Debug> fmt::Debug for RetryExecutor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy, listener: None }
    }

    /// Register a listener notified of every scheduled retry
    #[must_use]
    pub fn with_listener(mut self, listener: RetryListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(operation).await.into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics.
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0u32;
        let mut total_delay = Duration::ZERO;

        loop {
            attempt += 1;
            debug!("Executing operation (attempt {}/{})", attempt, max_attempts);

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Operation succeeded after {} retries", attempt - 1);
                    }
                    return RetryOutcome { result: Ok(value), attempts: attempt, total_delay };
                }
                Err(error) => error,
            };

            let delay = match self.policy.should_retry(&error, attempt) {
                RetryDecision::Stop => {
                    debug!("Retry policy determined not to retry: {:?}", error);
                    return RetryOutcome {
                        result: Err(RetryError::NonRetryable { attempts: attempt, error }),
                        attempts: attempt,
                        total_delay,
                    };
                }
                RetryDecision::Retry => self.config.backoff.calculate_delay(attempt - 1),
                RetryDecision::RetryAfter(custom_delay) => custom_delay,
            };

            if attempt >= max_attempts {
                warn!(
                    "All retry attempts exhausted after {} tries, last error: {:?}",
                    attempt, error
                );
                return RetryOutcome {
                    result: Err(RetryError::AttemptsExhausted { attempts: attempt, last: error }),
                    attempts: attempt,
                    total_delay,
                };
            }

            self.notify(RetryEvent { attempt, delay });
            tokio::time::sleep(delay).await;
            total_delay += delay;
        }
    }

    fn notify(&self, event: RetryEvent) {
        debug!(
            attempt = event.attempt,
            delay_ms = event.delay.as_millis() as u64,
            "Operation failed, retrying after backoff"
        );
        if let Some(listener) = &self.listener {
            listener(&event);
        }
    }
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::{RetryDecision, RetryPolicy};
    use crate::error::ErrorClassification;

    /// Always retry policy - retries on any error
    #[derive(Debug, Clone, Copy, Default)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Never retry policy - never retries
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }

    /// Retries exactly the errors that classify themselves as retryable
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Classified;

    impl<E: ErrorClassification> RetryPolicy<E> for Classified {
        fn should_retry(&self, error: &E, _attempt: u32) -> RetryDecision {
            if error.is_retryable() {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for retry strategies and policies
    //!
    //! Tests cover backoff calculation, configuration validation, the
    //! executor's attempt cap and last-failure hand-back, policy decisions and
    //! the retry listener. Timing tests run on tokio's paused clock.

    use std::sync::atomic::{AtomicU32, Ordering};

    use parking_lot::Mutex;
    use tokio::time::Instant;

    use super::policies::*;
    use super::*;
    use crate::error::{ErrorClassification, ErrorSeverity};

    #[derive(Debug, Clone, PartialEq)]
    enum TestError {
        Unavailable(u32),
        BadRequest,
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl ErrorClassification for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, Self::Unavailable(_))
        }

        fn severity(&self) -> ErrorSeverity {
            ErrorSeverity::Warning
        }
    }

    #[test]
    fn test_default_config_matches_backoff_schedule() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff.calculate_delay(0), Duration::from_secs(2));
        assert_eq!(config.backoff.calculate_delay(1), Duration::from_secs(4));
        assert_eq!(config.backoff.calculate_delay(2), Duration::from_secs(8));
    }

    #[test]
    fn test_power_of_other_bases() {
        let backoff = BackoffStrategy::power_of(3);
        assert_eq!(backoff.calculate_delay(0), Duration::from_secs(3));
        assert_eq!(backoff.calculate_delay(1), Duration::from_secs(9));
    }

    #[test]
    fn test_exponential_caps_at_max_delay() {
        let strategy = BackoffStrategy::Exponential {
            initial_delay: Duration::from_millis(100),
            base: 2.0,
            max_delay: Duration::from_secs(1),
        };

        assert_eq!(strategy.calculate_delay(2), Duration::from_millis(400));
        assert_eq!(strategy.calculate_delay(20), Duration::from_secs(1));
    }

    #[test]
    fn test_fixed_backoff() {
        let strategy = BackoffStrategy::Fixed(Duration::from_millis(100));
        assert_eq!(strategy.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(strategy.calculate_delay(7), Duration::from_millis(100));
    }

    #[test]
    fn test_config_validation() {
        assert!(RetryConfig::builder().max_attempts(0).build().is_err());
        assert!(RetryConfig::builder()
            .exponential_backoff(Duration::from_millis(1), 0.0, Duration::from_secs(1))
            .build()
            .is_err());
        assert!(RetryConfig::builder()
            .max_attempts(5)
            .fixed_backoff(Duration::from_millis(1))
            .build()
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt_does_not_sleep() {
        let executor = RetryExecutor::new(RetryConfig::default(), Classified);
        let start = Instant::now();

        let outcome = executor.execute_with_outcome(|| async { Ok::<_, TestError>(7) }).await;

        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.total_delay, Duration::ZERO);
        assert_eq!(outcome.into_result().expect("success"), 7);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_failure_after_two_and_four_seconds() {
        let executor = RetryExecutor::new(RetryConfig::default(), Classified);
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let outcome = executor
            .execute_with_outcome(|| async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Err::<(), _>(TestError::Unavailable(n))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.total_delay, Duration::from_secs(6));
        assert!(start.elapsed() >= Duration::from_secs(6));
        match outcome.result {
            Err(RetryError::AttemptsExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last, TestError::Unavailable(3));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_stops_immediately() {
        let executor = RetryExecutor::new(RetryConfig::default(), Classified);
        let calls = AtomicU32::new(0);

        let result = executor
            .execute(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError::BadRequest)
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let error = result.expect_err("non-retryable");
        assert_eq!(error.attempts(), 1);
        assert_eq!(error.last_error(), Some(&TestError::BadRequest));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_on_second_attempt() {
        let executor = RetryExecutor::new(RetryConfig::default(), Classified);
        let calls = AtomicU32::new(0);

        let outcome = executor
            .execute_with_outcome(|| async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 2 {
                    Err(TestError::Unavailable(n))
                } else {
                    Ok("recovered")
                }
            })
            .await;

        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.total_delay, Duration::from_secs(2));
        assert_eq!(outcome.into_result().expect("recovered"), "recovered");
    }

    #[tokio::test(start_paused = true)]
    async fn test_listener_observes_each_retry() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let executor = RetryExecutor::new(RetryConfig::default(), AlwaysRetry)
            .with_listener(Arc::new(move |event: &RetryEvent| sink.lock().push(*event)));

        let _ = executor.execute(|| async { Err::<(), _>(TestError::Unavailable(0)) }).await;

        assert_eq!(
            *events.lock(),
            vec![
                RetryEvent { attempt: 1, delay: Duration::from_secs(2) },
                RetryEvent { attempt: 2, delay: Duration::from_secs(4) },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_overrides_backoff() {
        struct FixedPause;
        impl RetryPolicy<TestError> for FixedPause {
            fn should_retry(&self, _error: &TestError, _attempt: u32) -> RetryDecision {
                RetryDecision::RetryAfter(Duration::from_millis(50))
            }
        }

        let executor = RetryExecutor::new(RetryConfig::default(), FixedPause);
        let outcome = executor
            .execute_with_outcome(|| async { Err::<(), _>(TestError::Unavailable(1)) })
            .await;

        assert_eq!(outcome.total_delay, Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_never_retry_runs_once() {
        let executor = RetryExecutor::new(RetryConfig::default(), NeverRetry);
        let calls = AtomicU32::new(0);

        let _ = executor
            .execute(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError::Unavailable(1))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retry_error_display() {
        let error: RetryError<TestError> =
            RetryError::AttemptsExhausted { attempts: 3, last: TestError::Unavailable(3) };
        assert_eq!(error.to_string(), "All retry attempts exhausted after 3 tries: Unavailable(3)");
        assert_eq!(error.into_last_error(), Some(TestError::Unavailable(3)));
    }
}
