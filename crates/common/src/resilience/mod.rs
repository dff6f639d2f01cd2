//! Resilience patterns for fault tolerance and error handling
//!
//! This module provides **generic, reusable** resilience patterns:
//! - **Circuit Breaker**: stops calling a destination after repeated transient
//!   failures and probes it again after a cooldown
//! - **Retry Logic**: bounded attempts with exponential backoff, classifying
//!   each failure through a [`RetryPolicy`]
//!
//! The two are separate components. Callers compose them explicitly, with the
//! breaker wrapped inside each retry attempt (see the vehicle client in
//! `threadpilot-infra`).
//!
//! ## Time
//!
//! The breaker reads time through the [`Clock`] trait so that tests can drive
//! the open → half-open transition with [`MockClock`] instead of sleeping.
//! Retry backoff uses `tokio::time::sleep`, which tests control with
//! `tokio::time::pause`.

pub mod circuit_breaker;
pub mod retry;

// Re-export circuit breaker types
pub use circuit_breaker::{
    BreakerEvent, BreakerListener, CallPermit, CircuitBreaker, CircuitBreakerConfig,
    CircuitBreakerConfigBuilder, CircuitBreakerMetrics, CircuitOpenError, CircuitState, Clock,
    ConfigError, ConfigResult, MockClock, ResilienceError, ResilienceResult, SystemClock,
};
// Re-export retry types
pub use retry::{
    policies, BackoffStrategy, RetryConfig, RetryConfigBuilder, RetryDecision, RetryError,
    RetryEvent, RetryExecutor, RetryListener, RetryOutcome, RetryPolicy, RetryResult,
};
