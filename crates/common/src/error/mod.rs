//! Error classification shared by every ThreadPilot layer
//!
//! Module-specific error enums stay in their own crates; what they share is a
//! common way of answering two questions about a failure:
//!
//! 1. **Is it retryable?** Transient faults (timeouts, refused connections,
//!    server-side errors) may succeed on a later attempt. Client errors and
//!    malformed payloads will not.
//! 2. **How loud should it be?** [`ErrorSeverity`] drives the log level used
//!    when the failure is finally absorbed or reported.
//!
//! The retry executor in `resilience::retry` consults
//! [`ErrorClassification::is_retryable`] through the
//! `policies::Classified` policy, so an error type only has to implement this
//! trait to become retry-aware.
//!
//! ```rust,ignore
//! #[derive(Debug, thiserror::Error)]
//! pub enum AttemptError {
//!     #[error("timed out")]
//!     Timeout,
//!     #[error("rejected with {0}")]
//!     Rejected(u16),
//! }
//!
//! impl ErrorClassification for AttemptError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Timeout)
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         match self {
//!             Self::Timeout => ErrorSeverity::Warning,
//!             Self::Rejected(_) => ErrorSeverity::Info,
//!         }
//!     }
//! }
//! ```

use std::fmt;

/// Error classification trait for consistent retry and logging decisions
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as:
    /// - Network timeouts
    /// - Refused or reset connections
    /// - Temporary service unavailability (5xx)
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for monitoring and logging decisions.
    fn severity(&self) -> ErrorSeverity;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
