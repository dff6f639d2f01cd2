//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use threadpilot_domain::ThreadPilotError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ThreadPilotError);

impl From<InfraError> for ThreadPilotError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ThreadPilotError> for InfraError {
    fn from(value: ThreadPilotError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoThreadPilotError {
    fn into_threadpilot(self) -> ThreadPilotError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ThreadPilotError */
/* -------------------------------------------------------------------------- */

impl IntoThreadPilotError for HttpError {
    fn into_threadpilot(self) -> ThreadPilotError {
        if self.is_timeout() {
            return ThreadPilotError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ThreadPilotError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return ThreadPilotError::Config(format!("invalid HTTP client setup: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => ThreadPilotError::NotFound(message),
                408 | 429 => ThreadPilotError::Network(message),
                400..=499 => ThreadPilotError::InvalidInput(message),
                _ => ThreadPilotError::Network(message),
            };
        }

        ThreadPilotError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_threadpilot())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → ThreadPilotError */
/* -------------------------------------------------------------------------- */

impl IntoThreadPilotError for UrlError {
    fn into_threadpilot(self) -> ThreadPilotError {
        ThreadPilotError::Config(format!("invalid URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(value.into_threadpilot())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
