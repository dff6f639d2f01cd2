use std::time::Duration;

use threadpilot_domain::ThreadPilotError;
use tracing::{info, warn};

/// Log the outcome of a handler with structured fields.
///
/// `operation` is a stable identifier such as `"insurance::get_person"`;
/// callers must not forward request data through it.
#[inline]
pub fn log_request_outcome(operation: &str, elapsed: Duration, success: bool) {
    let duration_ms = elapsed.as_millis() as u64;

    if success {
        info!(operation, duration_ms, "request_success");
    } else {
        warn!(operation, duration_ms, "request_failure");
    }
}

/// Convert a `ThreadPilotError` into a stable label for logging.
#[inline]
pub fn error_label(error: &ThreadPilotError) -> &'static str {
    match error {
        ThreadPilotError::Config(_) => "config",
        ThreadPilotError::Network(_) => "network",
        ThreadPilotError::NotFound(_) => "not_found",
        ThreadPilotError::InvalidInput(_) => "invalid_input",
        ThreadPilotError::Internal(_) => "internal",
    }
}
