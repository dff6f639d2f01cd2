//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// Service identity
pub const VEHICLE_SERVICE_NAME: &str = "vehicle-service";
pub const INSURANCE_SERVICE_NAME: &str = "insurance-service";

// Downstream vehicle service
pub const DEFAULT_VEHICLE_SERVICE_BASE_URL: &str = "http://localhost:5001/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Listen addresses
pub const DEFAULT_VEHICLE_BIND_ADDRESS: &str = "0.0.0.0:5001";
pub const DEFAULT_INSURANCE_BIND_ADDRESS: &str = "0.0.0.0:5002";

// Retry and circuit breaker
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_SECS: u32 = 2;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_BREAK_DURATION_SECS: u64 = 30;
/// Non-5xx statuses that still count as transient (5xx always does)
pub const DEFAULT_TRANSIENT_STATUSES: &[u16] = &[408];

// Identifier formats
pub const PERSON_ID_LENGTH: usize = 11;
pub const REGISTRATION_MIN_LENGTH: usize = 3;
pub const REGISTRATION_MAX_LENGTH: usize = 8;
