//! Configuration management
//!
//! Every field has a serde default, so a partial TOML or JSON file (or an
//! empty one) yields a usable configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKOFF_BASE_SECS, DEFAULT_BREAK_DURATION_SECS, DEFAULT_FAILURE_THRESHOLD,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TRANSIENT_STATUSES,
    DEFAULT_VEHICLE_SERVICE_BASE_URL,
};
use crate::errors::{Result, ThreadPilotError};

/// Application configuration shared by both services
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub vehicle_service: VehicleServiceConfig,
    pub resilience: ResilienceConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address; each binary supplies its own default when unset
    pub bind_address: Option<String>,
}

impl ServerConfig {
    pub fn bind_address_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.bind_address.as_deref().unwrap_or(default)
    }
}

/// Where the insurance service finds the vehicle service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleServiceConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,
    /// Per-attempt timeout
    pub timeout_secs: u64,
}

impl Default for VehicleServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_VEHICLE_SERVICE_BASE_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl VehicleServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry and circuit breaker settings for outbound lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Total attempts per lookup, including the first
    pub max_attempts: u32,
    /// Delay before retry *n* is `backoff_base_secs^n` seconds
    pub backoff_base_secs: u32,
    /// Extra statuses treated as transient; 5xx always is
    pub transient_statuses: Vec<u16>,
    /// Consecutive transient failures that open the circuit
    pub failure_threshold: u32,
    /// How long an open circuit rejects calls before admitting a probe
    pub break_duration_secs: u64,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_secs: DEFAULT_BACKOFF_BASE_SECS,
            transient_statuses: DEFAULT_TRANSIENT_STATUSES.to_vec(),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            break_duration_secs: DEFAULT_BREAK_DURATION_SECS,
        }
    }
}

impl ResilienceConfig {
    pub fn break_duration(&self) -> Duration {
        Duration::from_secs(self.break_duration_secs)
    }
}

/// Log output settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Config {
    /// Reject settings the services cannot run with
    ///
    /// # Errors
    /// Returns `ThreadPilotError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.vehicle_service.base_url.trim().is_empty() {
            return Err(ThreadPilotError::Config(
                "vehicle_service.base_url must not be empty".to_string(),
            ));
        }
        if self.vehicle_service.timeout_secs == 0 {
            return Err(ThreadPilotError::Config(
                "vehicle_service.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.resilience.max_attempts == 0 {
            return Err(ThreadPilotError::Config(
                "resilience.max_attempts must be greater than 0".to_string(),
            ));
        }
        if self.resilience.failure_threshold == 0 {
            return Err(ThreadPilotError::Config(
                "resilience.failure_threshold must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
