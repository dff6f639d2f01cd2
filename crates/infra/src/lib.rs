//! # ThreadPilot Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The resilient HTTP client for the vehicle service
//! - In-memory repositories seeded with reference data
//! - Configuration loading from environment and files
//! - Tracing subscriber setup and fetch metrics
//!
//! ## Architecture
//! - Implements traits defined in `threadpilot-core`
//! - Depends on `threadpilot-common`, `threadpilot-domain` and
//!   `threadpilot-core`
//! - Contains all "impure" code (network, files, environment)

pub mod clients;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod repositories;

// Re-export commonly used items
pub use clients::{AttemptError, VehicleServiceClient};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::metrics::{FetchMetrics, FetchMetricsSnapshot};
pub use repositories::{InMemoryInsuranceRepository, InMemoryVehicleRepository};
