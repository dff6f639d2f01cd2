//! # ThreadPilot Domain
//!
//! Business domain types and models for ThreadPilot.
//!
//! This crate contains:
//! - Vehicle and insurance records, and the enriched insurance view
//! - Enrichment outcomes (`Enrichment`, `FetchOutcome`, `FetchFailure`)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Input-format validators for path identifiers
//!
//! ## Architecture
//! - No dependencies on other ThreadPilot crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
