//! # ThreadPilot Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for record stores and the vehicle lookup
//! - `InsuranceService`, which enriches car insurances with vehicle data
//! - `VehicleService`, the vehicle service's key lookup
//!
//! ## Architecture Principles
//! - Only depends on `threadpilot-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod insurance;
pub mod vehicle;

pub use insurance::ports::InsuranceRepository;
pub use insurance::InsuranceService;
pub use vehicle::ports::{VehicleLookup, VehicleRepository};
pub use vehicle::VehicleService;
