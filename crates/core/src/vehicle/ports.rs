//! Port interfaces for vehicle data
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use threadpilot_domain::{FetchOutcome, RegistrationNumber, Result, VehicleInfo};

/// Local store of vehicle records, owned by the vehicle service
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Find a vehicle by registration (case-insensitive)
    async fn find_by_registration(
        &self,
        registration: &RegistrationNumber,
    ) -> Result<Option<VehicleInfo>>;
}

/// Remote vehicle lookup used by the insurance service
///
/// Implementations absorb every failure mode into
/// [`FetchOutcome::Unavailable`]; there is no error path.
#[async_trait]
pub trait VehicleLookup: Send + Sync {
    /// Fetch the vehicle with `registration`
    async fn fetch(&self, registration: &RegistrationNumber) -> FetchOutcome<VehicleInfo>;
}
