//! Vehicle lookup service

use std::sync::Arc;

use threadpilot_domain::{RegistrationNumber, Result, ThreadPilotError, VehicleInfo};
use tracing::{debug, instrument};

use super::ports::VehicleRepository;

/// Vehicle lookup service
pub struct VehicleService {
    repository: Arc<dyn VehicleRepository>,
}

impl VehicleService {
    pub fn new(repository: Arc<dyn VehicleRepository>) -> Self {
        Self { repository }
    }

    /// Get a vehicle by registration number
    ///
    /// # Errors
    /// `ThreadPilotError::NotFound` if no vehicle has this registration, or
    /// whatever the repository reports.
    #[instrument(skip(self), fields(registration = %registration))]
    pub async fn get_vehicle(&self, registration: &RegistrationNumber) -> Result<VehicleInfo> {
        match self.repository.find_by_registration(registration).await? {
            Some(vehicle) => {
                debug!(make = %vehicle.make, model = %vehicle.model, "vehicle found");
                Ok(vehicle)
            }
            None => Err(ThreadPilotError::NotFound(format!(
                "Vehicle with registration {registration} not found"
            ))),
        }
    }
}
