//! Application contexts - dependency injection containers
//!
//! Each service binary builds exactly one context and hands it to its
//! router. Tests build contexts from fakes through the `new` constructors.

use std::sync::Arc;

use threadpilot_core::{
    InsuranceRepository, InsuranceService, VehicleLookup, VehicleRepository, VehicleService,
};
use threadpilot_domain::{Config, Result};
use threadpilot_infra::{
    FetchMetrics, InMemoryInsuranceRepository, InMemoryVehicleRepository, VehicleServiceClient,
};
use tracing::info;

/// Dependencies of the vehicle service
#[derive(Clone)]
pub struct VehicleContext {
    pub vehicles: Arc<VehicleService>,
}

impl VehicleContext {
    pub fn new(repository: Arc<dyn VehicleRepository>) -> Self {
        Self { vehicles: Arc::new(VehicleService::new(repository)) }
    }

    /// Context backed by the seeded in-memory fleet
    pub fn seeded() -> Self {
        let repository = InMemoryVehicleRepository::seeded();
        info!(vehicles = repository.len(), "vehicle repository seeded");
        Self::new(Arc::new(repository))
    }
}

/// Dependencies of the insurance service
#[derive(Clone)]
pub struct InsuranceContext {
    pub insurances: Arc<InsuranceService>,
    /// Lookup metrics, present when the lookup is the HTTP client
    pub vehicle_metrics: Option<Arc<FetchMetrics>>,
}

impl InsuranceContext {
    pub fn new(repository: Arc<dyn InsuranceRepository>, vehicles: Arc<dyn VehicleLookup>) -> Self {
        Self { insurances: Arc::new(InsuranceService::new(repository, vehicles)), vehicle_metrics: None }
    }

    /// Context with seeded insurance records and a resilient client for the
    /// configured vehicle service
    ///
    /// # Errors
    /// Returns `ThreadPilotError::Config` if the vehicle service settings are
    /// invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = VehicleServiceClient::from_config(config)?;
        let metrics = client.metrics();
        info!(
            vehicle_service = %client.base_url(),
            max_attempts = config.resilience.max_attempts,
            failure_threshold = config.resilience.failure_threshold,
            break_duration_secs = config.resilience.break_duration_secs,
            "vehicle service client configured"
        );

        let repository = InMemoryInsuranceRepository::seeded();
        info!(people = repository.len(), "insurance repository seeded");

        let mut context = Self::new(Arc::new(repository), Arc::new(client));
        context.vehicle_metrics = Some(metrics);
        Ok(context)
    }
}
