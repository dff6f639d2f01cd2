//! Mock port implementations for testing
//!
//! The vehicle lookup fake records every registration it is asked for, which
//! lets tests assert exactly how many lookups the insurance service made and
//! in what order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use threadpilot_core::{InsuranceRepository, VehicleLookup, VehicleRepository};
use threadpilot_domain::{
    FetchFailure, FetchOutcome, Insurance, InsuranceType, PersonInsurance, RegistrationNumber,
    Result as DomainResult, VehicleInfo,
};

/// In-memory mock for `InsuranceRepository`.
#[derive(Default, Clone)]
pub struct MockInsuranceRepository {
    records: Arc<HashMap<String, PersonInsurance>>,
}

impl MockInsuranceRepository {
    pub fn new(records: Vec<PersonInsurance>) -> Self {
        Self {
            records: Arc::new(records.into_iter().map(|r| (r.person_id.clone(), r)).collect()),
        }
    }
}

#[async_trait]
impl InsuranceRepository for MockInsuranceRepository {
    async fn find_by_person_id(&self, person_id: &str) -> DomainResult<Option<PersonInsurance>> {
        Ok(self.records.get(person_id).cloned())
    }
}

/// In-memory mock for `VehicleRepository`.
#[derive(Default, Clone)]
pub struct MockVehicleRepository {
    vehicles: Arc<Vec<VehicleInfo>>,
}

impl MockVehicleRepository {
    pub fn new(vehicles: Vec<VehicleInfo>) -> Self {
        Self { vehicles: Arc::new(vehicles) }
    }
}

#[async_trait]
impl VehicleRepository for MockVehicleRepository {
    async fn find_by_registration(
        &self,
        registration: &RegistrationNumber,
    ) -> DomainResult<Option<VehicleInfo>> {
        Ok(self
            .vehicles
            .iter()
            .find(|v| RegistrationNumber::from(v.registration_number.as_str()) == *registration)
            .cloned())
    }
}

/// Scripted `VehicleLookup` that records every call.
///
/// Registrations without a scripted vehicle come back as unavailable with
/// the configured failure.
#[derive(Clone)]
pub struct RecordingVehicleLookup {
    vehicles: Arc<HashMap<RegistrationNumber, VehicleInfo>>,
    failure: FetchFailure,
    calls: Arc<Mutex<Vec<RegistrationNumber>>>,
}

impl RecordingVehicleLookup {
    pub fn new(vehicles: Vec<VehicleInfo>) -> Self {
        Self {
            vehicles: Arc::new(
                vehicles
                    .into_iter()
                    .map(|v| (RegistrationNumber::from(v.registration_number.as_str()), v))
                    .collect(),
            ),
            failure: FetchFailure::Rejected { status: 404 },
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A lookup whose destination is down for every key.
    pub fn unavailable(failure: FetchFailure) -> Self {
        Self { failure, ..Self::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<RegistrationNumber> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl VehicleLookup for RecordingVehicleLookup {
    async fn fetch(&self, registration: &RegistrationNumber) -> FetchOutcome<VehicleInfo> {
        self.calls.lock().push(registration.clone());
        match self.vehicles.get(registration) {
            Some(vehicle) => FetchOutcome::Found(vehicle.clone()),
            None => FetchOutcome::Unavailable(self.failure.clone()),
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn vehicle(registration: &str, make: &str, model: &str, year: i32) -> VehicleInfo {
    VehicleInfo {
        registration_number: registration.to_string(),
        make: make.to_string(),
        model: model.to_string(),
        year,
        color: "Blue".to_string(),
        vin_number: format!("VIN{registration}"),
    }
}

pub fn money(amount: i64) -> Decimal {
    Decimal::new(amount, 0)
}

/// John Doe: pet, health and a car insurance for ABC123 (total 60)
pub fn john_doe() -> PersonInsurance {
    PersonInsurance {
        person_id: "12345678901".to_string(),
        person_name: "John Doe".to_string(),
        insurances: vec![
            Insurance::new(InsuranceType::PetInsurance, money(10)),
            Insurance::new(InsuranceType::PersonalHealthInsurance, money(20)),
            Insurance::car(money(30), "ABC123"),
        ],
        total_monthly_cost: money(60),
    }
}
