//! Integration tests for `VehicleService`

mod support;

use std::sync::Arc;

use support::repositories::{vehicle, MockVehicleRepository};
use threadpilot_core::VehicleService;
use threadpilot_domain::{RegistrationNumber, ThreadPilotError};

fn service() -> VehicleService {
    VehicleService::new(Arc::new(MockVehicleRepository::new(vec![
        vehicle("ABC123", "Toyota", "Camry", 2022),
        vehicle("XYZ789", "Honda", "Civic", 2021),
    ])))
}

#[tokio::test]
async fn test_get_vehicle_ignores_case() {
    let found = service().get_vehicle(&RegistrationNumber::from("xyz789")).await.expect("found");
    assert_eq!(found.make, "Honda");
    assert_eq!(found.registration_number, "XYZ789");
}

#[tokio::test]
async fn test_unknown_registration_is_not_found() {
    let result = service().get_vehicle(&RegistrationNumber::from("NOPE00")).await;
    assert_eq!(
        result,
        Err(ThreadPilotError::NotFound("Vehicle with registration NOPE00 not found".into()))
    );
}
