use std::collections::HashMap;

use async_trait::async_trait;
use threadpilot_core::VehicleRepository;
use threadpilot_domain::{RegistrationNumber, Result, VehicleInfo};
use tracing::debug;

/// Vehicle records keyed by registration, compared case-insensitively
#[derive(Debug, Clone, Default)]
pub struct InMemoryVehicleRepository {
    vehicles: HashMap<RegistrationNumber, VehicleInfo>,
}

impl InMemoryVehicleRepository {
    pub fn new(vehicles: Vec<VehicleInfo>) -> Self {
        let vehicles = vehicles
            .into_iter()
            .map(|v| (RegistrationNumber::new(v.registration_number.clone()), v))
            .collect();
        Self { vehicles }
    }

    /// Repository holding the reference fleet
    pub fn seeded() -> Self {
        Self::new(vec![
            vehicle("ABC123", "Toyota", "Camry", 2022, "Blue", "1HGBH41JXMN109186"),
            vehicle("XYZ789", "Honda", "Civic", 2021, "Red", "2HGBH41JXMN109187"),
            vehicle("DEF456", "Ford", "F-150", 2023, "White", "3HGBH41JXMN109188"),
            vehicle("GHI789", "BMW", "X3", 2020, "Black", "4HGBH41JXMN109189"),
            vehicle("JKL012", "Mercedes", "C-Class", 2022, "Silver", "5HGBH41JXMN109190"),
        ])
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

fn vehicle(
    registration: &str,
    make: &str,
    model: &str,
    year: i32,
    color: &str,
    vin: &str,
) -> VehicleInfo {
    VehicleInfo {
        registration_number: registration.to_string(),
        make: make.to_string(),
        model: model.to_string(),
        year,
        color: color.to_string(),
        vin_number: vin.to_string(),
    }
}

#[async_trait]
impl VehicleRepository for InMemoryVehicleRepository {
    async fn find_by_registration(
        &self,
        registration: &RegistrationNumber,
    ) -> Result<Option<VehicleInfo>> {
        let found = self.vehicles.get(registration).cloned();
        debug!(%registration, found = found.is_some(), "vehicle repository lookup");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_repository_holds_reference_fleet() {
        let repo = InMemoryVehicleRepository::seeded();
        assert_eq!(repo.len(), 5);

        let camry = repo
            .find_by_registration(&"ABC123".into())
            .await
            .expect("lookup succeeds")
            .expect("ABC123 is seeded");
        assert_eq!(camry.make, "Toyota");
        assert_eq!(camry.model, "Camry");
        assert_eq!(camry.year, 2022);
        assert_eq!(camry.vin_number, "1HGBH41JXMN109186");
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let repo = InMemoryVehicleRepository::seeded();

        let found = repo.find_by_registration(&"jkl012".into()).await.unwrap();
        assert_eq!(found.map(|v| v.model), Some("C-Class".to_string()));
    }

    #[tokio::test]
    async fn unknown_registration_is_none() {
        let repo = InMemoryVehicleRepository::seeded();
        assert_eq!(repo.find_by_registration(&"NOPE99".into()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_repository() {
        let repo = InMemoryVehicleRepository::default();
        assert!(repo.is_empty());
        assert_eq!(repo.find_by_registration(&"ABC123".into()).await.unwrap(), None);
    }
}
