//! Insurance types
//!
//! [`PersonInsurance`] is the stored record; [`PersonInsuranceDetails`] is the
//! same record after each car insurance has been paired with its vehicle.
//! Money is held as exact decimals and serialized as JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enrichment::Enrichment;
use super::vehicle::{RegistrationNumber, VehicleInfo};
use crate::impl_domain_enum_conversions;

/// Kind of insurance product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsuranceType {
    PetInsurance,
    PersonalHealthInsurance,
    CarInsurance,
}

impl_domain_enum_conversions!(InsuranceType {
    PetInsurance => "PetInsurance",
    PersonalHealthInsurance => "PersonalHealthInsurance",
    CarInsurance => "CarInsurance",
});

impl InsuranceType {
    /// Whether this kind refers to a record held by the vehicle service
    pub fn references_vehicle(self) -> bool {
        matches!(self, Self::CarInsurance)
    }
}

/// One insurance held by a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insurance {
    #[serde(rename = "type")]
    pub insurance_type: InsuranceType,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_cost: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_registration: Option<RegistrationNumber>,
}

impl Insurance {
    pub fn new(insurance_type: InsuranceType, monthly_cost: Decimal) -> Self {
        Self { insurance_type, monthly_cost, vehicle_registration: None }
    }

    /// A car insurance covering the vehicle with `registration`
    pub fn car(monthly_cost: Decimal, registration: impl Into<RegistrationNumber>) -> Self {
        Self {
            insurance_type: InsuranceType::CarInsurance,
            monthly_cost,
            vehicle_registration: Some(registration.into()),
        }
    }

    /// Registration to look up, if this insurance needs a vehicle at all
    ///
    /// Returns `None` for kinds that never reference a vehicle, even if a
    /// registration happens to be present, and for blank registrations.
    pub fn lookup_key(&self) -> Option<&RegistrationNumber> {
        if !self.insurance_type.references_vehicle() {
            return None;
        }
        self.vehicle_registration.as_ref().filter(|r| !r.as_str().trim().is_empty())
    }
}

/// All insurances held by one person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInsurance {
    pub person_id: String,
    pub person_name: String,
    pub insurances: Vec<Insurance>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_monthly_cost: Decimal,
}

/// One insurance in the enriched view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceDetails {
    #[serde(rename = "type")]
    pub insurance_type: InsuranceType,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_cost: Decimal,
    pub vehicle: Enrichment<VehicleInfo>,
}

/// A person's insurances with vehicle data attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInsuranceDetails {
    pub person_id: String,
    pub person_name: String,
    pub insurances: Vec<InsuranceDetails>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_monthly_cost: Decimal,
}
