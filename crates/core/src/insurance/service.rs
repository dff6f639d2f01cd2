//! Insurance service - enriches a person's insurances with vehicle data
//!
//! Car insurances reference a vehicle held by the vehicle service. Each one
//! is looked up through [`VehicleLookup`], one at a time and in the order the
//! insurances were stored; every other kind is passed through untouched. A
//! failed lookup only blanks that one vehicle, never the whole response.

use std::sync::Arc;

use threadpilot_domain::{
    Enrichment, FetchOutcome, Insurance, InsuranceDetails, PersonInsurance,
    PersonInsuranceDetails, Result, ThreadPilotError,
};
use tracing::{debug, info, instrument};

use super::ports::InsuranceRepository;
use crate::vehicle::ports::VehicleLookup;

/// Insurance lookup and enrichment service
pub struct InsuranceService {
    repository: Arc<dyn InsuranceRepository>,
    vehicles: Arc<dyn VehicleLookup>,
}

impl InsuranceService {
    pub fn new(repository: Arc<dyn InsuranceRepository>, vehicles: Arc<dyn VehicleLookup>) -> Self {
        Self { repository, vehicles }
    }

    /// Load a person's insurances and attach vehicle data
    ///
    /// # Errors
    /// `ThreadPilotError::NotFound` when the person has no insurance record.
    /// Vehicle lookup failures never surface here.
    #[instrument(skip(self))]
    pub async fn get_person_insurances(&self, person_id: &str) -> Result<PersonInsuranceDetails> {
        let record = self.repository.find_by_person_id(person_id).await?.ok_or_else(|| {
            ThreadPilotError::NotFound(format!("No insurances found for person {person_id}"))
        })?;

        Ok(self.aggregate(record).await)
    }

    /// Build the enriched view of `record`
    ///
    /// Performs exactly one lookup per car insurance that carries a
    /// registration. Order, count and the total are preserved as stored.
    #[instrument(skip_all, fields(person_id = %record.person_id, insurances = record.insurances.len()))]
    pub async fn aggregate(&self, record: PersonInsurance) -> PersonInsuranceDetails {
        let PersonInsurance { person_id, person_name, insurances, total_monthly_cost } = record;

        let mut details = Vec::with_capacity(insurances.len());
        for insurance in insurances {
            details.push(self.enrich(insurance).await);
        }

        let enriched = details.iter().filter(|d| d.vehicle.is_enriched()).count();
        let unavailable = details.iter().filter(|d| d.vehicle.failure().is_some()).count();
        info!(enriched, unavailable, "insurance details assembled");

        PersonInsuranceDetails { person_id, person_name, insurances: details, total_monthly_cost }
    }

    async fn enrich(&self, insurance: Insurance) -> InsuranceDetails {
        let vehicle = match insurance.lookup_key() {
            Some(registration) => {
                let outcome = self.vehicles.fetch(registration).await;
                if let FetchOutcome::Unavailable(failure) = &outcome {
                    debug!(
                        registration = %registration,
                        reason = failure.kind(),
                        "vehicle data unavailable for car insurance"
                    );
                }
                Enrichment::from(outcome)
            }
            None => Enrichment::NotApplicable,
        };

        InsuranceDetails {
            insurance_type: insurance.insurance_type,
            monthly_cost: insurance.monthly_cost,
            vehicle,
        }
    }
}
