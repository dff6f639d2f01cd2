use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use threadpilot_core::InsuranceRepository;
use threadpilot_domain::{Insurance, InsuranceType, PersonInsurance, Result};
use tracing::debug;

/// Insurance records keyed by person identifier
#[derive(Debug, Clone, Default)]
pub struct InMemoryInsuranceRepository {
    records: HashMap<String, PersonInsurance>,
}

impl InMemoryInsuranceRepository {
    pub fn new(records: Vec<PersonInsurance>) -> Self {
        Self { records: records.into_iter().map(|r| (r.person_id.clone(), r)).collect() }
    }

    /// Repository holding the reference customers
    ///
    /// Pet insurance costs 10, personal health 20 and car 30 per month.
    pub fn seeded() -> Self {
        let pet = || Insurance::new(InsuranceType::PetInsurance, Decimal::new(10, 0));
        let health = || Insurance::new(InsuranceType::PersonalHealthInsurance, Decimal::new(20, 0));
        let car = |registration: &str| Insurance::car(Decimal::new(30, 0), registration);

        Self::new(vec![
            person("12345678901", "John Doe", vec![pet(), health(), car("ABC123")]),
            person("98765432109", "Jane Smith", vec![health()]),
            person("55566677788", "Mike Johnson", vec![pet(), car("XYZ789")]),
        ])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn person(person_id: &str, person_name: &str, insurances: Vec<Insurance>) -> PersonInsurance {
    let total_monthly_cost = insurances.iter().map(|i| i.monthly_cost).sum();
    PersonInsurance {
        person_id: person_id.to_string(),
        person_name: person_name.to_string(),
        insurances,
        total_monthly_cost,
    }
}

#[async_trait]
impl InsuranceRepository for InMemoryInsuranceRepository {
    async fn find_by_person_id(&self, person_id: &str) -> Result<Option<PersonInsurance>> {
        let found = self.records.get(person_id).cloned();
        debug!(person_id, found = found.is_some(), "insurance repository lookup");
        Ok(found)
    }
}
