//! Port interfaces for insurance records

use async_trait::async_trait;
use threadpilot_domain::{PersonInsurance, Result};

/// Store of insurance records keyed by person identifier
#[async_trait]
pub trait InsuranceRepository: Send + Sync {
    /// Find every insurance held by `person_id`
    ///
    /// `Ok(None)` means the person has no record at all.
    async fn find_by_person_id(&self, person_id: &str) -> Result<Option<PersonInsurance>>;
}
