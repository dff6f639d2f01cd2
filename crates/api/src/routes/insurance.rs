use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use threadpilot_core::InsuranceService;
use threadpilot_domain::validation::validate_person_id;
use threadpilot_domain::PersonInsuranceDetails;

use crate::error::ApiResult;
use crate::utils::logging::log_request_outcome;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceResponse {
    pub person_insurance_details: PersonInsuranceDetails,
}

/// `GET /api/insurance/{personId}`
///
/// 400 when the person id is not 11 digits, 404 when the person has no
/// insurances. Vehicle lookup failures still produce a 200 with the affected
/// `vehicle` fields set to `null`.
pub async fn get_person_insurances(
    State(service): State<Arc<InsuranceService>>,
    Path(person_id): Path<String>,
) -> ApiResult<Json<InsuranceResponse>> {
    let started = Instant::now();

    let result = match validate_person_id(&person_id) {
        Ok(()) => service.get_person_insurances(&person_id).await,
        Err(err) => Err(err),
    };

    log_request_outcome("insurance::get_person_insurances", started.elapsed(), result.is_ok());
    Ok(Json(InsuranceResponse { person_insurance_details: result? }))
}
