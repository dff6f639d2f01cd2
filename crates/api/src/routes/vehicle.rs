use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use threadpilot_core::VehicleService;
use threadpilot_domain::validation::validate_registration;
use threadpilot_domain::VehicleInfo;

use crate::error::ApiResult;
use crate::utils::logging::log_request_outcome;

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub vehicle: VehicleInfo,
}

/// `GET /api/vehicle/{registrationNumber}`
///
/// 400 when the registration is malformed, 404 when it is unknown.
pub async fn get_vehicle(
    State(service): State<Arc<VehicleService>>,
    Path(registration_number): Path<String>,
) -> ApiResult<Json<VehicleResponse>> {
    let started = Instant::now();

    let result = match validate_registration(&registration_number) {
        Ok(registration) => service.get_vehicle(&registration).await,
        Err(err) => Err(err),
    };

    log_request_outcome("vehicle::get_vehicle", started.elapsed(), result.is_ok());
    Ok(Json(VehicleResponse { vehicle: result? }))
}
