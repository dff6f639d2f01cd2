use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Liveness probe; the services have no external dependency to check
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus { status: "Healthy" })
}
