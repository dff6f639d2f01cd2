//! Router tests for the vehicle service

mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::get_json;
use threadpilot_api::{vehicle_router, VehicleContext};

fn app() -> axum::Router {
    vehicle_router(VehicleContext::seeded())
}

#[tokio::test]
async fn returns_seeded_vehicle() {
    let (status, body) = get_json(app(), "/api/vehicle/ABC123").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "vehicle": {
                "registrationNumber": "ABC123",
                "make": "Toyota",
                "model": "Camry",
                "year": 2022,
                "color": "Blue",
                "vinNumber": "1HGBH41JXMN109186"
            }
        })
    );
}

#[tokio::test]
async fn registration_lookup_is_case_insensitive() {
    let (status, body) = get_json(app(), "/api/vehicle/def456").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vehicle"]["registrationNumber"], "DEF456");
    assert_eq!(body["vehicle"]["model"], "F-150");
}

#[tokio::test]
async fn unknown_registration_is_404_problem() {
    let (status, body) = get_json(app(), "/api/vehicle/ZZZ999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert_eq!(body["title"], "Not Found");
    assert_eq!(body["detail"], "Vehicle with registration ZZZ999 not found");
}

#[tokio::test]
async fn too_short_registration_is_400_problem() {
    let (status, body) = get_json(app(), "/api/vehicle/AB").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn non_alphanumeric_registration_is_400_problem() {
    let (status, _) = get_json(app(), "/api/vehicle/ABC-12").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(app(), "/api/vehicle/ABCDEFGHI").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_healthy() {
    let (status, body) = get_json(app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "Healthy" }));
}
