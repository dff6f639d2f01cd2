//! Shared helpers for router tests

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use threadpilot_api::{vehicle_router, VehicleContext};
use threadpilot_domain::Config;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Send `GET uri` through `router` and decode the JSON body
pub async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Run the seeded vehicle service on an ephemeral local port
pub async fn spawn_vehicle_service() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = vehicle_router(VehicleContext::seeded());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Configuration pointing the insurance service at `base_url`, with one
/// attempt per lookup so outage tests do not sleep through backoff
pub fn insurance_config(base_url: String) -> Config {
    let mut config = Config::default();
    config.vehicle_service.base_url = base_url;
    config.vehicle_service.timeout_secs = 5;
    config.resilience.max_attempts = 1;
    config
}
