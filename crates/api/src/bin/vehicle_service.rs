//! Vehicle service: serves the seeded vehicle registry over HTTP

use anyhow::Context;
use threadpilot_api::{shutdown_signal, vehicle_router, VehicleContext};
use threadpilot_domain::constants::{DEFAULT_VEHICLE_BIND_ADDRESS, VEHICLE_SERVICE_NAME};
use threadpilot_infra::config;
use threadpilot_infra::observability::init_tracing;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_or_default().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let app = vehicle_router(VehicleContext::seeded());

    let addr = config.server.bind_address_or(DEFAULT_VEHICLE_BIND_ADDRESS);
    let listener =
        TcpListener::bind(addr).await.with_context(|| format!("failed to bind {addr}"))?;
    info!(service = VEHICLE_SERVICE_NAME, %addr, "listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!(service = VEHICLE_SERVICE_NAME, "stopped");
    Ok(())
}
