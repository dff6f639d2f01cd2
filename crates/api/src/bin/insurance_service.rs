//! Insurance service: serves insurance records enriched with vehicle data

use anyhow::Context;
use threadpilot_api::{insurance_router, shutdown_signal, InsuranceContext};
use threadpilot_domain::constants::{DEFAULT_INSURANCE_BIND_ADDRESS, INSURANCE_SERVICE_NAME};
use threadpilot_infra::config;
use threadpilot_infra::observability::init_tracing;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_or_default().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let context = InsuranceContext::from_config(&config)
        .context("failed to configure the vehicle service client")?;
    let metrics = context.vehicle_metrics.clone();
    let app = insurance_router(context);

    let addr = config.server.bind_address_or(DEFAULT_INSURANCE_BIND_ADDRESS);
    let listener =
        TcpListener::bind(addr).await.with_context(|| format!("failed to bind {addr}"))?;
    info!(service = INSURANCE_SERVICE_NAME, %addr, "listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    if let Some(metrics) = metrics {
        let snapshot = metrics.snapshot();
        info!(
            service = INSURANCE_SERVICE_NAME,
            lookups = snapshot.fetch_count,
            found = snapshot.found,
            unavailable = snapshot.unavailable,
            circuit_rejections = snapshot.circuit_rejections,
            retries = snapshot.retries,
            avg_lookup_ms = snapshot.avg_fetch_time_ms,
            "stopped"
        );
    }
    Ok(())
}
