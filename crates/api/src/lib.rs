//! # ThreadPilot API
//!
//! HTTP surface for the vehicle and insurance services.
//!
//! This crate contains:
//! - axum routers for both services (`routes`)
//! - Dependency wiring for each service (`context`)
//! - Problem-details error responses (`error`)
//! - The `vehicle-service` and `insurance-service` binaries
//!
//! ## Architecture
//! - Depends on every other ThreadPilot crate
//! - Handlers validate path identifiers, call a core service and map
//!   `ThreadPilotError` onto an HTTP status

pub mod context;
pub mod error;
pub mod routes;
pub mod utils;

pub use context::{InsuranceContext, VehicleContext};
pub use error::{ApiError, ApiResult, ProblemDetails};
pub use routes::{insurance_router, vehicle_router};

/// Resolve once the process receives Ctrl-C (or SIGTERM on Unix)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
