//! Routing definitions for both services
//!
//! | Service   | Route                                  |
//! |-----------|----------------------------------------|
//! | vehicle   | `GET /api/vehicle/{registrationNumber}` |
//! | insurance | `GET /api/insurance/{personId}`         |
//! | both      | `GET /health`                          |

mod health;
mod insurance;
mod vehicle;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use insurance::InsuranceResponse;
pub use vehicle::VehicleResponse;

use crate::context::{InsuranceContext, VehicleContext};

/// Router for the vehicle service
pub fn vehicle_router(context: VehicleContext) -> Router {
    let api = Router::new()
        .route("/api/vehicle/{registration_number}", get(vehicle::get_vehicle))
        .with_state(context.vehicles);

    with_common_routes(api)
}

/// Router for the insurance service
pub fn insurance_router(context: InsuranceContext) -> Router {
    let api = Router::new()
        .route("/api/insurance/{person_id}", get(insurance::get_person_insurances))
        .with_state(context.insurances);

    with_common_routes(api)
}

fn with_common_routes(router: Router) -> Router {
    router.route("/health", get(health::health_check)).layer(TraceLayer::new_for_http())
}
