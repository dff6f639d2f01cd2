//! Clients for downstream ThreadPilot services

mod vehicle;

pub use vehicle::{AttemptError, VehicleServiceClient};
