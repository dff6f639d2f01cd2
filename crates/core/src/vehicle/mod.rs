//! Vehicle records and the lookup port used to reach them remotely

pub mod ports;
pub mod service;

pub use service::VehicleService;
