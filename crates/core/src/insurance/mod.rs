//! Insurance records and their enrichment with vehicle data

pub mod ports;
pub mod service;

pub use service::InsuranceService;
