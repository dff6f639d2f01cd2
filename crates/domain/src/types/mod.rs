//! Domain types and models
//!
//! Vehicle records come from the vehicle service; insurance records belong to
//! the insurance service, which attaches the matching vehicle to each car
//! insurance when building [`PersonInsuranceDetails`].

pub mod enrichment;
pub mod insurance;
pub mod vehicle;

pub use enrichment::{Enrichment, FetchFailure, FetchOutcome};
pub use insurance::{
    Insurance, InsuranceDetails, InsuranceType, PersonInsurance, PersonInsuranceDetails,
};
pub use vehicle::{RegistrationNumber, VehicleInfo};
