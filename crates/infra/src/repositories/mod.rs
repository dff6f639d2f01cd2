//! In-memory repositories backing the two services
//!
//! Both stores are read-only after construction; `seeded()` loads the
//! reference records the services ship with.

mod insurance;
mod vehicle;

pub use insurance::InMemoryInsuranceRepository;
pub use vehicle::InMemoryVehicleRepository;
