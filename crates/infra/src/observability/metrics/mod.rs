//! Metrics collected by infrastructure clients

mod fetch;

pub use fetch::{FetchMetrics, FetchMetricsSnapshot};
