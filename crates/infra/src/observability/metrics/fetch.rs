//! Metrics for outbound vehicle lookups
//!
//! ## Design
//! - **SeqCst ordering** for the counters used in derived metrics
//!   (avg_fetch_time)
//! - **No locking needed** - simple atomic counters
//! - **Microsecond storage** - raw durations in µs, reporting helpers convert
//!   to ms

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Outcome counters and timing for one lookup client
#[derive(Debug, Default)]
pub struct FetchMetrics {
    total_fetch_time_micros: AtomicU64,
    last_fetch_time_micros: AtomicU64,
    fetch_count: AtomicUsize,
    found: AtomicUsize,
    unavailable: AtomicUsize,
    circuit_rejections: AtomicUsize,
    retries: AtomicUsize,
}

/// Point-in-time copy of [`FetchMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchMetricsSnapshot {
    pub fetch_count: usize,
    pub found: usize,
    pub unavailable: usize,
    pub circuit_rejections: usize,
    pub retries: usize,
    pub avg_fetch_time_ms: f64,
    pub last_fetch_time_ms: u64,
}

impl FetchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the wall time of one complete lookup, retries included
    pub fn record_fetch_time(&self, duration: Duration) {
        let micros = duration.as_micros() as u64;

        self.total_fetch_time_micros.fetch_add(micros, Ordering::SeqCst);
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        // Relaxed OK: last_fetch_time is not used in derived metrics
        self.last_fetch_time_micros.store(micros, Ordering::Relaxed);
    }

    pub fn record_found(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unavailable(&self) {
        self.unavailable.fetch_add(1, Ordering::Relaxed);
    }

    /// A lookup short-circuited by an open breaker
    pub fn record_circuit_rejection(&self) {
        self.circuit_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// One scheduled retry (not counting the first attempt)
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Average lookup time in milliseconds, 0.0 before the first lookup
    pub fn avg_fetch_time_ms(&self) -> f64 {
        let total_time = self.total_fetch_time_micros.load(Ordering::SeqCst);
        let count = self.fetch_count.load(Ordering::SeqCst);

        if count == 0 {
            return 0.0;
        }

        (total_time as f64 / count as f64) / 1_000.0
    }

    pub fn snapshot(&self) -> FetchMetricsSnapshot {
        FetchMetricsSnapshot {
            fetch_count: self.fetch_count.load(Ordering::SeqCst),
            found: self.found.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            circuit_rejections: self.circuit_rejections.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            avg_fetch_time_ms: self.avg_fetch_time_ms(),
            last_fetch_time_ms: self.last_fetch_time_micros.load(Ordering::Relaxed) / 1_000,
        }
    }
}
