//! Enrichment outcomes
//!
//! A vehicle lookup never fails its caller; it either finds the vehicle or
//! reports *why* it did not. [`FetchOutcome`] is what the lookup returns,
//! [`Enrichment`] is what ends up attached to an insurance. Both "not
//! applicable" and "unavailable" serialize as `null`, but they stay distinct
//! in memory so logs can tell a healthy record from a downstream outage.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Why a lookup produced no entity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// The circuit breaker rejected the call without touching the network
    #[error("circuit open")]
    CircuitOpen,

    /// Every attempt the breaker allowed failed transiently
    #[error("retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// The destination answered with a non-success status that is not retried
    #[error("rejected with status {status}")]
    Rejected { status: u16 },

    /// The response body could not be read as the expected entity
    #[error("malformed response: {message}")]
    Malformed { message: String },

    /// A transport-level error that is not retried (e.g. an invalid URL)
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl FetchFailure {
    /// Short machine-readable tag for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CircuitOpen => "circuit_open",
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::Rejected { .. } => "rejected",
            Self::Malformed { .. } => "malformed",
            Self::Transport { .. } => "transport",
        }
    }
}

/// Result of one resilient lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Found(T),
    Unavailable(FetchFailure),
}

impl<T> FetchOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Unavailable(_) => None,
        }
    }
}

/// External data attached to a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment<T> {
    /// The lookup succeeded
    Enriched(T),
    /// The record does not reference external data; no lookup was made
    NotApplicable,
    /// A lookup was made and produced nothing
    Unavailable(FetchFailure),
}

impl<T> Enrichment<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Self::Enriched(value) => Some(value),
            Self::NotApplicable | Self::Unavailable(_) => None,
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self, Self::Enriched(_))
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Unavailable(failure) => Some(failure),
            Self::Enriched(_) | Self::NotApplicable => None,
        }
    }
}

impl<T> From<FetchOutcome<T>> for Enrichment<T> {
    fn from(outcome: FetchOutcome<T>) -> Self {
        match outcome {
            FetchOutcome::Found(value) => Self::Enriched(value),
            FetchOutcome::Unavailable(failure) => Self::Unavailable(failure),
        }
    }
}

impl<T: Serialize> Serialize for Enrichment<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}
