//! Shared test helpers for `threadpilot-core` integration tests.
//!
//! Lightweight in-memory fakes for every core port, so service tests can
//! focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod repositories;
