//! HTTP client plumbing shared by outbound service clients

mod client;

pub use client::{is_transient_error, HttpClient, HttpClientBuilder};
