//! OpenAlex integration module
//!
//! This module provides the client and types for querying the OpenAlex works API. The works
//! endpoint is paginated and accepts a comma-separated filter expression, which is built with
//! [`WorkFilter`].

/// HTTP client for the works endpoint
mod client;
/// Filter expression builder
mod filter;
/// Work records and response envelopes
mod types;

pub use client::{OpenAlexClient, work_key};
pub use filter::WorkFilter;
pub use types::*;
