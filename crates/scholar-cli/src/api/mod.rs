//! API client module
//!
//! HTTP client, endpoint builders and wire types for the portal backend.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::ApiClient;
pub use types::*;
