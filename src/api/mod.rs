//! Remote API Adapter
//!
//! This module is the only place that knows the backend's wire format:
//! - Typed client over reqwest (bearer auth, error mapping)
//! - Envelope and domain models, validated on the way in
//! - List endpoints with their page numbering

pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;

// Re-export commonly used types for convenience
pub use client::ApiClient;
pub use endpoints::{
    ApiSource, AvailableDoctorQuery, BranchQuery, ListEndpoint, PetQuery, ProductQuery,
};
pub use error::ApiError;
