//! Pet-care client library
//!
//! This library provides the client-side core of a pet-care platform: a
//! persistent shopping cart and a paginated fetch accumulator over the
//! remote REST API, served to the UI shell through a small local service.

// Domain modules
pub mod booking;
pub mod cart;
pub mod lookups;
pub mod notify;
pub mod pagination;

// Infrastructure
pub mod api;
pub mod config;
pub mod router;
pub mod state;
pub mod storage;
