//! Shopping Cart Domain Module
//!
//! This module contains all shopping cart logic, including:
//! - Domain models (CartItem, Cart, route bodies)
//! - Pure state transitions (merge, update, remove, totals)
//! - The cart store (persistence, subscription, checkout)
//! - REST API handlers

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use error::{CartError, CheckoutError};
pub use handlers::routes;
pub use models::{Cart, CartItem, ProductSelection};
pub use state::{CartStore, CartUpdate, CART_STORAGE_KEY};
