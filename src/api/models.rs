//! Remote API wire models
//!
//! Every server payload is parsed into one of these types before it reaches
//! the cart or the pagination core. Required fields are enforced by serde;
//! optional ones default.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cart::models::ProductSelection;

// =============================================================================
// Envelopes
// =============================================================================

/// First-page index used by a list endpoint.
///
/// Internally pages are always numbered from 1; the adapter converts at the
/// wire boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBase {
    ZeroBased,
    OneBased,
}

impl PageBase {
    /// Internal 1-based page → the endpoint's `pageNo`.
    pub fn to_wire(self, page: u32) -> u32 {
        match self {
            PageBase::ZeroBased => page.saturating_sub(1),
            PageBase::OneBased => page,
        }
    }

    /// The endpoint's `pageNo` → internal 1-based page.
    pub fn from_wire(self, page_no: u32) -> u32 {
        match self {
            PageBase::ZeroBased => page_no.saturating_add(1),
            PageBase::OneBased => page_no,
        }
    }
}

/// Raw list envelope. Items stay untyped until validated one by one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope {
    #[serde(default)]
    pub page_no: u32,
    #[serde(default)]
    pub total_page: u32,
    #[serde(default)]
    pub total_elements: u64,
    pub items: Vec<Value>,
}

/// Envelope returned by mutation endpoints
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MutationEnvelope<T> {
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Body of an error response, when the server sends one
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

// =============================================================================
// List Items
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
}

impl Product {
    /// The cart selection for this product, if it is tied to a branch.
    pub fn selection(&self) -> Option<ProductSelection> {
        let branch_id = self.branch_id.clone()?;
        Some(ProductSelection {
            product_id: self.id.clone(),
            branch_name: self.branch_name.clone().unwrap_or_else(|| branch_id.clone()),
            branch_id,
            product_name: self.name.clone(),
            product_image: self.image_url.clone().unwrap_or_default(),
            price: self.price,
            max_stock: self.stock,
        })
    }
}

// =============================================================================
// Mutation Bodies
// =============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub branch_id: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub pet_id: String,
    pub doctor_id: String,
    pub branch_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}
