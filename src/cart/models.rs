//! Shopping Cart Domain Models
//!
//! This module contains all data structures related to the shopping cart
//! business domain, plus the request/response bodies of the cart routes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::helpers::recompute_totals;

// =============================================================================
// Cart Domain Models
// =============================================================================

/// Returns the default quantity (1) for add-to-cart requests
fn default_quantity() -> u32 {
    1
}

/// Identity of a line item. The same product at two branches is two lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineKey<'a> {
    pub product_id: &'a str,
    pub branch_id: &'a str,
}

impl<'a> LineKey<'a> {
    pub fn new(product_id: &'a str, branch_id: &'a str) -> Self {
        Self {
            product_id,
            branch_id,
        }
    }
}

/// Represents one line item in the shopping cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub branch_id: String,
    pub product_name: String,
    pub product_image: String,

    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    pub quantity: u32,

    /// Upper bound on `quantity`, supplied by the caller when adding
    pub max_stock: u32,

    pub branch_name: String,
}

impl CartItem {
    pub fn key(&self) -> LineKey<'_> {
        LineKey::new(&self.product_id, &self.branch_id)
    }

    pub fn matches(&self, key: LineKey<'_>) -> bool {
        self.key() == key
    }

    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A product as offered for adding: a [`CartItem`] without a quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSelection {
    pub product_id: String,
    pub branch_id: String,
    pub product_name: String,
    pub product_image: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub max_stock: u32,
    pub branch_name: String,
}

impl ProductSelection {
    pub fn key(&self) -> LineKey<'_> {
        LineKey::new(&self.product_id, &self.branch_id)
    }

    pub fn into_item(self, quantity: u32) -> CartItem {
        CartItem {
            product_id: self.product_id,
            branch_id: self.branch_id,
            product_name: self.product_name,
            product_image: self.product_image,
            price: self.price,
            quantity,
            max_stock: self.max_stock,
            branch_name: self.branch_name,
        }
    }
}

/// The whole cart. Totals are always derived from `items`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total_items: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

impl Cart {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a cart from line items, deriving the totals.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let (total_items, total_price) = recompute_totals(&items);
        Self {
            items,
            total_items,
            total_price,
        }
    }

    pub fn find(&self, key: LineKey<'_>) -> Option<&CartItem> {
        self.items.iter().find(|i| i.matches(key))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Route Bodies
// =============================================================================

/// Body of `POST /cart/items`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartInput {
    #[serde(flatten)]
    pub product: ProductSelection,

    /// Quantity to add (defaults to 1)
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Body of `PUT /cart/items`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityInput {
    pub product_id: String,
    pub branch_id: String,
    /// Signed so that zero and negative requests reach the no-op clamp
    pub quantity: i64,
}

/// Outcome of a cart operation as seen by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
    Updated,
    Unchanged,
    Rejected,
}

/// Response for every cart route
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub status: CartStatus,
    pub cart: Cart,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_wire_shape_is_camel_case() {
        let cart = Cart::from_items(vec![CartItem {
            product_id: "P1".into(),
            branch_id: "B1".into(),
            product_name: "Kibble".into(),
            product_image: "https://cdn.example/kibble.png".into(),
            price: Decimal::new(1250, 2),
            quantity: 2,
            max_stock: 10,
            branch_name: "Downtown".into(),
        }]);

        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(value["totalItems"], 2);
        assert_eq!(value["totalPrice"], 25.0);
        assert_eq!(value["items"][0]["productId"], "P1");
        assert_eq!(value["items"][0]["maxStock"], 10);
        assert_eq!(value["items"][0]["price"], 12.5);
    }

    #[test]
    fn test_add_input_defaults_quantity() {
        let input: AddToCartInput = serde_json::from_value(json!({
            "productId": "P1",
            "branchId": "B1",
            "productName": "Kibble",
            "productImage": "",
            "price": 100,
            "maxStock": 5,
            "branchName": "Downtown"
        }))
        .unwrap();

        assert_eq!(input.quantity, 1);
        assert_eq!(input.product.price, Decimal::from(100));
    }
}
