//! REST API handlers for shopping cart operations
//!
//! This module exposes the cart store and checkout to the UI shell.
//! Rejections are not HTTP errors: they come back as `200` with
//! `status: "rejected"` and the warning text, the cart unchanged.

use super::{error::CheckoutError, models::*, state::CartUpdate};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/cart", get(get_cart))
        .route("/cart/items", post(add_item).put(update_item))
        .route("/cart/items/:product_id/:branch_id", delete(remove_item))
        .route("/cart/clear", post(clear_cart))
        .route("/checkout", post(checkout))
}

fn updated(update: CartUpdate) -> CartResponse {
    CartResponse {
        status: if update.changed {
            CartStatus::Updated
        } else {
            CartStatus::Unchanged
        },
        cart: (*update.cart).clone(),
        message: None,
    }
}

fn rejected(state: &SharedState, message: String) -> CartResponse {
    CartResponse {
        status: CartStatus::Rejected,
        cart: (*state.cart.snapshot()).clone(),
        message: Some(message),
    }
}

/// Endpoint: GET /cart
async fn get_cart(State(state): State<SharedState>) -> Json<CartResponse> {
    Json(CartResponse {
        status: CartStatus::Unchanged,
        cart: (*state.cart.snapshot()).clone(),
        message: None,
    })
}

/// Endpoint: POST /cart/items
async fn add_item(
    State(state): State<SharedState>,
    Json(payload): Json<AddToCartInput>,
) -> Json<CartResponse> {
    let response = match state
        .cart
        .add_to_cart(payload.product, Some(payload.quantity))
    {
        Ok(update) => updated(update),
        Err(e) => rejected(&state, e.to_string()),
    };
    Json(response)
}

/// Endpoint: PUT /cart/items
async fn update_item(
    State(state): State<SharedState>,
    Json(payload): Json<UpdateQuantityInput>,
) -> Json<CartResponse> {
    let response = match state.cart.update_quantity(
        &payload.product_id,
        &payload.branch_id,
        payload.quantity,
    ) {
        Ok(update) => updated(update),
        Err(e) => rejected(&state, e.to_string()),
    };
    Json(response)
}

/// Endpoint: DELETE /cart/items/:product_id/:branch_id
async fn remove_item(
    State(state): State<SharedState>,
    Path((product_id, branch_id)): Path<(String, String)>,
) -> Json<CartResponse> {
    Json(updated(state.cart.remove_from_cart(&product_id, &branch_id)))
}

/// Endpoint: POST /cart/clear
async fn clear_cart(State(state): State<SharedState>) -> Json<CartResponse> {
    Json(updated(state.cart.clear_cart()))
}

/// Endpoint: POST /checkout
/// Places the order remotely; the cart is only cleared if that succeeds.
async fn checkout(State(state): State<SharedState>) -> impl IntoResponse {
    match state.cart.checkout(&state.api).await {
        Ok(update) => (
            StatusCode::OK,
            Json(CartResponse {
                message: Some("Order placed".to_string()),
                ..updated(update)
            }),
        ),
        Err(CheckoutError::Cart(e)) => (StatusCode::OK, Json(rejected(&state, e.to_string()))),
        Err(CheckoutError::Api(e)) => (
            StatusCode::BAD_GATEWAY,
            Json(rejected(&state, e.user_message())),
        ),
    }
}
