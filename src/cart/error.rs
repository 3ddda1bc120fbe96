use thiserror::Error;

use crate::api::ApiError;

/// Non-fatal cart rejections. The cart is left unchanged whenever one of
/// these is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Only {max_stock} of {product_name} available, cannot hold {requested}")]
    ExceedsStock {
        product_name: String,
        requested: u32,
        max_stock: u32,
    },

    #[error("Cart is empty")]
    EmptyCart,
}

/// Why a checkout did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
