//! Shopping Cart State Management
//!
//! [`CartStore`] is the single owner of the cart. Every mutation builds the
//! next cart from the current snapshot and swaps it in whole, so readers and
//! subscribers never observe a half-applied change. Each new state is queued
//! for a background writer in the order it was produced; storage latency never
//! holds up a mutation or a reader.

use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

use super::error::{CartError, CheckoutError};
use super::helpers::{self, format_item_summary};
use super::models::{Cart, LineKey, ProductSelection};
use crate::api::models::{OrderLine, OrderRequest};
use crate::api::ApiClient;
use crate::notify::{Notification, Notifier};
use crate::storage::KeyValueStore;

/// Storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "petcare.cart";

/// Result of a cart operation that was not rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct CartUpdate {
    pub cart: Arc<Cart>,
    /// `false` when the request was a no-op
    pub changed: bool,
}

enum WriteCommand {
    Save(String),
    Flush(oneshot::Sender<()>),
}

pub struct CartStore {
    state: watch::Sender<Arc<Cart>>,
    writer: mpsc::UnboundedSender<WriteCommand>,
    notifier: Arc<dyn Notifier>,
}

impl CartStore {
    /// Rehydrates the cart from `storage`, falling back to an empty cart.
    pub fn load(storage: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        let cart = match storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => restore_cart(&raw).unwrap_or_default(),
            Ok(None) => Cart::empty(),
            Err(e) => {
                tracing::error!("Failed to read stored cart: {}", e);
                Cart::empty()
            }
        };

        tracing::debug!(
            lines = cart.items.len(),
            total_items = cart.total_items,
            "Cart loaded"
        );

        let (state, _) = watch::channel(Arc::new(cart));
        Self {
            state,
            writer: spawn_writer(storage),
            notifier,
        }
    }

    /// The current cart.
    pub fn snapshot(&self) -> Arc<Cart> {
        self.state.borrow().clone()
    }

    /// Waits until every state produced so far has reached storage.
    pub async fn flush(&self) {
        let (done, written) = oneshot::channel();
        if self.writer.send(WriteCommand::Flush(done)).is_ok() {
            let _ = written.await;
        }
    }

    /// A receiver that observes every new cart state.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.state.subscribe()
    }

    /// Adds `quantity` (default 1) units of `product`.
    pub fn add_to_cart(
        &self,
        product: ProductSelection,
        quantity: Option<u32>,
    ) -> Result<CartUpdate, CartError> {
        let quantity = quantity.unwrap_or(1);
        tracing::debug!(
            product_id = %product.product_id,
            branch_id = %product.branch_id,
            quantity,
            "add_to_cart"
        );
        self.apply(|cart| helpers::add_item(cart, product, quantity))
    }

    pub fn remove_from_cart(&self, product_id: &str, branch_id: &str) -> CartUpdate {
        tracing::debug!(product_id, branch_id, "remove_from_cart");
        let key = LineKey::new(product_id, branch_id);
        self.apply_infallible(|cart| helpers::remove_item(cart, key))
    }

    /// Sets a line's quantity. Values below 1 leave the line untouched.
    pub fn update_quantity(
        &self,
        product_id: &str,
        branch_id: &str,
        quantity: i64,
    ) -> Result<CartUpdate, CartError> {
        tracing::debug!(product_id, branch_id, quantity, "update_quantity");
        let key = LineKey::new(product_id, branch_id);
        self.apply(|cart| helpers::set_quantity(cart, key, quantity))
    }

    /// Empties the cart. The empty state is persisted even if nothing changed.
    pub fn clear_cart(&self) -> CartUpdate {
        tracing::debug!("clear_cart");
        let mut changed = false;
        self.state.send_if_modified(|current| {
            let next = Cart::empty();
            self.persist(&next);
            changed = !current.is_empty();
            *current = Arc::new(next);
            changed
        });
        CartUpdate {
            cart: self.snapshot(),
            changed,
        }
    }

    /// Places an order for the current cart and takes the ordered lines out
    /// of it on success. Lines added while the order was in flight stay.
    ///
    /// Failures leave the cart as it was and raise a notification.
    pub async fn checkout(&self, api: &ApiClient) -> Result<CartUpdate, CheckoutError> {
        let cart = self.snapshot();
        if cart.is_empty() {
            self.notifier
                .notify(Notification::warning(CartError::EmptyCart.to_string()));
            return Err(CartError::EmptyCart.into());
        }

        let order = order_for(&cart);
        match api.place_order(&order).await {
            Ok(envelope) => {
                tracing::info!(
                    lines = cart.items.len(),
                    summary = %format_item_summary(&cart.items),
                    "Checkout completed"
                );
                let update =
                    self.apply_infallible(|current| helpers::remove_ordered(current, &cart.items));
                self.notifier.notify(Notification::success(
                    envelope
                        .message
                        .unwrap_or_else(|| "Order placed".to_string()),
                ));
                Ok(update)
            }
            Err(e) => {
                tracing::warn!("Checkout failed: {}", e);
                self.notifier.notify(Notification::error(e.user_message()));
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn apply<F>(&self, op: F) -> Result<CartUpdate, CartError>
    where
        F: FnOnce(&Cart) -> Result<Option<Cart>, CartError>,
    {
        let mut outcome = Ok(None);
        self.state.send_if_modified(|current| match op(&**current) {
            Ok(Some(next)) => {
                self.persist(&next);
                let next = Arc::new(next);
                *current = next.clone();
                outcome = Ok(Some(next));
                true
            }
            Ok(None) => false,
            Err(e) => {
                outcome = Err(e);
                false
            }
        });

        match outcome {
            Ok(Some(cart)) => Ok(CartUpdate {
                cart,
                changed: true,
            }),
            Ok(None) => Ok(CartUpdate {
                cart: self.snapshot(),
                changed: false,
            }),
            Err(e) => {
                self.notifier.notify(Notification::warning(e.to_string()));
                Err(e)
            }
        }
    }

    fn apply_infallible<F>(&self, op: F) -> CartUpdate
    where
        F: FnOnce(&Cart) -> Option<Cart>,
    {
        match self.apply(|cart| Ok(op(cart))) {
            Ok(update) => update,
            Err(_) => CartUpdate {
                cart: self.snapshot(),
                changed: false,
            },
        }
    }

    /// Queues `cart` for the writer. Failures are logged, never propagated.
    fn persist(&self, cart: &Cart) {
        let raw = match serde_json::to_string(cart) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Failed to serialize cart: {}", e);
                return;
            }
        };
        if self.writer.send(WriteCommand::Save(raw)).is_err() {
            tracing::error!("Cart writer is gone, state not persisted");
        }
    }
}

/// Starts the thread that applies queued writes to `storage`, oldest first.
/// It exits once the store is dropped.
fn spawn_writer(storage: Arc<dyn KeyValueStore>) -> mpsc::UnboundedSender<WriteCommand> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("cart-writer".into())
        .spawn(move || {
            while let Some(command) = rx.blocking_recv() {
                match command {
                    WriteCommand::Save(raw) => {
                        if let Err(e) = storage.set(CART_STORAGE_KEY, &raw) {
                            tracing::error!("Failed to persist cart: {}", e);
                        }
                    }
                    WriteCommand::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });
    if let Err(e) = spawned {
        tracing::error!("Failed to start cart writer: {}", e);
    }
    tx
}

/// Parses a stored cart. Totals are recomputed; any broken line makes the
/// whole value unusable.
fn restore_cart(raw: &str) -> Option<Cart> {
    let stored: Cart = match serde_json::from_str(raw) {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!("Discarding unreadable stored cart: {}", e);
            return None;
        }
    };

    let mut seen = HashSet::new();
    for item in &stored.items {
        let valid = item.quantity >= 1
            && item.quantity <= item.max_stock
            && item.price >= Decimal::ZERO
            && seen.insert((item.product_id.as_str(), item.branch_id.as_str()));
        if !valid {
            tracing::warn!(
                product_id = %item.product_id,
                branch_id = %item.branch_id,
                "Discarding stored cart with invalid line"
            );
            return None;
        }
    }

    Some(Cart::from_items(stored.items))
}

fn order_for(cart: &Cart) -> OrderRequest {
    OrderRequest {
        items: cart
            .items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id.clone(),
                branch_id: item.branch_id.clone(),
                quantity: item.quantity,
                unit_price: item.price,
            })
            .collect(),
        total_price: cart.total_price,
    }
}
