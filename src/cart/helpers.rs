//! Shopping Cart Business Logic Helpers
//!
//! Pure state transitions for the cart. Each function takes the current cart
//! and returns the next one, `None` when the request is a no-op, or a
//! [`CartError`] when it must be rejected. Totals are recomputed on every
//! produced state.

use rust_decimal::Decimal;

use super::error::CartError;
use super::models::{Cart, CartItem, LineKey, ProductSelection};

/// Derives `(total_items, total_price)` from line items.
pub fn recompute_totals(items: &[CartItem]) -> (u32, Decimal) {
    items.iter().fold((0u32, Decimal::ZERO), |(count, price), item| {
        (count.saturating_add(item.quantity), price + item.line_total())
    })
}

/// Merges `quantity` units of `product` into the cart.
///
/// # Behaviour
///
/// * If a line with the same (product, branch) exists, its quantity grows by
///   `quantity`.
/// * Otherwise a new line is appended at the end.
/// * A resulting quantity above `max_stock` rejects the whole request.
/// * A zero quantity is a no-op.
pub fn add_item(
    cart: &Cart,
    product: ProductSelection,
    quantity: u32,
) -> Result<Option<Cart>, CartError> {
    if quantity == 0 {
        return Ok(None);
    }

    let mut items = cart.items.clone();
    if let Some(existing) = items.iter_mut().find(|i| i.matches(product.key())) {
        let requested = existing.quantity.saturating_add(quantity);
        if requested > existing.max_stock {
            return Err(CartError::ExceedsStock {
                product_name: existing.product_name.clone(),
                requested,
                max_stock: existing.max_stock,
            });
        }
        existing.quantity = requested;
    } else {
        if quantity > product.max_stock {
            return Err(CartError::ExceedsStock {
                product_name: product.product_name,
                requested: quantity,
                max_stock: product.max_stock,
            });
        }
        items.push(product.into_item(quantity));
    }

    Ok(Some(Cart::from_items(items)))
}

/// Removes the line identified by `key`. Absent lines are a no-op.
pub fn remove_item(cart: &Cart, key: LineKey<'_>) -> Option<Cart> {
    cart.find(key)?;
    let items = cart
        .items
        .iter()
        .filter(|i| !i.matches(key))
        .cloned()
        .collect();
    Some(Cart::from_items(items))
}

/// Sets the quantity of the line identified by `key`.
///
/// Quantities below 1 are ignored rather than treated as a removal; the
/// existing quantity is kept. Absent lines are a no-op.
pub fn set_quantity(
    cart: &Cart,
    key: LineKey<'_>,
    quantity: i64,
) -> Result<Option<Cart>, CartError> {
    if quantity < 1 {
        return Ok(None);
    }
    let Some(current) = cart.find(key) else {
        return Ok(None);
    };

    let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
    if requested > current.max_stock {
        return Err(CartError::ExceedsStock {
            product_name: current.product_name.clone(),
            requested,
            max_stock: current.max_stock,
        });
    }
    if requested == current.quantity {
        return Ok(None);
    }

    let items = cart
        .items
        .iter()
        .map(|i| {
            if i.matches(key) {
                CartItem {
                    quantity: requested,
                    ..i.clone()
                }
            } else {
                i.clone()
            }
        })
        .collect();
    Ok(Some(Cart::from_items(items)))
}

/// Takes the quantities in `ordered` out of the cart. Lines that grew after
/// the order was taken keep the surplus; lines not in `ordered` are kept.
pub fn remove_ordered(cart: &Cart, ordered: &[CartItem]) -> Option<Cart> {
    let mut changed = false;
    let items: Vec<CartItem> = cart
        .items
        .iter()
        .filter_map(|item| {
            let Some(placed) = ordered.iter().find(|o| o.matches(item.key())) else {
                return Some(item.clone());
            };
            changed = true;
            let remaining = item.quantity.saturating_sub(placed.quantity);
            (remaining > 0).then(|| CartItem {
                quantity: remaining,
                ..item.clone()
            })
        })
        .collect();

    changed.then(|| Cart::from_items(items))
}

/// Produces a human-readable one-line summary for a list of cart items.
///
/// Example output: `"2x Kibble (Downtown), 1x Flea collar (Uptown)"`.
pub fn format_item_summary(items: &[CartItem]) -> String {
    items
        .iter()
        .map(|i| format!("{}x {} ({})", i.quantity, i.product_name, i.branch_name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(product_id: &str, branch_id: &str, price: i64, max_stock: u32) -> ProductSelection {
        ProductSelection {
            product_id: product_id.into(),
            branch_id: branch_id.into(),
            product_name: format!("Product {product_id}"),
            product_image: String::new(),
            price: Decimal::from(price),
            max_stock,
            branch_name: format!("Branch {branch_id}"),
        }
    }

    #[test]
    fn test_add_aggregates_same_line() {
        let cart = Cart::empty();
        let cart = add_item(&cart, selection("P1", "B1", 100, 5), 1)
            .unwrap()
            .unwrap();
        assert_eq!(cart.total_items, 1);
        assert_eq!(cart.total_price, Decimal::from(100));

        let cart = add_item(&cart, selection("P1", "B1", 100, 5), 3)
            .unwrap()
            .unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 4);
        assert_eq!(cart.total_price, Decimal::from(400));

        let rejected = add_item(&cart, selection("P1", "B1", 100, 5), 5);
        assert!(matches!(
            rejected,
            Err(CartError::ExceedsStock {
                requested: 9,
                max_stock: 5,
                ..
            })
        ));
    }

    #[test]
    fn test_same_product_at_two_branches_is_two_lines() {
        let cart = add_item(&Cart::empty(), selection("P1", "B1", 10, 5), 2)
            .unwrap()
            .unwrap();
        let cart = add_item(&cart, selection("P1", "B2", 10, 5), 1)
            .unwrap()
            .unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].branch_id, "B1");
        assert_eq!(cart.items[1].branch_id, "B2");
        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.total_price, Decimal::from(30));
    }

    #[test]
    fn test_add_new_line_above_stock_is_rejected() {
        let result = add_item(&Cart::empty(), selection("P1", "B1", 10, 2), 3);
        assert!(result.is_err());
    }

    #[test]
    fn test_add_zero_is_noop() {
        let result = add_item(&Cart::empty(), selection("P1", "B1", 10, 2), 0);
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_remove_missing_line_is_noop() {
        let cart = add_item(&Cart::empty(), selection("P1", "B1", 10, 5), 1)
            .unwrap()
            .unwrap();
        assert!(remove_item(&cart, LineKey::new("P1", "B2")).is_none());

        let cart = remove_item(&cart, LineKey::new("P1", "B1")).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items, 0);
        assert_eq!(cart.total_price, Decimal::ZERO);
    }

    #[test]
    fn test_set_quantity_clamps_and_rejects() {
        let cart = add_item(&Cart::empty(), selection("P1", "B1", 7, 5), 2)
            .unwrap()
            .unwrap();
        let key = LineKey::new("P1", "B1");

        assert!(matches!(set_quantity(&cart, key, 0), Ok(None)));
        assert!(matches!(set_quantity(&cart, key, -3), Ok(None)));
        assert!(set_quantity(&cart, key, 6).is_err());
        assert!(matches!(set_quantity(&cart, key, 2), Ok(None)));

        let cart = set_quantity(&cart, key, 5).unwrap().unwrap();
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.total_price, Decimal::from(35));
    }

    #[test]
    fn test_remove_ordered_keeps_later_additions() {
        let ordered = add_item(&Cart::empty(), selection("P1", "B1", 10, 9), 2)
            .unwrap()
            .unwrap();

        let grown = add_item(&ordered, selection("P1", "B1", 10, 9), 1)
            .unwrap()
            .unwrap();
        let current = add_item(&grown, selection("P2", "B1", 5, 9), 4)
            .unwrap()
            .unwrap();

        let remaining = remove_ordered(&current, &ordered.items).unwrap();
        assert_eq!(remaining.items.len(), 2);
        assert_eq!(remaining.items[0].product_id, "P1");
        assert_eq!(remaining.items[0].quantity, 1);
        assert_eq!(remaining.items[1].product_id, "P2");
        assert_eq!(remaining.total_items, 5);
        assert_eq!(remaining.total_price, Decimal::from(30));

        let settled = remove_ordered(&ordered, &ordered.items).unwrap();
        assert!(settled.is_empty());
        assert!(remove_ordered(&Cart::empty(), &ordered.items).is_none());
    }

    #[test]
    fn test_format_item_summary() {
        let cart = add_item(&Cart::empty(), selection("P1", "B1", 7, 5), 2)
            .unwrap()
            .unwrap();
        assert_eq!(format_item_summary(&cart.items), "2x Product P1 (Branch B1)");
    }
}
