//! # Cart Module
//!
//! Turns the server's bare cart records into display-ready line items and
//! computes the money owed.
//!
//! ## Reconciliation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          reconcile()                                    │
//! │                                                                         │
//! │  CartRecords (server order)          Catalog snapshot                   │
//! │  ┌─────────────┬─────┐               ┌──────┬─────────────┬──────┐      │
//! │  │ p1          │ 2   │               │ p1   │ Basketball  │ 10   │      │
//! │  │ p7 (gone)   │ 1   │               │ p2   │ Tennis Ball │ 5    │      │
//! │  │ p2          │ 1   │               └──────┴─────────────┴──────┘      │
//! │  └─────────────┴─────┘                                                  │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  items:        [Basketball ×2, Tennis Ball ×1]                          │
//! │  orphaned_ids: ["p7"]                                                   │
//! │                                                                         │
//! │  • record order is preserved        • inputs are never mutated          │
//! │  • unknown ids never abort the join • same inputs → same output         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller is responsible for passing a cart snapshot and a catalog
//! snapshot taken for the same load; a stale catalog shows up here only as
//! orphaned ids.

use std::collections::HashMap;

use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartLineItem, CartRecord, Product};
use crate::validation::validate_quantity;

// =============================================================================
// Reconciliation
// =============================================================================

/// Result of joining cart records with a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// Matched records, in the order the records were supplied.
    pub items: Vec<CartLineItem>,

    /// Product ids of records with no catalog match, in record order.
    pub orphaned_ids: Vec<String>,
}

impl Reconciliation {
    /// Total cost of the matched line items, clamped at `i64::MAX`.
    pub fn total(&self) -> Money {
        total_cart_value(&self.items)
    }

    /// Total cost, or an error if it does not fit in `Money`.
    pub fn checked_total(&self) -> CoreResult<Money> {
        checked_total_cart_value(&self.items)
    }

    pub fn has_orphans(&self) -> bool {
        !self.orphaned_ids.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Joins cart records with the catalog.
///
/// Records whose product id is missing from the catalog are left out of
/// `items` and listed in `orphaned_ids`. If the catalog repeats an id, the
/// last entry wins.
///
/// ```rust
/// use storefront_core::cart::reconcile;
/// use storefront_core::{CartRecord, Money, Product};
///
/// let catalog = vec![Product::new("p1", "Basketball", "Sports", Money::new(10), 5, "")];
/// let records = vec![CartRecord::new("p1", 2), CartRecord::new("gone", 1)];
///
/// let cart = reconcile(&records, &catalog);
/// assert_eq!(cart.items.len(), 1);
/// assert_eq!(cart.orphaned_ids, vec!["gone".to_string()]);
/// ```
pub fn reconcile(records: &[CartRecord], catalog: &[Product]) -> Reconciliation {
    let by_id: HashMap<&str, &Product> = catalog.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut result = Reconciliation {
        items: Vec::with_capacity(records.len()),
        orphaned_ids: Vec::new(),
    };

    for record in records {
        match by_id.get(record.product_id.as_str()) {
            Some(product) => result.items.push(CartLineItem {
                product: (*product).clone(),
                quantity: record.quantity,
            }),
            None => result.orphaned_ids.push(record.product_id.clone()),
        }
    }

    result
}

// =============================================================================
// Money Utilities
// =============================================================================

/// Unit cost × quantity, saturating.
#[inline]
pub fn line_item_cost(item: &CartLineItem) -> Money {
    item.product.cost.multiply_quantity(item.quantity)
}

/// Sum of every line item's cost. Zero for an empty cart.
///
/// Saturates instead of wrapping, so non-negative line costs never produce a
/// negative total. Use [`checked_total_cart_value`] before charging anyone.
pub fn total_cart_value(items: &[CartLineItem]) -> Money {
    items
        .iter()
        .map(line_item_cost)
        .fold(Money::zero(), |acc, cost| acc.saturating_add(cost))
}

/// Sum of every line item's cost, failing on the first line that overflows.
///
/// ```rust
/// use storefront_core::cart::{checked_total_cart_value, reconcile};
/// use storefront_core::{CartRecord, Money, Product};
///
/// let catalog = vec![Product::new("p1", "Basketball", "Sports", Money::new(10), 5, "")];
///
/// let cart = reconcile(&[CartRecord::new("p1", 2)], &catalog);
/// assert_eq!(checked_total_cart_value(&cart.items).unwrap(), Money::new(20));
///
/// let cart = reconcile(&[CartRecord::new("p1", i64::MAX / 5)], &catalog);
/// assert!(checked_total_cart_value(&cart.items).is_err());
/// ```
pub fn checked_total_cart_value(items: &[CartLineItem]) -> CoreResult<Money> {
    items.iter().try_fold(Money::zero(), |acc, item| {
        item.product
            .cost
            .checked_multiply_quantity(item.quantity)
            .and_then(|cost| acc.checked_add(cost))
            .ok_or_else(|| CoreError::AmountOverflow {
                product_id: item.product.id.clone(),
            })
    })
}

/// Total number of units across all line items.
pub fn total_quantity(items: &[CartLineItem]) -> i64 {
    items.iter().map(|i| i.quantity).sum()
}

// =============================================================================
// Cart Updates
// =============================================================================

/// Whether the product is already in the cart.
pub fn is_item_in_cart(records: &[CartRecord], product_id: &str) -> bool {
    records.iter().any(|r| r.product_id == product_id)
}

/// Where a cart change was requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartUpdateOrigin {
    /// "Add to cart" on a product card. Refused for products already in the cart.
    AddButton,
    /// Quantity controls in the cart itself.
    QuantityControl,
}

/// A change to send to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartUpdate {
    /// Set the product's quantity.
    Set { product_id: String, quantity: i64 },
    /// Drop the product from the cart.
    Remove { product_id: String },
}

impl CartUpdate {
    pub fn product_id(&self) -> &str {
        match self {
            CartUpdate::Set { product_id, .. } | CartUpdate::Remove { product_id } => product_id,
        }
    }

    /// The quantity the backend should record (zero for a removal).
    pub fn quantity(&self) -> i64 {
        match self {
            CartUpdate::Set { quantity, .. } => *quantity,
            CartUpdate::Remove { .. } => 0,
        }
    }
}

/// Why a cart change was refused before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartUpdateRejected {
    AlreadyInCart { product_id: String },
    QuantityTooLarge { requested: i64, max: i64 },
}

impl CartUpdateRejected {
    /// Message shown to the shopper.
    pub fn message(&self) -> String {
        match self {
            CartUpdateRejected::AlreadyInCart { .. } => {
                "Item already in cart. Use the cart sidebar to update quantity or remove item."
                    .to_string()
            }
            CartUpdateRejected::QuantityTooLarge { max, .. } => {
                format!("Quantity cannot exceed {}", max)
            }
        }
    }
}

/// Decides what a requested cart change turns into.
///
/// ## Rules (first match wins)
/// 1. From the add button, for a product already in the cart → `AlreadyInCart`
/// 2. Quantity below one → `Remove`
/// 3. Quantity above [`crate::MAX_ITEM_QUANTITY`] → `QuantityTooLarge`
/// 4. Otherwise → `Set`
pub fn plan_cart_update(
    records: &[CartRecord],
    product_id: &str,
    quantity: i64,
    origin: CartUpdateOrigin,
) -> Result<CartUpdate, CartUpdateRejected> {
    if origin == CartUpdateOrigin::AddButton && is_item_in_cart(records, product_id) {
        return Err(CartUpdateRejected::AlreadyInCart {
            product_id: product_id.to_string(),
        });
    }

    if quantity < 1 {
        return Ok(CartUpdate::Remove {
            product_id: product_id.to_string(),
        });
    }

    if let Err(ValidationError::OutOfRange { max, .. }) = validate_quantity(quantity) {
        return Err(CartUpdateRejected::QuantityTooLarge {
            requested: quantity,
            max,
        });
    }

    Ok(CartUpdate::Set {
        product_id: product_id.to_string(),
        quantity,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, cost: i64) -> Product {
        Product::new(id, format!("Product {}", id), "Sports", Money::new(cost), 4, "")
    }

    fn catalog() -> Vec<Product> {
        vec![product("p1", 10), product("p2", 5), product("p3", 150)]
    }

    #[test]
    fn test_reconcile_end_to_end_total() {
        let records = vec![CartRecord::new("p1", 2), CartRecord::new("p2", 1)];
        let cart = reconcile(&records, &catalog());

        assert_eq!(cart.items.len(), 2);
        assert_eq!(total_cart_value(&cart.items), Money::new(25));
        assert_eq!(cart.total(), Money::new(25));
        assert!(!cart.has_orphans());
    }

    #[test]
    fn test_reconcile_preserves_record_order() {
        let records = vec![
            CartRecord::new("p3", 1),
            CartRecord::new("p1", 4),
            CartRecord::new("p2", 2),
        ];
        let cart = reconcile(&records, &catalog());

        let ids: Vec<&str> = cart.items.iter().map(|i| i.product.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p1", "p2"]);
        let qtys: Vec<i64> = cart.items.iter().map(|i| i.quantity).collect();
        assert_eq!(qtys, vec![1, 4, 2]);
    }

    #[test]
    fn test_reconcile_reports_orphans_in_order() {
        let records = vec![
            CartRecord::new("gone-1", 1),
            CartRecord::new("p2", 3),
            CartRecord::new("gone-2", 2),
        ];
        let cart = reconcile(&records, &catalog());

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product.id, "p2");
        assert_eq!(cart.orphaned_ids, vec!["gone-1", "gone-2"]);
        assert!(cart.items.len() <= records.len());
    }

    #[test]
    fn test_reconcile_empty_inputs() {
        let cart = reconcile(&[], &catalog());
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());

        let cart = reconcile(&[CartRecord::new("p1", 1)], &[]);
        assert!(cart.is_empty());
        assert_eq!(cart.orphaned_ids, vec!["p1"]);
    }

    #[test]
    fn test_reconcile_is_idempotent_and_pure() {
        let records = vec![CartRecord::new("p1", 2), CartRecord::new("x", 1)];
        let products = catalog();
        let records_before = records.clone();
        let products_before = products.clone();

        let first = reconcile(&records, &products);
        let second = reconcile(&records, &products);

        assert_eq!(first, second);
        assert_eq!(records, records_before);
        assert_eq!(products, products_before);
    }

    #[test]
    fn test_duplicate_catalog_id_last_wins() {
        let products = vec![product("p1", 10), product("p1", 99)];
        let cart = reconcile(&[CartRecord::new("p1", 1)], &products);
        assert_eq!(cart.total(), Money::new(99));
    }

    #[test]
    fn test_total_is_additive() {
        let a = reconcile(&[CartRecord::new("p1", 2)], &catalog()).items;
        let b = reconcile(
            &[CartRecord::new("p2", 3), CartRecord::new("p3", 1)],
            &catalog(),
        )
        .items;
        let joined: Vec<CartLineItem> = a.iter().chain(b.iter()).cloned().collect();

        assert_eq!(
            total_cart_value(&joined),
            total_cart_value(&a) + total_cart_value(&b)
        );
        assert_eq!(total_cart_value(&[]), Money::zero());
    }

    #[test]
    fn test_overflowing_total_is_refused_not_wrapped() {
        let huge = i64::MAX / 5;
        let cart = reconcile(
            &[CartRecord::new("p2", 1), CartRecord::new("p1", huge)],
            &catalog(),
        );

        assert_eq!(cart.total(), Money::new(i64::MAX));
        assert!(!cart.total().is_negative());
        assert!(matches!(
            cart.checked_total(),
            Err(CoreError::AmountOverflow { ref product_id }) if product_id == "p1"
        ));

        let fine = reconcile(&[CartRecord::new("p3", 999)], &catalog());
        assert_eq!(fine.checked_total().unwrap(), Money::new(149_850));
    }

    #[test]
    fn test_line_item_cost_and_quantity() {
        let cart = reconcile(
            &[CartRecord::new("p3", 3), CartRecord::new("p2", 2)],
            &catalog(),
        );
        assert_eq!(line_item_cost(&cart.items[0]), Money::new(450));
        assert_eq!(cart.items[1].cost(), Money::new(10));
        assert_eq!(total_quantity(&cart.items), 5);
    }

    #[test]
    fn test_plan_add_button_refuses_duplicate() {
        let records = vec![CartRecord::new("p1", 1)];
        let result = plan_cart_update(&records, "p1", 1, CartUpdateOrigin::AddButton);
        assert_eq!(
            result,
            Err(CartUpdateRejected::AlreadyInCart {
                product_id: "p1".to_string()
            })
        );
        assert!(result.unwrap_err().message().starts_with("Item already in cart"));
    }

    #[test]
    fn test_plan_quantity_control() {
        let records = vec![CartRecord::new("p1", 1)];

        let set = plan_cart_update(&records, "p1", 3, CartUpdateOrigin::QuantityControl).unwrap();
        assert_eq!(
            set,
            CartUpdate::Set {
                product_id: "p1".to_string(),
                quantity: 3
            }
        );

        let remove =
            plan_cart_update(&records, "p1", 0, CartUpdateOrigin::QuantityControl).unwrap();
        assert_eq!(remove.product_id(), "p1");
        assert_eq!(remove.quantity(), 0);
        assert!(matches!(remove, CartUpdate::Remove { .. }));
    }

    #[test]
    fn test_plan_rejects_huge_quantity() {
        let result = plan_cart_update(&[], "p1", 1000, CartUpdateOrigin::AddButton);
        assert_eq!(
            result,
            Err(CartUpdateRejected::QuantityTooLarge {
                requested: 1000,
                max: crate::MAX_ITEM_QUANTITY,
            })
        );

        let at_limit = plan_cart_update(&[], "p1", 999, CartUpdateOrigin::QuantityControl);
        assert!(matches!(at_limit, Ok(CartUpdate::Set { quantity: 999, .. })));
    }

    #[test]
    fn test_is_item_in_cart() {
        let records = vec![CartRecord::new("p1", 1)];
        assert!(is_item_in_cart(&records, "p1"));
        assert!(!is_item_in_cart(&records, "p2"));
        assert!(!is_item_in_cart(&[], "p1"));
    }
}
