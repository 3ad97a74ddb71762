//! # Cart Reconciliation
//!
//! Brings a stored cart up to date with the current catalog.
//!
//! ## Load Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Page Load                                   │
//! │                                                                         │
//! │  storage blob                                                           │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  migrate_cart()     StoredLineItem → CartLineItem                       │
//! │      │              fills minimum/step/maximum for old carts            │
//! │      ▼                                                                  │
//! │  reconcile()        refresh id/price/stock/minimum/step/image by code   │
//! │      │              drop codes missing from the snapshot                │
//! │      ▼                                                                  │
//! │  normalize_cart()   heal rules, correct quantities,                     │
//! │      │              drop items whose stock is now zero                  │
//! │      ▼                                                                  │
//! │  write back + render                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every step is pure and idempotent. Persisting the result and telling the
//! customer what changed belong to the caller.

use crate::quantity::RawQuantity;
use crate::types::{CartLineItem, ProductSnapshot, StoredLineItem};

// =============================================================================
// Migration
// =============================================================================

/// Converts a stored line item into a validated one.
///
/// - `minimum`/`step` that are missing or not positive become 1
/// - `maximum` is the explicit `maximo` if positive, else `stock` if
///   positive, else unbounded
/// - `quantity` is carried over as-is (negative or unparseable becomes 0);
///   the normalization pass corrects it
///
/// Idempotent: migrating an already migrated item yields the same item.
pub fn migrate_item(stored: StoredLineItem) -> CartLineItem {
    let stock = parse_value(&stored.stock).map(|s| u32::try_from(s.max(0)).unwrap_or(u32::MAX));
    let maximum = positive(&stored.maximum).or_else(|| stock.filter(|s| *s > 0));

    CartLineItem {
        product_id: parse_value(&stored.id).unwrap_or(0),
        code: stored.code,
        title: stored.title,
        price: stored.price,
        quantity: positive(&stored.quantity).unwrap_or(0),
        minimum: positive(&stored.minimum).unwrap_or(1),
        step: positive(&stored.step).unwrap_or(1),
        maximum,
        stock,
        image: stored.image,
        description: stored.description,
    }
}

/// Migrates every stored item, preserving order.
pub fn migrate_cart(stored: Vec<StoredLineItem>) -> Vec<CartLineItem> {
    stored.into_iter().map(migrate_item).collect()
}

fn parse_value(value: &serde_json::Value) -> Option<i64> {
    RawQuantity::from(value).parse()
}

fn positive(value: &serde_json::Value) -> Option<u32> {
    parse_value(value)
        .filter(|v| *v > 0)
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
}

// =============================================================================
// Reconciliation
// =============================================================================

/// Result of reconciling a cart against a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Surviving items, in their original relative order.
    pub updated_cart: Vec<CartLineItem>,
    /// How many items were dropped because their code is gone.
    pub removed_count: usize,
    /// Codes of the dropped items, in cart order.
    pub removed_codes: Vec<String>,
    /// Whether any refreshed field differs from the stored value.
    pub changed: bool,
}

/// Refreshes every cart item from the snapshot, by product code.
///
/// ## Merge Policy
/// | Field                                       | Source        |
/// |---------------------------------------------|---------------|
/// | `product_id`, `price`, `stock`              | snapshot      |
/// | `minimum`, `step`, `image`                  | snapshot      |
/// | `quantity`, `maximum`, `title`, description | stored item   |
///
/// Quantities are not corrected here; run [`normalize_cart`] afterwards.
///
/// ## Example
/// ```rust
/// use rmkits_core::reconcile::reconcile;
/// use rmkits_core::types::ProductSnapshot;
///
/// let result = reconcile(&[], &ProductSnapshot::new());
/// assert!(result.updated_cart.is_empty());
/// assert!(!result.changed);
/// ```
pub fn reconcile(cart: &[CartLineItem], snapshot: &ProductSnapshot) -> Reconciliation {
    let mut updated_cart = Vec::with_capacity(cart.len());
    let mut removed_codes = Vec::new();
    let mut changed = false;

    for item in cart {
        let Some(current) = snapshot.get(&item.code) else {
            removed_codes.push(item.code.clone());
            continue;
        };

        let refreshed = CartLineItem {
            product_id: current.id,
            price: current.price,
            stock: Some(current.stock),
            minimum: current.minimum,
            step: current.step,
            image: current.image.clone(),
            ..item.clone()
        };

        if refreshed != *item {
            changed = true;
        }
        updated_cart.push(refreshed);
    }

    Reconciliation {
        updated_cart,
        removed_count: removed_codes.len(),
        removed_codes,
        changed,
    }
}

// =============================================================================
// Normalization Pass
// =============================================================================

/// Heals an item's rules and corrects its quantity.
///
/// `step ≥ 1`, `minimum ≥ step`, `maximum` positive or unbounded, then the
/// quantity goes through the cart corrector.
pub fn normalize_item(item: CartLineItem) -> CartLineItem {
    let rules = item.rules();
    CartLineItem {
        quantity: rules.normalize(item.quantity),
        minimum: rules.minimum(),
        step: rules.step(),
        maximum: rules.maximum(),
        ..item
    }
}

/// Result of a cart-level normalization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCart {
    pub items: Vec<CartLineItem>,
    /// Codes dropped because their refreshed stock is zero.
    pub out_of_stock: Vec<String>,
    /// How many surviving items were modified.
    pub adjusted: usize,
}

impl NormalizedCart {
    /// Whether the pass modified or dropped anything.
    pub fn changed(&self) -> bool {
        self.adjusted > 0 || !self.out_of_stock.is_empty()
    }
}

/// Normalizes every item and drops those with no stock left.
pub fn normalize_cart(items: Vec<CartLineItem>) -> NormalizedCart {
    let mut kept = Vec::with_capacity(items.len());
    let mut out_of_stock = Vec::new();
    let mut adjusted = 0;

    for item in items {
        if item.stock == Some(0) {
            out_of_stock.push(item.code);
            continue;
        }
        let normalized = normalize_item(item.clone());
        if normalized != item {
            adjusted += 1;
        }
        kept.push(normalized);
    }

    NormalizedCart {
        items: kept,
        out_of_stock,
        adjusted,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::SnapshotProduct;
    use serde_json::json;

    fn item(code: &str, quantity: u32, price: i64, stock: Option<u32>) -> CartLineItem {
        CartLineItem {
            product_id: 1,
            code: code.to_string(),
            title: format!("Producto {}", code),
            price: Money::from_pesos(price),
            quantity,
            minimum: 1,
            step: 1,
            maximum: stock,
            stock,
            image: None,
            description: None,
        }
    }

    fn snap(id: i64, price: i64, stock: u32, minimum: u32, step: u32) -> SnapshotProduct {
        SnapshotProduct {
            id,
            price: Money::from_pesos(price),
            stock,
            minimum,
            step,
            image: None,
        }
    }

    fn stored(value: serde_json::Value) -> StoredLineItem {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_reconcile_drops_missing_codes() {
        let cart = vec![item("A", 3, 100, None)];
        let result = reconcile(&cart, &ProductSnapshot::new());

        assert!(result.updated_cart.is_empty());
        assert_eq!(result.removed_count, 1);
        assert_eq!(result.removed_codes, vec!["A".to_string()]);
    }

    #[test]
    fn test_reconcile_refreshes_price() {
        let cart = vec![item("A", 3, 100, Some(5))];
        let snapshot = ProductSnapshot::from([("A".to_string(), snap(1, 120, 5, 1, 1))]);

        let result = reconcile(&cart, &snapshot);

        assert!(result.changed);
        assert_eq!(result.removed_count, 0);
        assert_eq!(result.updated_cart[0].price, Money::from_pesos(120));
        assert_eq!(result.updated_cart[0].quantity, 3);
    }

    #[test]
    fn test_reconcile_unchanged_when_identical() {
        let cart = vec![item("A", 3, 100, Some(5))];
        let snapshot = ProductSnapshot::from([("A".to_string(), snap(1, 100, 5, 1, 1))]);

        let result = reconcile(&cart, &snapshot);
        assert!(!result.changed);
        assert_eq!(result.updated_cart, cart);
    }

    #[test]
    fn test_reconcile_follows_code_not_id() {
        // catalog re-import gave the product a new row id
        let cart = vec![item("A", 3, 100, Some(5))];
        let snapshot = ProductSnapshot::from([("A".to_string(), snap(77, 100, 5, 1, 1))]);

        let result = reconcile(&cart, &snapshot);
        assert!(result.changed);
        assert_eq!(result.updated_cart[0].product_id, 77);
    }

    #[test]
    fn test_reconcile_preserves_order() {
        let cart = vec![
            item("C", 1, 10, None),
            item("GONE", 1, 10, None),
            item("A", 1, 10, None),
            item("B", 1, 10, None),
        ];
        let snapshot = ProductSnapshot::from([
            ("A".to_string(), snap(1, 10, 9, 1, 1)),
            ("B".to_string(), snap(2, 10, 9, 1, 1)),
            ("C".to_string(), snap(3, 10, 9, 1, 1)),
        ]);

        let result = reconcile(&cart, &snapshot);
        let codes: Vec<_> = result.updated_cart.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["C", "A", "B"]);
        assert_eq!(result.removed_count, 1);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let cart = vec![item("A", 3, 100, Some(5)), item("B", 7, 50, None)];
        let snapshot = ProductSnapshot::from([("A".to_string(), snap(4, 130, 40, 6, 6))]);

        let once = reconcile(&cart, &snapshot);
        let twice = reconcile(&once.updated_cart, &snapshot);

        assert_eq!(twice.updated_cart, once.updated_cart);
        assert_eq!(twice.removed_count, 0);
        assert!(!twice.changed);
    }

    #[test]
    fn test_migrate_fills_missing_rules() {
        let migrated = migrate_item(stored(json!({
            "id": 3, "codigo": "A0001", "titulo": "Vasos", "precio": 250, "cantidad": 4
        })));

        assert_eq!(migrated.minimum, 1);
        assert_eq!(migrated.step, 1);
        assert_eq!(migrated.maximum, None);
        assert_eq!(migrated.quantity, 4);
    }

    #[test]
    fn test_migrate_maximum_fallback() {
        let from_explicit = migrate_item(stored(json!({"codigo": "A", "maximo": 30, "stock": 50})));
        assert_eq!(from_explicit.maximum, Some(30));

        let from_stock = migrate_item(stored(json!({"codigo": "A", "stock": "50"})));
        assert_eq!(from_stock.maximum, Some(50));

        let invalid_explicit = migrate_item(stored(json!({"codigo": "A", "maximo": 0, "stock": 50})));
        assert_eq!(invalid_explicit.maximum, Some(50));

        let none = migrate_item(stored(json!({"codigo": "A", "stock": 0})));
        assert_eq!(none.maximum, None);
        assert_eq!(none.stock, Some(0));
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let samples = vec![
            json!({"codigo": "A", "cantidad": "7", "multiplo": "0", "minimo": null}),
            json!({"codigo": "B", "cantidad": -2, "multiplo": 6, "minimo": 12, "stock": 40}),
            json!({"codigo": "C", "cantidad": 3.5, "maximo": "x", "stock": 0}),
            json!({"id": "12", "codigo": 99, "precio": "10.5"}),
        ];

        for sample in samples {
            let once = migrate_item(stored(sample));
            let twice = migrate_item(StoredLineItem::from(&once));
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_normalize_item_heals_rules() {
        let mut raw = item("A", 7, 10, None);
        raw.minimum = 2;
        raw.step = 6;

        let normalized = normalize_item(raw);
        assert_eq!(normalized.minimum, 6);
        assert_eq!(normalized.step, 6);
        assert_eq!(normalized.quantity, 12);
    }

    #[test]
    fn test_normalize_cart_drops_out_of_stock() {
        let cart = vec![item("A", 3, 10, Some(0)), item("B", 0, 10, Some(9))];

        let result = normalize_cart(cart);
        assert_eq!(result.out_of_stock, vec!["A".to_string()]);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].quantity, 1);
        assert_eq!(result.adjusted, 1);
        assert!(result.changed());
    }

    #[test]
    fn test_full_load_pipeline() {
        let stored_cart = vec![
            stored(json!({"id": 1, "codigo": "A0042", "titulo": "Globos", "precio": 1500, "cantidad": 30})),
            stored(json!({"id": 2, "codigo": "A0099", "titulo": "Velas", "precio": 300, "cantidad": 2})),
        ];
        let snapshot = ProductSnapshot::from([("A0042".to_string(), snap(9, 1650, 48, 12, 12))]);

        let reconciled = reconcile(&migrate_cart(stored_cart), &snapshot);
        assert_eq!(reconciled.removed_codes, vec!["A0099".to_string()]);

        let normalized = normalize_cart(reconciled.updated_cart);
        let line = &normalized.items[0];
        assert_eq!(line.quantity, 36);
        assert_eq!(line.price, Money::from_pesos(1650));
        assert_eq!(line.maximum, None);
    }
}
