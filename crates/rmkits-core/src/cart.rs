//! # Cart
//!
//! The customer's cart: an ordered list of line items, keyed by product code.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Operations                                 │
//! │                                                                         │
//! │  Page Action              Method                 Effect                 │
//! │  ───────────              ──────                 ──────                 │
//! │                                                                         │
//! │  Catalog "add" ─────────► add_product() ───────► push or merge by code │
//! │                                                                         │
//! │  Qty input blur ────────► set_quantity() ──────► normalize in place    │
//! │                                                                         │
//! │  + / − buttons ─────────► increase()/decrease() one pack up/down       │
//! │                                                                         │
//! │  Trash button ──────────► remove() ────────────► items.remove(i)       │
//! │                                                                         │
//! │  Page load ─────────────► refresh() ───────────► reconcile + normalize │
//! │                                                                         │
//! │  NOTE: the cart never persists itself. The owner writes               │
//! │        to_storage_json() back after every mutation.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::{max_valid_by_stock, parse_quantity, snap_to_nearest, RawQuantity};
use crate::reconcile::{migrate_cart, normalize_cart, reconcile};
use crate::types::{CartLineItem, CatalogProduct, ProductSnapshot, StoredLineItem};

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `code` (adding the same product merges quantities)
/// - Insertion order is display order
///
/// Serializes as a bare JSON array, the storage slot format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

/// What `add_product` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line item was appended.
    Added { quantity: u32 },
    /// The quantity was added to an existing line item.
    Merged { quantity: u32 },
}

/// Summary of a page-load refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartRefresh {
    /// Codes no longer in the catalog.
    pub removed_codes: Vec<String>,
    /// Codes dropped because their stock is now zero.
    pub out_of_stock: Vec<String>,
    /// Whether any stored field was refreshed or corrected.
    pub changed: bool,
}

impl CartRefresh {
    /// Number of items that left the cart.
    pub fn dropped(&self) -> usize {
        self.removed_codes.len() + self.out_of_stock.len()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Wraps already validated items.
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        Cart { items }
    }

    /// Reads the storage blob and migrates every item.
    ///
    /// The top level must be a JSON array; entries that are not objects
    /// are skipped. Callers treat an error as an empty cart.
    ///
    /// ## Example
    /// ```rust
    /// use rmkits_core::cart::Cart;
    ///
    /// let cart = Cart::from_storage_json(r#"[{"codigo": "A1", "precio": 10, "cantidad": "3"}]"#).unwrap();
    /// assert_eq!(cart.items()[0].quantity, 3);
    /// assert_eq!(cart.items()[0].step, 1);
    /// ```
    pub fn from_storage_json(text: &str) -> serde_json::Result<Self> {
        let entries: Vec<Value> = serde_json::from_str(text)?;
        let stored: Vec<StoredLineItem> = entries
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();
        Ok(Cart::from_items(migrate_cart(stored)))
    }

    /// Serializes the cart to the storage blob.
    pub fn to_storage_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.items)
    }

    /// Line items in display order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Consumes the cart, returning its items.
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Finds a line item by product code.
    pub fn find(&self, code: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.code == code)
    }

    // =========================================================================
    // Catalog Page
    // =========================================================================

    /// Adds a product from the catalog, or merges into its line item.
    ///
    /// ## Checks (in order)
    /// 1. Quantity is a positive integer and at least the product minimum
    /// 2. Quantity is a multiple of the pack size
    /// 3. Quantity does not exceed stock
    /// 4. When merging, the combined quantity does not exceed stock
    ///
    /// A stock rejection carries the quantity the selector should snap to.
    pub fn add_product<'a>(
        &mut self,
        product: &CatalogProduct,
        quantity: impl Into<RawQuantity<'a>>,
    ) -> CoreResult<AddOutcome> {
        let raw: RawQuantity<'a> = quantity.into();
        let step = product.step.max(1);

        let requested = match raw.parse() {
            Some(q) if q > 0 && q >= i64::from(product.minimum) => {
                u32::try_from(q).unwrap_or(u32::MAX)
            }
            _ => {
                return Err(CoreError::MinimumNotMet {
                    code: product.code.clone(),
                    minimum: product.minimum,
                })
            }
        };

        if requested % step != 0 {
            return Err(CoreError::NotMultipleOfStep {
                code: product.code.clone(),
                step,
                requested,
            });
        }

        if requested > product.stock {
            return Err(CoreError::InsufficientStock {
                code: product.code.clone(),
                available: product.stock,
                requested,
                suggested: snap_to_nearest(raw, product.minimum, step, product.stock),
            });
        }

        if let Some(existing) = self.items.iter_mut().find(|i| i.code == product.code) {
            let combined = existing.quantity.saturating_add(requested);
            if combined > product.stock {
                let room = product.stock.saturating_sub(existing.quantity);
                return Err(CoreError::InsufficientStock {
                    code: product.code.clone(),
                    available: product.stock,
                    requested: combined,
                    suggested: max_valid_by_stock(room, step),
                });
            }
            existing.quantity = combined;
            return Ok(AddOutcome::Merged { quantity: combined });
        }

        self.items.push(CartLineItem::from_product(product, requested));
        Ok(AddOutcome::Added {
            quantity: requested,
        })
    }

    // =========================================================================
    // Cart Page
    // =========================================================================

    /// Corrects and stores a typed quantity. Empty input means the minimum.
    ///
    /// Returns whether the stored quantity changed.
    pub fn set_quantity(&mut self, index: usize, raw: &str) -> CoreResult<bool> {
        let item = self.item_mut(index)?;
        let rules = item.rules();
        let corrected = match parse_quantity(raw) {
            Some(_) => rules.normalize(raw),
            None => rules.minimum(),
        };

        let changed = corrected != item.quantity;
        item.quantity = corrected;
        Ok(changed)
    }

    /// One pack more, capped at the maximum. Returns the new quantity.
    pub fn increase(&mut self, index: usize) -> CoreResult<u32> {
        let item = self.item_mut(index)?;
        item.quantity = item.rules().step_up(item.quantity);
        Ok(item.quantity)
    }

    /// One pack less, floored at the minimum. Returns the new quantity.
    pub fn decrease(&mut self, index: usize) -> CoreResult<u32> {
        let item = self.item_mut(index)?;
        item.quantity = item.rules().step_down(item.quantity);
        Ok(item.quantity)
    }

    /// Removes the line item at `index`.
    pub fn remove(&mut self, index: usize) -> CoreResult<CartLineItem> {
        if index >= self.items.len() {
            return Err(CoreError::ItemNotFound { index });
        }
        Ok(self.items.remove(index))
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Reconciles against the snapshot, then runs the normalization pass.
    ///
    /// An empty snapshot removes every item; callers that cannot tell
    /// "no products" from "no data" should skip the call instead.
    pub fn refresh(&mut self, snapshot: &ProductSnapshot) -> CartRefresh {
        let reconciled = reconcile(&self.items, snapshot);
        let normalized = normalize_cart(reconciled.updated_cart);
        self.items = normalized.items;

        CartRefresh {
            changed: reconciled.changed || normalized.adjusted > 0,
            removed_codes: reconciled.removed_codes,
            out_of_stock: normalized.out_of_stock,
        }
    }

    /// Runs only the normalization pass (no fresh product data).
    pub fn normalize(&mut self) -> CartRefresh {
        let normalized = normalize_cart(std::mem::take(&mut self.items));
        self.items = normalized.items;

        CartRefresh {
            changed: normalized.adjusted > 0,
            removed_codes: Vec::new(),
            out_of_stock: normalized.out_of_stock,
        }
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Σ price × quantity.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of all quantities (the header badge).
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Number of line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn item_mut(&mut self, index: usize) -> CoreResult<&mut CartLineItem> {
        self.items
            .get_mut(index)
            .ok_or(CoreError::ItemNotFound { index })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SnapshotProduct;

    fn product(code: &str, price: i64, stock: u32, minimum: u32, step: u32) -> CatalogProduct {
        CatalogProduct {
            id: 1,
            code: code.to_string(),
            title: format!("Producto {}", code),
            price: Money::from_pesos(price),
            stock,
            minimum,
            step,
            image: None,
            category: None,
            description: None,
        }
    }

    #[test]
    fn test_add_product() {
        let mut cart = Cart::new();
        let globos = product("A0042", 1500, 48, 12, 12);

        assert_eq!(
            cart.add_product(&globos, "24").unwrap(),
            AddOutcome::Added { quantity: 24 }
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].maximum, Some(48));
        assert_eq!(cart.total(), Money::from_pesos(36_000));
    }

    #[test]
    fn test_add_same_product_merges() {
        let mut cart = Cart::new();
        let globos = product("A0042", 1500, 48, 12, 12);

        cart.add_product(&globos, 12).unwrap();
        let outcome = cart.add_product(&globos, 24).unwrap();

        assert_eq!(outcome, AddOutcome::Merged { quantity: 36 });
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 36);
    }

    #[test]
    fn test_add_rejects_below_minimum() {
        let mut cart = Cart::new();
        let globos = product("A0042", 1500, 48, 12, 12);

        for raw in ["", "0", "abc", "6"] {
            let err = cart.add_product(&globos, raw).unwrap_err();
            assert!(matches!(err, CoreError::MinimumNotMet { minimum: 12, .. }));
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_off_step() {
        let mut cart = Cart::new();
        let err = cart
            .add_product(&product("A0042", 1500, 48, 12, 12), "30")
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::NotMultipleOfStep {
                code: "A0042".to_string(),
                step: 12,
                requested: 30,
            }
        );
    }

    #[test]
    fn test_add_rejects_over_stock_with_suggestion() {
        let mut cart = Cart::new();
        let err = cart
            .add_product(&product("A0042", 1500, 50, 12, 12), "60")
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                code: "A0042".to_string(),
                available: 50,
                requested: 60,
                suggested: 48,
            }
        );
    }

    #[test]
    fn test_merge_rejects_over_stock() {
        let mut cart = Cart::new();
        let globos = product("A0042", 1500, 48, 12, 12);
        cart.add_product(&globos, 36).unwrap();

        let err = cart.add_product(&globos, 24).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                requested: 60,
                suggested: 12,
                ..
            }
        ));
        assert_eq!(cart.items()[0].quantity, 36);
    }

    #[test]
    fn test_set_quantity_normalizes() {
        let mut cart = Cart::new();
        cart.add_product(&product("A1", 100, 40, 5, 5), 5).unwrap();

        assert!(cart.set_quantity(0, "7").unwrap());
        assert_eq!(cart.items()[0].quantity, 10);

        assert!(cart.set_quantity(0, "").unwrap());
        assert_eq!(cart.items()[0].quantity, 5);

        assert!(!cart.set_quantity(0, "3").unwrap());
        assert_eq!(cart.items()[0].quantity, 5);

        assert!(cart.set_quantity(0, "999").unwrap());
        assert_eq!(cart.items()[0].quantity, 40);

        assert_eq!(
            cart.set_quantity(3, "1").unwrap_err(),
            CoreError::ItemNotFound { index: 3 }
        );
    }

    #[test]
    fn test_increase_decrease() {
        let mut cart = Cart::new();
        cart.add_product(&product("A1", 100, 20, 6, 6), 6).unwrap();

        assert_eq!(cart.increase(0).unwrap(), 12);
        assert_eq!(cart.increase(0).unwrap(), 18);
        assert_eq!(cart.increase(0).unwrap(), 20);
        assert_eq!(cart.decrease(0).unwrap(), 14);
        assert_eq!(cart.decrease(0).unwrap(), 8);
        assert_eq!(cart.decrease(0).unwrap(), 6);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_product(&product("A1", 100, 20, 1, 1), 1).unwrap();
        cart.add_product(&product("A2", 100, 20, 1, 1), 1).unwrap();

        let removed = cart.remove(0).unwrap();
        assert_eq!(removed.code, "A1");
        assert_eq!(cart.items()[0].code, "A2");
        assert!(cart.remove(5).is_err());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_storage_json_round_trip() {
        let mut cart = Cart::new();
        cart.add_product(&product("A0042", 1500, 48, 12, 12), 24).unwrap();

        let blob = cart.to_storage_json().unwrap();
        assert!(blob.starts_with('['));
        assert_eq!(Cart::from_storage_json(&blob).unwrap(), cart);
    }

    #[test]
    fn test_storage_json_is_lenient() {
        let cart = Cart::from_storage_json(
            r#"[42, "x", {"codigo": "A1", "cantidad": "3", "precio": 10}, null]"#,
        )
        .unwrap();
        assert_eq!(cart.len(), 1);

        assert!(Cart::from_storage_json("{not json").is_err());
        assert!(Cart::from_storage_json(r#"{"codigo": "A1"}"#).is_err());
    }

    #[test]
    fn test_stored_negative_price_reads_as_zero() {
        let cart = Cart::from_storage_json(
            r#"[{"codigo": "A", "precio": -100000000000000000, "cantidad": 1}]"#,
        )
        .unwrap();
        assert_eq!(cart.items()[0].price, Money::zero());
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_total_saturates_on_huge_quantity() {
        let mut cart =
            Cart::from_storage_json(r#"[{"codigo": "A", "precio": 50000000, "cantidad": 1}]"#)
                .unwrap();
        cart.set_quantity(0, "99999999999").unwrap();
        assert_eq!(cart.items()[0].quantity, u32::MAX);

        cart.add_product(&product("B", 1, 10, 1, 1), 1).unwrap();
        assert_eq!(cart.total().cents(), i64::MAX);
    }

    #[test]
    fn test_refresh() {
        let mut cart = Cart::new();
        cart.add_product(&product("A1", 100, 40, 1, 1), 7).unwrap();
        cart.add_product(&product("A2", 100, 40, 1, 1), 1).unwrap();
        cart.add_product(&product("A3", 100, 40, 1, 1), 1).unwrap();

        let snapshot = ProductSnapshot::from([
            (
                "A1".to_string(),
                SnapshotProduct {
                    id: 1,
                    price: Money::from_pesos(110),
                    stock: 40,
                    minimum: 5,
                    step: 5,
                    image: None,
                },
            ),
            (
                "A3".to_string(),
                SnapshotProduct {
                    id: 3,
                    price: Money::from_pesos(100),
                    stock: 0,
                    minimum: 1,
                    step: 1,
                    image: None,
                },
            ),
        ]);

        let refresh = cart.refresh(&snapshot);
        assert!(refresh.changed);
        assert_eq!(refresh.removed_codes, vec!["A2".to_string()]);
        assert_eq!(refresh.out_of_stock, vec!["A3".to_string()]);
        assert_eq!(refresh.dropped(), 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 10);
        assert_eq!(cart.total(), Money::from_pesos(1100));

        let again = cart.refresh(&snapshot);
        assert!(!again.changed);
        assert_eq!(again.dropped(), 0);
    }
}
