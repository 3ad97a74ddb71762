//! # Domain Types
//!
//! Core domain types shared by the catalog page, the cart page and storage.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CatalogProduct  │   │ SnapshotProduct │   │  CartLineItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  catalog page   │   │  cart page      │   │  stored cart    │       │
//! │  │  listing        │   │  refresh data   │   │  (validated)    │       │
//! │  └─────────────────┘   └─────────────────┘   └────────▲────────┘       │
//! │                                                       │ migrate        │
//! │                                              ┌────────┴────────┐       │
//! │                                              │ StoredLineItem  │       │
//! │                                              │  (as found in   │       │
//! │                                              │   storage)      │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity
//! - `id`: database row id. Changes when the catalog is re-imported.
//! - `code` ("codigo"): business identifier. Stable, and the key the cart
//!   reconciles by.
//!
//! ## Wire Names
//! The browser pages and the stored cart use Spanish JSON keys
//! (`precio`, `cantidad`, `minimo`, `multiplo`, ...). Rust field names are
//! English; serde renames bridge the two.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::money::Money;
use crate::quantity::QuantityRules;

// =============================================================================
// Catalog Product
// =============================================================================

/// A product as listed on the catalog page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogProduct {
    /// Database row id.
    #[ts(type = "number")]
    pub id: i64,

    /// Stable business code (e.g. `A0042`).
    #[serde(rename = "codigo")]
    pub code: String,

    /// Display title.
    #[serde(rename = "titulo")]
    pub title: String,

    /// Unit price.
    #[serde(rename = "precio")]
    #[ts(type = "number")]
    pub price: Money,

    /// Units on hand.
    pub stock: u32,

    /// Minimum order quantity.
    #[serde(rename = "minimo")]
    pub minimum: u32,

    /// Pack size.
    #[serde(rename = "multiplo")]
    pub step: u32,

    /// Image file name under the static image folder.
    #[serde(rename = "imagen", default)]
    pub image: Option<String>,

    /// Free-form category as entered by the admin.
    #[serde(rename = "categoria", default)]
    pub category: Option<String>,

    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
}

impl CatalogProduct {
    /// Whether at least one unit is on hand.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Current data for one product, as injected into the cart page.
///
/// Wire shape: `{ "id": 7, "precio": 1500, "stock": 48, "minimo": 12,
/// "multiplo": 12, "imagen": "a0042.jpg" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SnapshotProduct {
    #[ts(type = "number")]
    pub id: i64,

    #[serde(rename = "precio")]
    #[ts(type = "number")]
    pub price: Money,

    pub stock: u32,

    #[serde(rename = "minimo")]
    pub minimum: u32,

    #[serde(rename = "multiplo")]
    pub step: u32,

    #[serde(rename = "imagen", default)]
    pub image: Option<String>,
}

/// Point-in-time product data keyed by product code.
pub type ProductSnapshot = HashMap<String, SnapshotProduct>;

// =============================================================================
// Cart Line Item
// =============================================================================

/// One product in the cart, validated.
///
/// ## Invariants (after a normalization pass)
/// - `quantity ≥ minimum`
/// - `quantity ≤ maximum` when a maximum is set
/// - `(quantity − minimum) % step == 0`, except at the maximum
/// - `minimum ≥ step ≥ 1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLineItem {
    /// Product row id at the time of the last refresh (may be stale).
    #[serde(rename = "id")]
    #[ts(type = "number")]
    pub product_id: i64,

    /// Stable business code; the key the cart is reconciled by.
    #[serde(rename = "codigo")]
    pub code: String,

    #[serde(rename = "titulo")]
    pub title: String,

    /// Unit price snapshot.
    #[serde(rename = "precio")]
    #[ts(type = "number")]
    pub price: Money,

    #[serde(rename = "cantidad")]
    pub quantity: u32,

    #[serde(rename = "minimo")]
    pub minimum: u32,

    #[serde(rename = "multiplo")]
    pub step: u32,

    /// Upper bound; `None` means unbounded.
    #[serde(rename = "maximo")]
    pub maximum: Option<u32>,

    /// Stock as of the last reconciliation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,

    #[serde(rename = "imagen", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CartLineItem {
    /// Creates a line item from a catalog product.
    ///
    /// The maximum is the stock at the time of adding.
    pub fn from_product(product: &CatalogProduct, quantity: u32) -> Self {
        CartLineItem {
            product_id: product.id,
            code: product.code.clone(),
            title: product.title.clone(),
            price: product.price,
            quantity,
            minimum: product.minimum,
            step: product.step,
            maximum: Some(product.stock).filter(|s| *s > 0),
            stock: None,
            image: product.image.clone(),
            description: product.description.clone(),
        }
    }

    /// The quantity rules this item is held to, healed.
    pub fn rules(&self) -> QuantityRules {
        QuantityRules::for_line_item(self.minimum, self.step, self.maximum)
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

// =============================================================================
// Stored Line Item
// =============================================================================

/// A line item exactly as found in storage.
///
/// Older carts may lack `multiplo`/`minimo`/`maximo`, carry them as strings,
/// or hold `null`. Numeric fields are kept raw here and validated by the
/// migration in [`crate::reconcile::migrate_item`]. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredLineItem {
    #[serde(default)]
    pub id: Value,

    #[serde(rename = "codigo", default, deserialize_with = "lenient_string")]
    pub code: String,

    #[serde(rename = "titulo", default, deserialize_with = "lenient_string")]
    pub title: String,

    #[serde(rename = "precio", default)]
    pub price: Money,

    #[serde(rename = "cantidad", default)]
    pub quantity: Value,

    #[serde(rename = "minimo", default)]
    pub minimum: Value,

    #[serde(rename = "multiplo", default)]
    pub step: Value,

    #[serde(rename = "maximo", default)]
    pub maximum: Value,

    #[serde(default)]
    pub stock: Value,

    #[serde(rename = "imagen", default, deserialize_with = "lenient_opt_string")]
    pub image: Option<String>,

    #[serde(rename = "descripcion", default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
}

impl From<&CartLineItem> for StoredLineItem {
    fn from(item: &CartLineItem) -> Self {
        StoredLineItem {
            id: Value::from(item.product_id),
            code: item.code.clone(),
            title: item.title.clone(),
            price: item.price,
            quantity: Value::from(item.quantity),
            minimum: Value::from(item.minimum),
            step: Value::from(item.step),
            maximum: item.maximum.map_or(Value::Null, Value::from),
            stock: item.stock.map_or(Value::Null, Value::from),
            image: item.image.clone(),
            description: item.description.clone(),
        }
    }
}

/// Reads a string, accepting numbers (codes like `1042`) and `null`.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> CatalogProduct {
        CatalogProduct {
            id: 7,
            code: "A0042".to_string(),
            title: "Globos x50".to_string(),
            price: Money::from_pesos(1500),
            stock: 48,
            minimum: 12,
            step: 12,
            image: Some("a0042.jpg".to_string()),
            category: Some("Cotillón".to_string()),
            description: None,
        }
    }

    #[test]
    fn test_line_item_from_product() {
        let item = CartLineItem::from_product(&product(), 24);
        assert_eq!(item.code, "A0042");
        assert_eq!(item.quantity, 24);
        assert_eq!(item.maximum, Some(48));
        assert_eq!(item.line_total(), Money::from_pesos(36_000));
    }

    #[test]
    fn test_line_item_wire_names() {
        let item = CartLineItem::from_product(&product(), 12);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["codigo"], "A0042");
        assert_eq!(json["precio"], 1500);
        assert_eq!(json["cantidad"], 12);
        assert_eq!(json["multiplo"], 12);
        assert_eq!(json["maximo"], 48);
        assert!(json.get("stock").is_none());
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let snapshot: ProductSnapshot = serde_json::from_str(
            r#"{"A0042": {"id": 9, "precio": 1650.5, "stock": 30, "minimo": 6, "multiplo": 6, "imagen": null}}"#,
        )
        .unwrap();
        let entry = &snapshot["A0042"];
        assert_eq!(entry.id, 9);
        assert_eq!(entry.price.cents(), 165_050);
        assert_eq!(entry.image, None);
    }

    #[test]
    fn test_stored_item_is_lenient() {
        let stored: StoredLineItem = serde_json::from_str(
            r#"{"id": "7", "codigo": 1042, "titulo": null, "precio": "99.5",
                "cantidad": "3", "multiplo": null, "extra": true}"#,
        )
        .unwrap();
        assert_eq!(stored.code, "1042");
        assert_eq!(stored.title, "");
        assert_eq!(stored.price.cents(), 9950);
        assert_eq!(stored.quantity, Value::from("3"));
        assert_eq!(stored.step, Value::Null);
        assert_eq!(stored.minimum, Value::Null);
    }
}
