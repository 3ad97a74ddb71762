//! # rmkits-core: Pure Business Logic for the RM KITS Storefront
//!
//! Quantity rules, cart reconciliation and checkout validation for a
//! wholesale storefront, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      RM KITS Storefront                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Browser pages (catalog, cart)                      │   │
//! │  │     search ──► add to cart ──► edit quantities ──► checkout     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rmkits-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌───────────┐ ┌──────────┐ ┌──────────────────┐ │   │
//! │  │   │ quantity │ │ reconcile │ │   cart   │ │ catalog / order  │ │   │
//! │  │   │ normalize│ │ migrate   │ │ add/edit │ │ filter, validate │ │   │
//! │  │   │ snap     │ │ refresh   │ │ totals   │ │ payload          │ │   │
//! │  │   └──────────┘ └───────────┘ └──────────┘ └──────────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 rmkits-db (Persistence Layer)                   │   │
//! │  │      storage slot, product snapshot, orders, cart session       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`quantity`] - Quantity normalizer and the catalog snap-to-nearest selector
//! - [`reconcile`] - Stored-cart migration, reconciliation, normalization pass
//! - [`cart`] - Cart operations and totals
//! - [`catalog`] - Search, category filter, pagination
//! - [`order`] - Order payload, response and status
//! - [`validation`] - Checkout form checks
//! - [`types`] - Domain types (CatalogProduct, SnapshotProduct, CartLineItem)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rmkits_core::quantity::{normalize, UNBOUNDED};
//!
//! // min 5, packs of 5: 7 rounds up to the next valid quantity
//! assert_eq!(normalize("7", 5, 5, UNBOUNDED), 10);
//! assert_eq!(normalize("23", 5, 5, 20), 20);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod quantity;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{AddOutcome, Cart, CartRefresh};
pub use catalog::{CatalogFilter, PRODUCTS_PER_PAGE};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{
    ContactInfo, Delivery, DeliveryMethod, OrderRequest, OrderResponse, OrderStatus,
    ShippingAddress,
};
pub use quantity::QuantityRules;
pub use reconcile::{reconcile, Reconciliation};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key of the cart blob.
pub const STORAGE_KEY: &str = "rmkits_carrito";

/// Smallest order total accepted at checkout.
///
/// ## Business Reason
/// Wholesale only. The configured value in `StorefrontConfig` overrides it.
pub const DEFAULT_MINIMUM_ORDER: Money = Money::from_pesos(200_000);
