//! # Cart Session
//!
//! The page controller: owns the cart for one page load, applies the user's
//! actions to it and writes the storage slot after every change.
//!
//! ## Page Load
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  storage slot ──► Cart::from_storage_json (migration)                   │
//! │                        │  unreadable blob → empty cart, warn!           │
//! │                        ▼                                                │
//! │  products.snapshot()   ── empty? ──► normalize() only                   │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  cart.refresh(&snapshot)   reconcile + normalization pass               │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  changed or dropped? ──► write slot                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An empty snapshot means "no product data", not "every product was
//! discontinued", so it never empties the cart.
//!
//! ## Actions
//! Every action mutates the in-memory cart and overwrites the slot
//! wholesale. A rejected action leaves both untouched.

use tracing::{debug, info, warn};

use crate::config::StorefrontConfig;
use crate::error::{DbResult, SessionResult};
use crate::pool::Database;
use rmkits_core::catalog::{paginate, Page};
use rmkits_core::quantity::RawQuantity;
use rmkits_core::validation::validate_order;
use rmkits_core::{
    AddOutcome, Cart, CartRefresh, CatalogFilter, CatalogProduct, ContactInfo, Delivery,
    OrderRequest, OrderResponse,
};

/// One shopper's cart, bound to its storage slot.
///
/// ## Usage
/// ```rust,ignore
/// let mut session = CartSession::load(db.clone(), &config).await?;
/// if session.load_report().dropped() > 0 {
///     // show "some products are no longer available"
/// }
/// session.increase(0).await?;
/// let response = session.checkout(contact, Delivery::Pickup).await?;
/// ```
#[derive(Debug)]
pub struct CartSession {
    db: Database,
    config: StorefrontConfig,
    cart: Cart,
    load_report: CartRefresh,
}

impl CartSession {
    /// Reads the stored cart and brings it up to date with the catalog.
    pub async fn load(db: Database, config: &StorefrontConfig) -> DbResult<Self> {
        let key = config.storage_key.as_str();
        let stored = db.cart_slots().load(key).await?;

        let mut unreadable = false;
        let mut cart = match stored.as_deref() {
            None => Cart::new(),
            Some(text) => Cart::from_storage_json(text).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "Stored cart unreadable, starting empty");
                unreadable = true;
                Cart::new()
            }),
        };

        let total_before = cart.total();
        let snapshot = db.products().snapshot().await?;

        let report = if snapshot.is_empty() {
            debug!("No product data, skipping reconciliation");
            cart.normalize()
        } else {
            cart.refresh(&snapshot)
        };

        if !report.removed_codes.is_empty() {
            info!(
                removed = report.removed_codes.len(),
                codes = ?report.removed_codes,
                "Removed products no longer in the catalog"
            );
        }
        if !report.out_of_stock.is_empty() {
            info!(
                dropped = report.out_of_stock.len(),
                codes = ?report.out_of_stock,
                "Dropped products out of stock"
            );
        }
        let total_after = cart.total();
        if total_after != total_before {
            info!(before = %total_before, after = %total_after, "Cart total changed on refresh");
        }

        let session = CartSession {
            db,
            config: config.clone(),
            cart,
            load_report: report,
        };

        if unreadable || session.load_report.changed || session.load_report.dropped() > 0 {
            session.persist().await?;
        }

        debug!(
            items = session.cart.len(),
            units = session.cart.total_quantity(),
            "Cart session loaded"
        );
        Ok(session)
    }

    /// The cart as it currently stands.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// What the page-load refresh changed.
    pub fn load_report(&self) -> &CartRefresh {
        &self.load_report
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    // =========================================================================
    // Catalog Page
    // =========================================================================

    /// One page of the catalog under the search box and category filter.
    pub async fn catalog_page(
        &self,
        query: &str,
        category: &str,
        page: usize,
    ) -> DbResult<Page<CatalogProduct>> {
        let products = self.db.products().list_catalog().await?;
        let filter = CatalogFilter::new(query, category);
        let matching: Vec<CatalogProduct> = filter.apply(&products).into_iter().cloned().collect();

        debug!(
            query = %query,
            category = %filter.category(),
            matches = matching.len(),
            "Filtered catalog"
        );
        Ok(paginate(&matching, page, self.config.products_per_page))
    }

    /// Catalog "add" button.
    pub async fn add<'a>(
        &mut self,
        product: &CatalogProduct,
        quantity: impl Into<RawQuantity<'a>>,
    ) -> SessionResult<AddOutcome> {
        let outcome = self.cart.add_product(product, quantity)?;
        debug!(code = %product.code, ?outcome, "Added to cart");
        self.persist().await?;
        Ok(outcome)
    }

    // =========================================================================
    // Cart Page
    // =========================================================================

    /// Quantity input blur/enter. Returns whether the quantity changed.
    pub async fn set_quantity(&mut self, index: usize, raw: &str) -> SessionResult<bool> {
        let changed = self.cart.set_quantity(index, raw)?;
        self.persist().await?;
        Ok(changed)
    }

    /// The `+` button.
    pub async fn increase(&mut self, index: usize) -> SessionResult<u32> {
        let quantity = self.cart.increase(index)?;
        self.persist().await?;
        Ok(quantity)
    }

    /// The `−` button.
    pub async fn decrease(&mut self, index: usize) -> SessionResult<u32> {
        let quantity = self.cart.decrease(index)?;
        self.persist().await?;
        Ok(quantity)
    }

    /// The trash button.
    pub async fn remove(&mut self, index: usize) -> SessionResult<()> {
        let removed = self.cart.remove(index)?;
        debug!(code = %removed.code, "Removed from cart");
        self.persist().await?;
        Ok(())
    }

    /// Empties the cart.
    pub async fn clear(&mut self) -> DbResult<()> {
        self.cart.clear();
        self.persist().await
    }

    /// Validates the form, saves the order and, once saved, empties the cart.
    ///
    /// A validation failure sends nothing. A failed save comes back as
    /// `OrderResponse { success: false }` with the cart kept.
    pub async fn checkout(
        &mut self,
        contact: ContactInfo,
        delivery: Delivery,
    ) -> SessionResult<OrderResponse> {
        validate_order(
            &contact,
            &delivery,
            self.cart.total(),
            self.config.minimum_order_total,
        )?;

        let request = OrderRequest::from_cart(contact, delivery, &self.cart)?;
        let response = self.db.orders().save(&request).await;

        if response.success {
            self.clear().await?;
        }
        Ok(response)
    }

    async fn persist(&self) -> DbResult<()> {
        let blob = self.cart.to_storage_json()?;
        self.db
            .cart_slots()
            .save(&self.config.storage_key, &blob)
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
