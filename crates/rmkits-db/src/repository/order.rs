//! # Order Repository
//!
//! The backend side of checkout: stores order payloads and lets the admin
//! move them through their status.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  save(OrderRequest) ──► pendiente ──► procesando ──► completado        │
//! │                             │              │                            │
//! │                             └──────────────┴──────► cancelado          │
//! │                                                                         │
//! │  Any status can be set from any other; the admin decides.              │
//! │  delete_all() wipes the table ("limpiar pedidos").                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use rmkits_core::{
    Cart, ContactInfo, Delivery, DeliveryMethod, Money, OrderRequest, OrderResponse,
    OrderStatus, ShippingAddress,
};

/// A stored order as the admin list shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedOrder {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub contact: ContactInfo,
    pub delivery: Delivery,
    /// The cart JSON exactly as submitted.
    pub products: String,
    pub total: Money,
    pub status: OrderStatus,
}

impl SavedOrder {
    /// Parses the submitted cart back into line items.
    pub fn cart(&self) -> serde_json::Result<Cart> {
        Cart::from_storage_json(&self.products)
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    created_at: DateTime<Utc>,
    customer_name: String,
    customer_phone: Option<String>,
    customer_email: Option<String>,
    delivery_method: String,
    shipping_address: Option<String>,
    shipping_city: Option<String>,
    shipping_province: Option<String>,
    shipping_postal_code: Option<String>,
    shipping_recipient: Option<String>,
    shipping_notes: Option<String>,
    products: String,
    total_cents: i64,
    status: OrderStatus,
}

impl From<OrderRow> for SavedOrder {
    fn from(row: OrderRow) -> Self {
        let delivery = if row.delivery_method == "envio" {
            Delivery::Shipping(ShippingAddress {
                address: row.shipping_address.unwrap_or_default(),
                city: row.shipping_city.unwrap_or_default(),
                province: row.shipping_province.unwrap_or_default(),
                postal_code: row.shipping_postal_code.unwrap_or_default(),
                recipient: row.shipping_recipient.unwrap_or_default(),
                notes: row.shipping_notes.unwrap_or_default(),
            })
        } else {
            Delivery::Pickup
        };

        SavedOrder {
            id: row.id,
            created_at: row.created_at,
            contact: ContactInfo {
                name: row.customer_name,
                phone: row.customer_phone.unwrap_or_default(),
                email: row.customer_email.unwrap_or_default(),
            },
            delivery,
            products: row.products,
            total: Money::from_cents(row.total_cents),
            status: row.status,
        }
    }
}

fn method_str(method: DeliveryMethod) -> &'static str {
    match method {
        DeliveryMethod::Pickup => "retiro",
        DeliveryMethod::Shipping => "envio",
    }
}

/// Repository for order operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Saves an order payload.
    ///
    /// Always answers: storage failures come back as
    /// `OrderResponse { success: false, error }` and are logged.
    pub async fn save(&self, order: &OrderRequest) -> OrderResponse {
        match self.insert(order).await {
            Ok(id) => {
                info!(
                    order_id = id,
                    total = %order.total,
                    method = method_str(order.delivery_method),
                    "Order saved"
                );
                OrderResponse::saved(id)
            }
            Err(e) => {
                warn!(error = %e, "Failed to save order");
                OrderResponse::failed(e.to_string())
            }
        }
    }

    async fn insert(&self, order: &OrderRequest) -> DbResult<i64> {
        let shipping = order.shipping.as_ref();

        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                created_at, customer_name, customer_phone, customer_email,
                delivery_method, shipping_address, shipping_city, shipping_province,
                shipping_postal_code, shipping_recipient, shipping_notes,
                products, total_cents, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(Utc::now())
        .bind(&order.contact.name)
        .bind(&order.contact.phone)
        .bind(&order.contact.email)
        .bind(method_str(order.delivery_method))
        .bind(shipping.map(|s| s.address.as_str()))
        .bind(shipping.map(|s| s.city.as_str()))
        .bind(shipping.map(|s| s.province.as_str()))
        .bind(shipping.map(|s| s.postal_code.as_str()))
        .bind(shipping.map(|s| s.recipient.as_str()))
        .bind(shipping.map(|s| s.notes.as_str()))
        .bind(&order.products)
        .bind(order.total.cents())
        .bind(OrderStatus::Pending)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Moves an order to `status`.
    pub async fn set_status(&self, id: i64, status: OrderStatus) -> DbResult<()> {
        debug!(order_id = id, status = status.as_str(), "Updating order status");

        let result = sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id.to_string()));
        }
        Ok(())
    }

    /// Gets a single order.
    pub async fn get(&self, id: i64) -> DbResult<Option<SavedOrder>> {
        let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(SavedOrder::from))
    }

    /// Lists all orders, newest first.
    pub async fn list(&self) -> DbResult<Vec<SavedOrder>> {
        let rows: Vec<OrderRow> =
            sqlx::query_as("SELECT * FROM orders ORDER BY id DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(SavedOrder::from).collect())
    }

    /// Deletes every order. Returns how many were removed.
    pub async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM orders").execute(&self.pool).await?;
        let removed = result.rows_affected();

        info!(removed, "Orders cleared");
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rmkits_core::CatalogProduct;

    fn cart() -> Cart {
        let product = CatalogProduct {
            id: 7,
            code: "A0042".to_string(),
            title: "Globos x50".to_string(),
            price: Money::from_pesos(1500),
            stock: 48,
            minimum: 12,
            step: 12,
            image: None,
            category: None,
            description: None,
        };
        let mut cart = Cart::new();
        cart.add_product(&product, 24u32).unwrap();
        cart
    }

    fn contact() -> ContactInfo {
        ContactInfo::new("Ana Pérez", "1155550000", "ana@example.com")
    }

    #[tokio::test]
    async fn test_save_pickup_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();

        let request = OrderRequest::from_cart(contact(), Delivery::Pickup, &cart()).unwrap();
        let response = orders.save(&request).await;
        assert!(response.success);
        let id = response.order_id.unwrap();

        let saved = orders.get(id).await.unwrap().unwrap();
        assert_eq!(saved.contact, contact());
        assert_eq!(saved.delivery, Delivery::Pickup);
        assert_eq!(saved.total, Money::from_pesos(36_000));
        assert_eq!(saved.status, OrderStatus::Pending);
        assert_eq!(saved.cart().unwrap(), cart());
    }

    #[tokio::test]
    async fn test_save_shipping_order_keeps_address() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();

        let address = ShippingAddress {
            address: "Av. Rivadavia 2768".to_string(),
            city: "CABA".to_string(),
            province: "Buenos Aires".to_string(),
            postal_code: "1034".to_string(),
            recipient: "Ana".to_string(),
            notes: "Timbre 3B".to_string(),
        };
        let request =
            OrderRequest::from_cart(contact(), Delivery::Shipping(address.clone()), &cart())
                .unwrap();
        let id = orders.save(&request).await.order_id.unwrap();

        let saved = orders.get(id).await.unwrap().unwrap();
        assert_eq!(saved.delivery, Delivery::Shipping(address));
    }

    #[tokio::test]
    async fn test_status_changes_and_listing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();

        let request = OrderRequest::from_cart(contact(), Delivery::Pickup, &cart()).unwrap();
        let first = orders.save(&request).await.order_id.unwrap();
        let second = orders.save(&request).await.order_id.unwrap();

        orders.set_status(first, OrderStatus::Completed).await.unwrap();
        assert!(matches!(
            orders.set_status(999, OrderStatus::Cancelled).await.unwrap_err(),
            DbError::NotFound { .. }
        ));

        let listed = orders.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].status, OrderStatus::Completed);

        assert_eq!(orders.delete_all().await.unwrap(), 2);
        assert!(orders.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_becomes_failed_response() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let request = OrderRequest::from_cart(contact(), Delivery::Pickup, &cart()).unwrap();

        db.close().await;
        let response = db.orders().save(&request).await;

        assert!(!response.success);
        assert!(response.order_id.is_none());
        assert!(response.error.is_some());
    }
}
