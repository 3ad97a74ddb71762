//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! ## Key Operations
//! - Catalog listing (active, in stock)
//! - Snapshot for the cart page refresh
//! - Admin edits: insert, price, stock, activation
//!
//! ## Snapshot Source
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Page Refresh Data                               │
//! │                                                                         │
//! │  products table (is_active = 1)                                        │
//! │  ┌──────────────────────────────────────────────┐                      │
//! │  │ A0042 | Globos x50 | 1500,00 | 48 | 12 | 12 │                      │
//! │  │ B0007 | Vela nro 1 |  320,00 |  0 |  6 |  6 │ ← kept, stock 0      │
//! │  └──────────────────────────────────────────────┘                      │
//! │       │ snapshot()                                                      │
//! │       ▼                                                                 │
//! │  { "A0042": { id, precio, stock, minimo, multiplo, imagen }, ... }     │
//! │                                                                         │
//! │  Products with zero stock stay in the snapshot so the cart can tell    │
//! │  "sold out" (dropped as out of stock) from "discontinued" (removed).   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use rmkits_core::{CatalogProduct, Money, ProductSnapshot, SnapshotProduct};

const PRODUCT_COLUMNS: &str =
    "id, code, title, description, category, price_cents, stock, minimum, step, image";

/// A `products` row as SQLite returns it.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    code: String,
    title: String,
    description: Option<String>,
    category: Option<String>,
    price_cents: i64,
    stock: i64,
    minimum: i64,
    step: i64,
    image: Option<String>,
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

impl From<ProductRow> for CatalogProduct {
    fn from(row: ProductRow) -> Self {
        CatalogProduct {
            id: row.id,
            code: row.code,
            title: row.title,
            price: Money::from_cents(row.price_cents),
            stock: to_u32(row.stock),
            minimum: to_u32(row.minimum).max(1),
            step: to_u32(row.step).max(1),
            image: row.image,
            category: row.category,
            description: row.description,
        }
    }
}

impl From<&ProductRow> for SnapshotProduct {
    fn from(row: &ProductRow) -> Self {
        SnapshotProduct {
            id: row.id,
            price: Money::from_cents(row.price_cents),
            stock: to_u32(row.stock),
            minimum: to_u32(row.minimum).max(1),
            step: to_u32(row.step).max(1),
            image: row.image.clone(),
        }
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let catalog = repo.list_catalog().await?;
/// let snapshot = repo.snapshot().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists the products the catalog page shows: active and in stock,
    /// ordered by title.
    pub async fn list_catalog(&self) -> DbResult<Vec<CatalogProduct>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND stock > 0 \
             ORDER BY title COLLATE NOCASE"
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        debug!(count = rows.len(), "Listed catalog products");
        Ok(rows.into_iter().map(CatalogProduct::from).collect())
    }

    /// Builds the cart refresh snapshot, keyed by product code.
    ///
    /// Includes active products with zero stock.
    pub async fn snapshot(&self) -> DbResult<ProductSnapshot> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1");
        let rows: Vec<ProductRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        let snapshot: ProductSnapshot = rows
            .iter()
            .map(|row| (row.code.clone(), SnapshotProduct::from(row)))
            .collect();

        debug!(products = snapshot.len(), "Built product snapshot");
        Ok(snapshot)
    }

    /// Gets a product by its business code, active or not.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<CatalogProduct>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1");
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CatalogProduct::from))
    }

    /// Inserts a new product. The `id` of the argument is ignored.
    ///
    /// ## Returns
    /// * `Ok(CatalogProduct)` - The product with its assigned row id
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    pub async fn insert(&self, product: &CatalogProduct) -> DbResult<CatalogProduct> {
        debug!(code = %product.code, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                code, title, description, category, price_cents,
                stock, minimum, step, image
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.code)
        .bind(&product.title)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price.cents())
        .bind(i64::from(product.stock))
        .bind(i64::from(product.minimum.max(1)))
        .bind(i64::from(product.step.max(1)))
        .bind(&product.image)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &product.code),
            other => other,
        })?;

        let mut inserted = product.clone();
        inserted.id = result.last_insert_rowid();
        Ok(inserted)
    }

    /// Sets the unit price of a product.
    pub async fn update_price(&self, code: &str, price: Money) -> DbResult<()> {
        debug!(code = %code, price = %price, "Updating price");

        let result = sqlx::query(
            "UPDATE products SET price_cents = ?2, updated_at = ?3 WHERE code = ?1",
        )
        .bind(code)
        .bind(price.cents())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", code));
        }
        Ok(())
    }

    /// Sets the units on hand of a product.
    ///
    /// Absolute, not a delta: the admin enters the counted stock.
    pub async fn update_stock(&self, code: &str, stock: u32) -> DbResult<()> {
        debug!(code = %code, stock, "Updating stock");

        let result =
            sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE code = ?1")
                .bind(code)
                .bind(i64::from(stock))
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", code));
        }
        Ok(())
    }

    /// Shows or hides a product. Hidden products leave the catalog and the
    /// snapshot, so carts holding them drop them on the next load.
    pub async fn set_active(&self, code: &str, active: bool) -> DbResult<()> {
        debug!(code = %code, active, "Setting product visibility");

        let result =
            sqlx::query("UPDATE products SET is_active = ?2, updated_at = ?3 WHERE code = ?1")
                .bind(code)
                .bind(active)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", code));
        }
        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use rmkits_core::{CatalogProduct, Money};

    fn product(code: &str, title: &str, pesos: i64, stock: u32, step: u32) -> CatalogProduct {
        CatalogProduct {
            id: 0,
            code: code.to_string(),
            title: title.to_string(),
            price: Money::from_pesos(pesos),
            stock,
            minimum: step,
            step,
            image: Some(format!("{}.jpg", code.to_lowercase())),
            category: Some("Cotillón".to_string()),
            description: None,
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_by_code() {
        let db = db().await;
        let repo = db.products();

        let inserted = repo.insert(&product("A0042", "Globos x50", 1500, 48, 12)).await.unwrap();
        assert!(inserted.id > 0);

        let found = repo.get_by_code("A0042").await.unwrap().unwrap();
        assert_eq!(found, inserted);
        assert!(repo.get_by_code("ZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&product("A0042", "Globos x50", 1500, 48, 12)).await.unwrap();
        let err = repo
            .insert(&product("A0042", "Otro", 10, 1, 1))
            .await
            .unwrap_err();

        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "A0042"),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_catalog_hides_inactive_and_sold_out() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&product("A1", "Vasos", 100, 10, 1)).await.unwrap();
        repo.insert(&product("B2", "Bonetes", 200, 0, 1)).await.unwrap();
        repo.insert(&product("C3", "Anteojos", 300, 5, 1)).await.unwrap();
        repo.set_active("C3", false).await.unwrap();

        let catalog = repo.list_catalog().await.unwrap();
        let codes: Vec<&str> = catalog.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["A1"]);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_keeps_sold_out_products() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&product("A1", "Vasos", 100, 10, 5)).await.unwrap();
        repo.insert(&product("B2", "Bonetes", 200, 0, 1)).await.unwrap();
        repo.insert(&product("C3", "Anteojos", 300, 5, 1)).await.unwrap();
        repo.set_active("C3", false).await.unwrap();

        let snapshot = repo.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["B2"].stock, 0);

        let a1 = &snapshot["A1"];
        assert_eq!(a1.price, Money::from_pesos(100));
        assert_eq!(a1.minimum, 5);
        assert_eq!(a1.step, 5);
        assert_eq!(a1.image.as_deref(), Some("a1.jpg"));
        assert!(!snapshot.contains_key("C3"));
    }

    #[tokio::test]
    async fn test_price_and_stock_updates() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&product("A1", "Vasos", 100, 10, 1)).await.unwrap();
        repo.update_price("A1", Money::from_cents(12_550)).await.unwrap();
        repo.update_stock("A1", 3).await.unwrap();

        let found = repo.get_by_code("A1").await.unwrap().unwrap();
        assert_eq!(found.price, Money::from_cents(12_550));
        assert_eq!(found.stock, 3);

        assert!(matches!(
            repo.update_stock("NOPE", 1).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
