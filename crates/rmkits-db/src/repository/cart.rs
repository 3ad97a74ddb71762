//! # Cart Slot Repository
//!
//! The key-value store behind the cart. One row per key; the cart lives
//! under [`rmkits_core::STORAGE_KEY`] as the JSON array the browser keeps.
//!
//! Writes replace the whole value. There is no partial update.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for storage slot operations.
#[derive(Debug, Clone)]
pub struct CartSlotRepository {
    pool: SqlitePool,
}

impl CartSlotRepository {
    /// Creates a new CartSlotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartSlotRepository { pool }
    }

    /// Reads the raw value stored under `key`, if any.
    pub async fn load(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM storage_slots WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        debug!(key = %key, found = value.is_some(), "Loaded storage slot");
        Ok(value)
    }

    /// Overwrites the value stored under `key`.
    pub async fn save(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO storage_slots (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "Saved storage slot");
        Ok(())
    }

    /// Deletes the value stored under `key`. Missing keys are not an error.
    pub async fn clear(&self, key: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM storage_slots WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, "Cleared storage slot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_save_overwrites_and_clear_removes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let slots = db.cart_slots();

        assert_eq!(slots.load("rmkits_carrito").await.unwrap(), None);

        slots.save("rmkits_carrito", "[]").await.unwrap();
        slots
            .save("rmkits_carrito", r#"[{"codigo":"A1","cantidad":2}]"#)
            .await
            .unwrap();
        assert_eq!(
            slots.load("rmkits_carrito").await.unwrap().as_deref(),
            Some(r#"[{"codigo":"A1","cantidad":2}]"#)
        );

        // Other keys are independent
        assert_eq!(slots.load("otro").await.unwrap(), None);

        slots.clear("rmkits_carrito").await.unwrap();
        slots.clear("rmkits_carrito").await.unwrap();
        assert_eq!(slots.load("rmkits_carrito").await.unwrap(), None);
    }
}
