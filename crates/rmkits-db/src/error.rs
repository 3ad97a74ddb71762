//! # Database Error Types
//!
//! Error types for storage, configuration and session operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / MigrateError / serde_json::Error / toml::de::Error      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├──► OrderRepository::save: folded into                          │
//! │       │    OrderResponse { success: false, error }                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SessionError ◄── rmkits_core::CoreError (cart rules, checkout form)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Page shows one alert; the stored cart is left as it was               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rmkits_core::CoreError;
use thiserror::Error;

/// Storage operation errors.
///
/// These errors wrap sqlx and serde errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - Updating a product code or order id that doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate product code
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored JSON value could not be written or read.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configuration file is unreadable or invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → UNIQUE violation or QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<toml::de::Error> for DbError {
    fn from(err: toml::de::Error) -> Self {
        DbError::Config(err.to_string())
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::Config(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors from a cart session action.
///
/// Either the action broke a cart rule (nothing was changed) or storage
/// failed.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Cart(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Storage(DbError::from(err))
    }
}

impl From<rmkits_core::ValidationError> for SessionError {
    fn from(err: rmkits_core::ValidationError) -> Self {
        SessionError::Cart(CoreError::Validation(err))
    }
}

/// Result type for cart session actions.
pub type SessionResult<T> = Result<T, SessionError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DbError::not_found("Order", "42").to_string(),
            "Order not found: 42"
        );
        assert_eq!(
            DbError::duplicate("products.code", "A0042").to_string(),
            "Duplicate products.code: 'A0042' already exists"
        );
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_session_error_wraps_both_sides() {
        let err: SessionError = CoreError::ItemNotFound { index: 3 }.into();
        assert_eq!(err.to_string(), "Cart has no item at position 3");

        let err: SessionError = rmkits_core::ValidationError::required("name").into();
        assert!(matches!(err, SessionError::Cart(CoreError::Validation(_))));

        let err: SessionError = DbError::PoolExhausted.into();
        assert!(matches!(err, SessionError::Storage(_)));
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let parse: Result<toml::Value, _> = toml::from_str("not = [valid");
        let err: DbError = parse.unwrap_err().into();
        assert!(matches!(err, DbError::Config(_)));
    }
}
