//! # Error Types
//!
//! Domain-specific error types for rmkits-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rmkits-core errors (this file)                                        │
//! │  ├── CoreError        - Cart operation rejections                      │
//! │  └── ValidationError  - Order form failures                            │
//! │                                                                         │
//! │  rmkits-db errors (separate crate)                                     │
//! │  └── DbError          - Storage failures                               │
//! │                                                                         │
//! │  NOT errors: malformed quantities and vanished products. Those are     │
//! │  corrected or dropped silently by the normalizer and the reconciler.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart operation errors.
///
/// Each variant maps to one of the alerts the catalog and cart pages show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Requested quantity is zero, unparseable, or below the product minimum.
    #[error("Minimum order for {code} is {minimum}")]
    MinimumNotMet { code: String, minimum: u32 },

    /// Product is sold in closed packs and the quantity is not a multiple.
    #[error("{code} is sold in packs of {step}, {requested} is not a multiple")]
    NotMultipleOfStep {
        code: String,
        step: u32,
        requested: u32,
    },

    /// Requested quantity exceeds the stock on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Catalog: qty input 60, stock 48, packs of 12
    ///      │
    ///      ▼
    /// InsufficientStock { available: 48, requested: 60, suggested: 48 }
    ///      │
    ///      ▼
    /// UI: "contact us on WhatsApp", input reset to `suggested`
    /// ```
    #[error("Insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: u32,
        requested: u32,
        suggested: u32,
    },

    /// No line item at the given cart position.
    #[error("Cart has no item at position {index}")]
    ItemNotFound { index: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Order form validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Cart total does not reach the wholesale minimum.
    #[error("Order total {total} is below the minimum of {minimum}")]
    BelowMinimumOrder { total: String, minimum: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            code: "A0042".to_string(),
            available: 48,
            requested: 60,
            suggested: 48,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for A0042: available 48, requested 60"
        );

        let err = CoreError::NotMultipleOfStep {
            code: "A0042".to_string(),
            step: 12,
            requested: 30,
        };
        assert_eq!(
            err.to_string(),
            "A0042 is sold in packs of 12, 30 is not a multiple"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("phone").to_string(), "phone is required");

        let err = ValidationError::BelowMinimumOrder {
            total: "$150.000".to_string(),
            minimum: "$200.000".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Order total $150.000 is below the minimum of $200.000"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
