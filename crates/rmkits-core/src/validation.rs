//! # Validation Module
//!
//! Checks the checkout form before an order is sent.
//!
//! ## Validation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Validation                                │
//! │                                                                         │
//! │  1. Cart total ≥ wholesale minimum   → BelowMinimumOrder               │
//! │  2. Name present                     → Required("name")                │
//! │  3. Phone present                    → Required("phone")               │
//! │  4. Email present and well formed    → Required / InvalidFormat        │
//! │  5. Shipping only: address, city,    → Required(<field>)               │
//! │     province, postal code, recipient                                    │
//! │                                                                         │
//! │  The first failure is reported; the page shows one alert at a time.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rmkits_core::money::Money;
//! use rmkits_core::order::{ContactInfo, Delivery};
//! use rmkits_core::validation::validate_order;
//!
//! let contact = ContactInfo::new("Ana", "1155550000", "ana@example.com");
//! let minimum = Money::from_pesos(200_000);
//!
//! assert!(validate_order(&contact, &Delivery::Pickup, Money::from_pesos(250_000), minimum).is_ok());
//! assert!(validate_order(&contact, &Delivery::Pickup, Money::from_pesos(150_000), minimum).is_err());
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::money::Money;
use crate::order::{ContactInfo, Delivery};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates the checkout form against the cart total.
pub fn validate_order(
    contact: &ContactInfo,
    delivery: &Delivery,
    total: Money,
    minimum_total: Money,
) -> ValidationResult<()> {
    validate_minimum_total(total, minimum_total)?;
    require("name", &contact.name)?;
    require("phone", &contact.phone)?;
    validate_email(&contact.email)?;

    if let Delivery::Shipping(address) = delivery {
        require("address", &address.address)?;
        require("city", &address.city)?;
        require("province", &address.province)?;
        require("postal code", &address.postal_code)?;
        require("recipient", &address.recipient)?;
    }

    Ok(())
}

/// Rejects carts whose total does not reach the wholesale minimum.
pub fn validate_minimum_total(total: Money, minimum_total: Money) -> ValidationResult<()> {
    if total < minimum_total {
        return Err(ValidationError::BelowMinimumOrder {
            total: total.to_string(),
            minimum: minimum_total.to_string(),
        });
    }
    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - `local@domain.tld`: one `@`, then a dot with text on both sides
/// - No whitespace anywhere
///
/// ## Example
/// ```rust
/// use rmkits_core::validation::validate_email;
///
/// assert!(validate_email("compras@jugueteria.com.ar").is_ok());
/// assert!(validate_email("compras@jugueteria").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain.com".to_string(),
        });
    }

    Ok(())
}

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::ShippingAddress;

    const MINIMUM: Money = Money::from_pesos(200_000);

    fn contact() -> ContactInfo {
        ContactInfo::new("Ana Pérez", "1155550000", "ana@example.com")
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last@mail.example.org").is_ok());

        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@.com").is_err());
        assert!(validate_email("ana@example.").is_err());
        assert!(validate_email("ana@exa mple.com").is_err());
        assert!(validate_email("ana@b@c.com").is_err());
        assert!(validate_email("ana@b.").is_err());
        assert!(validate_email("a@.b").is_err());
        assert!(validate_email("a@b..c").is_ok());
        assert_eq!(
            validate_email("   ").unwrap_err(),
            ValidationError::required("email")
        );
    }

    #[test]
    fn test_minimum_total_checked_first() {
        let empty = ContactInfo::default();
        let err = validate_order(&empty, &Delivery::Pickup, Money::from_pesos(150_000), MINIMUM)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::BelowMinimumOrder {
                total: "$150.000".to_string(),
                minimum: "$200.000".to_string(),
            }
        );
    }

    #[test]
    fn test_exact_minimum_is_accepted() {
        assert!(validate_order(&contact(), &Delivery::Pickup, MINIMUM, MINIMUM).is_ok());
    }

    #[test]
    fn test_contact_fields_in_order() {
        let total = Money::from_pesos(300_000);

        let mut c = contact();
        c.name = " ".to_string();
        c.phone = String::new();
        assert_eq!(
            validate_order(&c, &Delivery::Pickup, total, MINIMUM).unwrap_err(),
            ValidationError::required("name")
        );

        let mut c = contact();
        c.phone = String::new();
        assert_eq!(
            validate_order(&c, &Delivery::Pickup, total, MINIMUM).unwrap_err(),
            ValidationError::required("phone")
        );

        let mut c = contact();
        c.email = "ana".to_string();
        assert!(matches!(
            validate_order(&c, &Delivery::Pickup, total, MINIMUM).unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
    }

    #[test]
    fn test_shipping_requires_address_fields() {
        let total = Money::from_pesos(300_000);
        let mut address = ShippingAddress {
            address: "Av. Rivadavia 2768".to_string(),
            city: "CABA".to_string(),
            province: "Buenos Aires".to_string(),
            postal_code: "1034".to_string(),
            recipient: "Ana".to_string(),
            notes: String::new(),
        };
        assert!(
            validate_order(&contact(), &Delivery::Shipping(address.clone()), total, MINIMUM)
                .is_ok()
        );

        address.postal_code = String::new();
        assert_eq!(
            validate_order(&contact(), &Delivery::Shipping(address), total, MINIMUM).unwrap_err(),
            ValidationError::required("postal code")
        );
    }
}
