//! # Orders
//!
//! The payload the cart page sends to the backend save call, and its reply.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart page "send order"                                                 │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  validate_order(contact, delivery, total, minimum)                      │
//! │      │  Err ──► alert, nothing sent                                     │
//! │      ▼                                                                  │
//! │  OrderRequest::from_cart()                                              │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  backend save ──► OrderResponse { success, pedido_id | error }          │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  WhatsApp hand-off (regardless of the save result)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::money::Money;

// =============================================================================
// Customer Data
// =============================================================================

/// Who is ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactInfo {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    pub email: String,
}

impl ContactInfo {
    pub fn new(name: &str, phone: &str, email: &str) -> Self {
        ContactInfo {
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            email: email.trim().to_string(),
        }
    }
}

/// Where a shipped order goes.
///
/// Serialized with the `envio_` keys of the order payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingAddress {
    #[serde(rename = "envio_direccion")]
    pub address: String,
    #[serde(rename = "envio_localidad")]
    pub city: String,
    #[serde(rename = "envio_provincia")]
    pub province: String,
    #[serde(rename = "envio_cp")]
    pub postal_code: String,
    #[serde(rename = "envio_nombre_destinatario")]
    pub recipient: String,
    /// Delivery references (optional).
    #[serde(rename = "envio_referencias", default)]
    pub notes: String,
}

/// How the order reaches the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Picked up at the store.
    Pickup,
    Shipping(ShippingAddress),
}

impl Delivery {
    pub fn method(&self) -> DeliveryMethod {
        match self {
            Delivery::Pickup => DeliveryMethod::Pickup,
            Delivery::Shipping(_) => DeliveryMethod::Shipping,
        }
    }
}

/// `metodo_entrega` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DeliveryMethod {
    #[serde(rename = "retiro")]
    Pickup,
    #[serde(rename = "envio")]
    Shipping,
}

// =============================================================================
// Order Request
// =============================================================================

/// The order payload.
///
/// `productos` is the cart serialized as a JSON string, exactly as stored.
/// Shipping keys are present only for shipped orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(flatten)]
    pub contact: ContactInfo,

    #[serde(rename = "metodo_entrega")]
    pub delivery_method: DeliveryMethod,

    #[serde(rename = "productos")]
    pub products: String,

    pub total: Money,

    #[serde(flatten)]
    pub shipping: Option<ShippingAddress>,
}

impl OrderRequest {
    /// Builds the payload from the cart being checked out.
    pub fn from_cart(
        contact: ContactInfo,
        delivery: Delivery,
        cart: &Cart,
    ) -> serde_json::Result<Self> {
        let delivery_method = delivery.method();
        let shipping = match delivery {
            Delivery::Pickup => None,
            Delivery::Shipping(address) => Some(address),
        };

        Ok(OrderRequest {
            contact,
            delivery_method,
            products: cart.to_storage_json()?,
            total: cart.total(),
            shipping,
        })
    }

    /// The delivery choice this payload encodes.
    pub fn delivery(&self) -> Delivery {
        match (self.delivery_method, &self.shipping) {
            (DeliveryMethod::Shipping, Some(address)) => Delivery::Shipping(address.clone()),
            (DeliveryMethod::Shipping, None) => Delivery::Shipping(ShippingAddress::default()),
            (DeliveryMethod::Pickup, _) => Delivery::Pickup,
        }
    }
}

// =============================================================================
// Order Response
// =============================================================================

/// Reply of the backend save call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderResponse {
    pub success: bool,

    #[serde(rename = "pedido_id", default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub order_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrderResponse {
    pub fn saved(order_id: i64) -> Self {
        OrderResponse {
            success: true,
            order_id: Some(order_id),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        OrderResponse {
            success: false,
            order_id: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Admin-side processing state of a saved order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum OrderStatus {
    #[serde(rename = "pendiente")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "pendiente"))]
    Pending,
    #[serde(rename = "procesando")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "procesando"))]
    Processing,
    #[serde(rename = "completado")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "completado"))]
    Completed,
    #[serde(rename = "cancelado")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "cancelado"))]
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl OrderStatus {
    /// Parses the admin form value; `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pendiente" => Some(OrderStatus::Pending),
            "procesando" => Some(OrderStatus::Processing),
            "completado" => Some(OrderStatus::Completed),
            "cancelado" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pendiente",
            OrderStatus::Processing => "procesando",
            OrderStatus::Completed => "completado",
            OrderStatus::Cancelled => "cancelado",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
