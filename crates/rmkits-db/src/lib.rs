//! # rmkits-db: Persistence Layer for the RM KITS Storefront
//!
//! SQLite storage for the catalog, the stored cart and checkout orders, plus
//! the storefront configuration and the cart session that ties them to the
//! pure logic in `rmkits-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      RM KITS Storefront Data Flow                       │
//! │                                                                         │
//! │  Page action (load cart, +, −, add, checkout)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   rmkits-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────┐   ┌──────────────────┐  │   │
//! │  │   │ CartSession  │──►│ Repositories  │──►│    Database      │  │   │
//! │  │   │ (session.rs) │   │ Product       │   │    (pool.rs)     │  │   │
//! │  │   │ load / act / │   │ CartSlot      │   │ SqlitePool, WAL  │  │   │
//! │  │   │ save         │   │ Order         │   │ 001_initial.sql  │  │   │
//! │  │   └──────┬───────┘   └───────────────┘   └──────────────────┘  │   │
//! │  │          │ StorefrontConfig (config.rs)                         │   │
//! │  └──────────┼──────────────────────────────────────────────────────┘   │
//! │             ▼                                                           │
//! │  rmkits-core: Cart, reconcile, normalize, validate_order               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and session error types
//! - [`repository`] - Product, cart slot and order repositories
//! - [`config`] - Storefront configuration (TOML + environment)
//! - [`session`] - The cart session
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rmkits_db::{CartSession, Database, DbConfig, StorefrontConfig};
//!
//! let config = StorefrontConfig::load_or_default(None);
//! let db = Database::new(DbConfig::from_storefront(&config)).await?;
//!
//! let mut session = CartSession::load(db, &config).await?;
//! session.increase(0).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::StorefrontConfig;
pub use error::{DbError, DbResult, SessionError, SessionResult};
pub use pool::{Database, DbConfig};
pub use session::CartSession;

// Repository re-exports for convenience
pub use repository::{CartSlotRepository, OrderRepository, ProductRepository, SavedOrder};
