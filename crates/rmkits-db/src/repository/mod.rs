//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartSession / seed / admin tooling                                     │
//! │       │                                                                 │
//! │       │  db.products().snapshot()                                       │
//! │       ▼                                                                 │
//! │  ProductRepository        CartSlotRepository      OrderRepository       │
//! │  ├── list_catalog()       ├── load(key)           ├── save(request)     │
//! │  ├── snapshot()           ├── save(key, value)    ├── set_status()      │
//! │  ├── get_by_code()        └── clear(key)          ├── get() / list()    │
//! │  ├── insert()                                     └── delete_all()      │
//! │  └── update_price/stock, set_active                                     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Catalog rows and the cart snapshot
//! - [`CartSlotRepository`] - The stored cart blob
//! - [`OrderRepository`] - Checkout saves and order status

pub mod cart;
pub mod order;
pub mod product;

pub use cart::CartSlotRepository;
pub use order::{OrderRepository, SavedOrder};
pub use product::ProductRepository;
