//! # Storefront Configuration
//!
//! Settings shared by the catalog page, the cart page and checkout.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RMKITS_DATABASE_PATH=/var/lib/rmkits/tienda.db                     │
//! │     RMKITS_MINIMUM_ORDER=250000                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ./rmkits.toml, or the path given on the command line               │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # rmkits.toml
//! database_path = "productos.db"
//! minimum_order_total = 200000
//! products_per_page = 24
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use rmkits_core::{Money, DEFAULT_MINIMUM_ORDER, PRODUCTS_PER_PAGE, STORAGE_KEY};

/// File looked up when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "rmkits.toml";

/// Storefront settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Storage slot key of the cart blob.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Smallest order total accepted at checkout, in pesos.
    #[serde(default = "default_minimum_order_total")]
    pub minimum_order_total: Money,

    /// Catalog page size.
    #[serde(default = "default_products_per_page")]
    pub products_per_page: usize,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("productos.db")
}

fn default_storage_key() -> String {
    STORAGE_KEY.to_string()
}

fn default_minimum_order_total() -> Money {
    DEFAULT_MINIMUM_ORDER
}

fn default_products_per_page() -> usize {
    PRODUCTS_PER_PAGE
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        StorefrontConfig {
            database_path: default_database_path(),
            storage_key: default_storage_key(),
            minimum_order_total: default_minimum_order_total(),
            products_per_page: default_products_per_page(),
        }
    }
}

impl StorefrontConfig {
    /// Loads configuration: defaults, then the TOML file (if it exists),
    /// then `RMKITS_*` environment variables. The result is validated.
    pub fn load(config_path: Option<PathBuf>) -> DbResult<Self> {
        let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            info!(?path, "Loading storefront config from file");
            let contents = std::fs::read_to_string(&path)?;
            toml::from_str(&contents)?
        } else {
            debug!(?path, "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns the defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Writes the configuration as TOML.
    pub fn save(&self, path: &Path) -> DbResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| DbError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DbResult<()> {
        if self.storage_key.trim().is_empty() {
            return Err(DbError::Config("storage_key must not be empty".into()));
        }

        if self.products_per_page == 0 {
            return Err(DbError::Config(
                "products_per_page must be greater than 0".into(),
            ));
        }

        if self.minimum_order_total.is_negative() {
            return Err(DbError::Config(
                "minimum_order_total must not be negative".into(),
            ));
        }

        Ok(())
    }

    /// Applies `RMKITS_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`. Unparseable numbers are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("RMKITS_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = PathBuf::from(path);
        }

        if let Some(key) = lookup("RMKITS_STORAGE_KEY") {
            self.storage_key = key;
        }

        if let Some(minimum) = lookup("RMKITS_MINIMUM_ORDER") {
            match minimum.trim().parse::<i64>() {
                Ok(pesos) => {
                    debug!(pesos, "Overriding minimum order from environment");
                    self.minimum_order_total = Money::from_pesos(pesos);
                }
                Err(_) => warn!(value = %minimum, "Ignoring invalid RMKITS_MINIMUM_ORDER"),
            }
        }

        if let Some(per_page) = lookup("RMKITS_PRODUCTS_PER_PAGE") {
            if let Ok(n) = per_page.trim().parse::<usize>() {
                self.products_per_page = n;
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
