//! # Seed Data Generator
//!
//! Populates the database with catalog products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p rmkits-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p rmkits-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p rmkits-db --bin seed -- --db ./data/tienda.db
//! ```
//!
//! ## Generated Products
//! Party supplies, toys and stationery, each sold in packs:
//! - Code: `{PREFIX}{INDEX:04}` (e.g. `C0012`)
//! - Pack size 1, 6, 12 or 24; minimum order of one pack
//! - Stock: a few packs, sometimes zero (hidden from the catalog)

use std::env;

use rmkits_core::{CatalogProduct, Money};
use rmkits_db::{Database, DbConfig, StorefrontConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Categories with their code prefix and product names.
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "C",
        "Cotillón",
        &[
            "Globos perlados",
            "Globos metalizados",
            "Guirnalda feliz cumpleaños",
            "Velas bengala",
            "Bonetes de cartón",
            "Antifaces",
            "Serpentinas",
            "Confeti metalizado",
            "Piñata estrella",
            "Vasos descartables",
        ],
    ),
    (
        "J",
        "Juguetería",
        &[
            "Burbujeros",
            "Autitos a fricción",
            "Pelotas de goma",
            "Yo-yo luminoso",
            "Slime",
            "Rompecabezas 24 piezas",
            "Muñeca articulada",
            "Trompo",
        ],
    ),
    (
        "L",
        "Librería",
        &[
            "Cuaderno tapa dura",
            "Lápices de colores",
            "Marcadores al agua",
            "Goma de borrar",
            "Sacapuntas",
            "Plasticola",
            "Block de hojas",
            "Regla 20 cm",
        ],
    ),
    (
        "E",
        "Escolar",
        &["Cartuchera", "Mochila", "Vianda", "Botella térmica"],
    ),
];

const PACK_SIZES: &[u32] = &[1, 6, 12, 24];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rmkits=debug,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("RM KITS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: from rmkits.toml)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = StorefrontConfig::load_or_default(None);
    let db_config = match db_path {
        Some(path) => DbConfig::new(path),
        None => DbConfig::from_storefront(&config),
    };

    info!(database = %db_config.database_path.display(), count, "Seeding catalog");

    let db = Database::new(db_config).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(
            existing,
            "Database already has products, skipping seed. Delete the file to regenerate."
        );
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;
    let mut seed = 0usize;

    'outer: for round in 0.. {
        for (prefix, category, names) in CATEGORIES {
            for name in names.iter() {
                if generated >= count {
                    break 'outer;
                }

                let product = generate_product(prefix, category, name, round, seed);
                seed += 1;

                if let Err(e) = db.products().insert(&product).await {
                    warn!(code = %product.code, error = %e, "Failed to insert product");
                    continue;
                }

                generated += 1;
                if generated % 100 == 0 {
                    info!(generated, "Seeding in progress");
                }
            }
        }
    }

    let snapshot = db.products().snapshot().await?;
    let listed = db.products().list_catalog().await?;

    info!(
        generated,
        in_snapshot = snapshot.len(),
        in_catalog = listed.len(),
        elapsed = ?start.elapsed(),
        "Seed complete"
    );

    Ok(())
}

/// Generates one product with plausible wholesale data.
fn generate_product(
    prefix: &str,
    category: &str,
    name: &str,
    round: usize,
    seed: usize,
) -> CatalogProduct {
    let step = PACK_SIZES[seed % PACK_SIZES.len()];

    // Unit price: $150 - $9.950 in steps of $50
    let price = Money::from_pesos(150 + ((seed * 37) % 197) as i64 * 50);

    // 0 - 10 packs; every ninth product is sold out
    let packs = if seed % 9 == 0 { 0 } else { (seed % 10) as u32 + 1 };

    let title = if round == 0 {
        name.to_string()
    } else {
        format!("{} x{}", name, round + 1)
    };

    CatalogProduct {
        id: 0,
        code: format!("{}{:04}", prefix, seed),
        title,
        price,
        stock: packs * step,
        minimum: step,
        step,
        image: Some(format!("{}{:04}.jpg", prefix.to_lowercase(), seed)),
        category: Some(category.to_string()),
        description: None,
    }
}
