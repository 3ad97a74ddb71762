//! # Catalog View
//!
//! Search, category filter and pagination for the catalog page.
//!
//! ```text
//! products ──► CatalogFilter::apply() ──► paginate(page, per_page) ──► Page
//!              title contains query        1-based, clamped
//!              category matches
//!              stock > 0
//! ```

use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::types::CatalogProduct;

/// Products shown per catalog page.
pub const PRODUCTS_PER_PAGE: usize = 24;

// =============================================================================
// Text Normalization
// =============================================================================

/// Trims, lowercases and strips accents (`" Cotillón "` → `"cotillon"`).
pub fn normalize_text(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Maps a category label to its filter value.
///
/// Toy and party labels share one bucket; stationery has its own. Anything
/// else is compared by its normalized text. Empty means "all categories".
///
/// ## Example
/// ```rust
/// use rmkits_core::catalog::normalize_category;
///
/// assert_eq!(normalize_category("Juguetería"), "jugueteria/cotillon");
/// assert_eq!(normalize_category("COTILLÓN"), "jugueteria/cotillon");
/// assert_eq!(normalize_category("Librería escolar"), "libreria");
/// assert_eq!(normalize_category("Bazar"), "bazar");
/// ```
pub fn normalize_category(s: &str) -> String {
    let s = normalize_text(s);
    if s.contains("jugueteria") || s.contains("cotillon") {
        return "jugueteria/cotillon".to_string();
    }
    if s.contains("libreria") {
        return "libreria".to_string();
    }
    s
}

// =============================================================================
// Filter
// =============================================================================

/// The search box and the category buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    query: String,
    category: String,
}

impl CatalogFilter {
    /// Creates a filter; empty strings match everything.
    pub fn new(query: &str, category: &str) -> Self {
        CatalogFilter {
            query: query.trim().to_lowercase(),
            category: normalize_category(category),
        }
    }

    /// Whether the product is listed under this filter.
    pub fn matches(&self, product: &CatalogProduct) -> bool {
        let text_ok = self.query.is_empty() || product.title.to_lowercase().contains(&self.query);
        let category_ok = self.category.is_empty()
            || normalize_category(product.category.as_deref().unwrap_or_default()) == self.category;
        text_ok && category_ok && product.in_stock()
    }

    /// Keeps the matching products, in their original order.
    pub fn apply<'a>(&self, products: &'a [CatalogProduct]) -> Vec<&'a CatalogProduct> {
        products.iter().filter(|p| self.matches(p)).collect()
    }

    /// The normalized category, as written back to the `cat` URL parameter.
    pub fn category(&self) -> &str {
        &self.category
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number, clamped to `1..=total_pages`.
    pub page: usize,
    /// At least 1, even for an empty result.
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Slices `items` into the requested page.
///
/// ## Example
/// ```rust
/// use rmkits_core::catalog::paginate;
///
/// let items: Vec<u32> = (1..=50).collect();
/// let page = paginate(&items, 3, 24);
/// assert_eq!(page.items, vec![49, 50]);
/// assert_eq!(page.total_pages, 3);
/// assert!(page.has_prev && !page.has_next);
/// ```
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());

    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        total_pages,
        has_prev: page > 1,
        has_next: page < total_pages,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn product(title: &str, category: Option<&str>, stock: u32) -> CatalogProduct {
        CatalogProduct {
            id: 1,
            code: title.to_uppercase(),
            title: title.to_string(),
            price: Money::from_pesos(100),
            stock,
            minimum: 1,
            step: 1,
            image: None,
            category: category.map(str::to_string),
            description: None,
        }
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Cotillón  "), "cotillon");
        assert_eq!(normalize_text("PIÑATA"), "pinata");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_category_buckets() {
        assert_eq!(normalize_category("Cotillon y fiestas"), "jugueteria/cotillon");
        assert_eq!(normalize_category("jugueteria/cotillon"), "jugueteria/cotillon");
        assert_eq!(normalize_category("LIBRERÍA"), "libreria");
        assert_eq!(normalize_category("  "), "");
    }

    #[test]
    fn test_filter_by_text_category_and_stock() {
        let products = vec![
            product("Globos perlados", Some("Cotillón"), 10),
            product("Globos metalizados", Some("Cotillón"), 0),
            product("Cuaderno rayado", Some("Librería"), 5),
            product("Pelota", Some("Juguetería"), 3),
            product("Vaso", None, 3),
        ];

        let all = CatalogFilter::default().apply(&products);
        assert_eq!(all.len(), 4);

        let globos = CatalogFilter::new("GLOBOS", "").apply(&products);
        assert_eq!(globos.len(), 1);
        assert_eq!(globos[0].title, "Globos perlados");

        let toys = CatalogFilter::new("", "jugueteria").apply(&products);
        let titles: Vec<_> = toys.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Globos perlados", "Pelota"]);

        let school = CatalogFilter::new("", "libreria");
        assert_eq!(school.category(), "libreria");
        assert_eq!(school.apply(&products).len(), 1);
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=30).collect();

        let first = paginate(&items, 1, PRODUCTS_PER_PAGE);
        assert_eq!(first.items.len(), 24);
        assert_eq!(first.total_pages, 2);
        assert!(!first.has_prev);
        assert!(first.has_next);

        let past_end = paginate(&items, 9, PRODUCTS_PER_PAGE);
        assert_eq!(past_end.page, 2);
        assert_eq!(past_end.items, (25..=30).collect::<Vec<_>>());
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate::<u32>(&[], 0, PRODUCTS_PER_PAGE);
        assert!(page.items.is_empty());
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_prev && !page.has_next);
    }
}
