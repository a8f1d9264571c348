//! Display values derived from controller state. Nothing here is stored.

use shared::domain::Product;

use crate::{query::QueryState, CatalogView};

const LOW_STOCK_THRESHOLD: u32 = 10;
const MAX_STARS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub title: String,
    pub category: String,
    pub brand: Option<String>,
    pub price_label: String,
    pub rating_label: String,
    pub filled_stars: u32,
    pub low_stock: bool,
    pub discount_badge: Option<String>,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        let discount_badge = (product.discount_percentage > 0.0)
            .then(|| format!("-{:.0}%", product.discount_percentage.round()));
        let filled_stars = (product.rating.max(0.0).floor() as u32).min(MAX_STARS);

        Self {
            title: product.title.clone(),
            category: product.category.clone(),
            brand: product.brand.clone().filter(|brand| !brand.is_empty()),
            price_label: format!("${}", product.price),
            rating_label: format!("{:.1}", round_to_tenths(product.rating)),
            filled_stars,
            low_stock: product.stock < LOW_STOCK_THRESHOLD,
            discount_badge,
        }
    }
}

/// Halves round away from zero; `{:.1}` alone would round them to even.
fn round_to_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `Showing 12 of 194 products for "phone"`.
pub fn results_summary(view: &CatalogView) -> String {
    let mut summary = format!(
        "Showing {} of {} products",
        view.results.items.len(),
        view.results.total_count
    );
    if view.query.is_searching() {
        summary.push_str(&format!(" for \"{}\"", view.query.search_term));
    } else if let Some(category) = view.query.active_category() {
        summary.push_str(&format!(" in {category}"));
    }
    summary
}

pub fn page_label(view: &CatalogView) -> String {
    format!(
        "Page {} of {}",
        view.pagination.page, view.pagination.total_pages
    )
}

pub fn empty_state_message(query: &QueryState) -> String {
    if query.is_searching() {
        format!("No results for \"{}\"", query.search_term)
    } else {
        "Try adjusting your filters".to_string()
    }
}
