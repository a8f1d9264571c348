//! Plain-text rendering of controller state.

use catalog_core::{
    view::{empty_state_message, page_label, results_summary, ProductCard},
    CatalogView, FetchStatus,
};
use shared::domain::Category;

pub fn render_view(view: &CatalogView) -> String {
    let mut lines = vec![results_summary(view), page_label(view), String::new()];

    match &view.results.status {
        FetchStatus::Idle => lines.push("Nothing loaded yet.".to_string()),
        FetchStatus::Loading => lines.push("Loading products...".to_string()),
        FetchStatus::Failed(message) => {
            lines.push(message.clone());
            lines.push("Type `retry` to try again.".to_string());
        }
        FetchStatus::Ready if view.results.items.is_empty() => {
            lines.push(empty_state_message(&view.query));
            lines.push("Type `clear` to clear all filters.".to_string());
        }
        FetchStatus::Ready => {
            lines.extend(
                view.results
                    .items
                    .iter()
                    .map(|product| render_card(&ProductCard::from(product))),
            );
            if view.pagination.shows_controls() {
                lines.push(String::new());
                lines.push(render_pagination(view));
            }
        }
    }

    lines.join("\n")
}

fn render_card(card: &ProductCard) -> String {
    let mut line = format!(
        "{:<40} {:>10}  {} ({}/5)  [{}]",
        card.title, card.price_label, card.rating_label, card.filled_stars, card.category
    );
    if let Some(brand) = &card.brand {
        line.push_str(&format!("  {brand}"));
    }
    if let Some(badge) = &card.discount_badge {
        line.push_str(&format!("  {badge}"));
    }
    if card.low_stock {
        line.push_str("  LOW STOCK");
    }
    line
}

fn render_pagination(view: &CatalogView) -> String {
    let pagination = &view.pagination;
    let mut parts = Vec::new();
    if pagination.has_prev {
        parts.push("< prev".to_string());
    }
    parts.extend(pagination.window.iter().map(|page| {
        if *page == pagination.page {
            format!("[{page}]")
        } else {
            page.to_string()
        }
    }));
    if pagination.has_next {
        parts.push("next >".to_string());
    }
    parts.join("  ")
}

pub fn render_categories(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories available.".to_string();
    }
    let mut lines = vec![format!("{:<24} All Categories", "all")];
    lines.extend(
        categories
            .iter()
            .map(|category| format!("{:<24} {}", category.id, category.label)),
    );
    lines.join("\n")
}
