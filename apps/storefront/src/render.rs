use std::fmt::Write;

use session_core::BrowsingState;
use shared::domain::{Category, Product};

pub fn render_state(state: &BrowsingState) -> String {
    let mut out = String::new();
    let filter = state
        .selected_category_id
        .as_ref()
        .map_or("all categories", |id| id.as_str());
    let _ = writeln!(
        out,
        "{} product(s) in {filter}, page {}{}",
        state.products.len(),
        state.current_page,
        if state.has_more_pages { " (more available)" } else { "" },
    );
    if !state.search_query.trim().is_empty() {
        let _ = writeln!(out, "search: \"{}\"", state.search_query);
    }
    for product in &state.products {
        let _ = writeln!(out, "  {}", render_product(product));
    }
    if let Some(error) = &state.error {
        let _ = writeln!(out, "error: {error}");
    }
    out
}

pub fn render_product(product: &Product) -> String {
    format!(
        "[{}] {} - {:.2} ({:.1}/5, {} reviews) [{}]",
        product.id,
        product.name,
        product.price,
        product.rating,
        product.review_count,
        product.category_id,
    )
}

pub fn render_categories(categories: &[Category]) -> String {
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(out, "{}\t{}", category.id, category.name);
    }
    out
}
