//! Browsing state published by a catalog session and the UI events that drive it.

use serde::{Deserialize, Serialize};
use shared::domain::{Category, CategoryId, Product};

/// Snapshot of one catalog-browsing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowsingState {
    pub is_loading: bool,
    /// Appended to by load-more, reset by category, search and refresh.
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    /// `None` lists every category.
    pub selected_category_id: Option<CategoryId>,
    pub search_query: String,
    /// 1-based; back to 1 whenever `products` is reset.
    pub current_page: usize,
    /// Whether the most recently settled fetch returned a full page.
    pub has_more_pages: bool,
    pub error: Option<String>,
}

impl Default for BrowsingState {
    fn default() -> Self {
        Self {
            is_loading: false,
            products: Vec::new(),
            categories: Vec::new(),
            selected_category_id: None,
            search_query: String::new(),
            current_page: 1,
            has_more_pages: true,
            error: None,
        }
    }
}

impl BrowsingState {
    pub fn can_load_more(&self) -> bool {
        self.has_more_pages && !self.is_loading
    }

    pub fn has_searchable_query(&self) -> bool {
        !self.search_query.trim().is_empty()
    }

    /// Resets the listing to page 1 and marks a fetch as in flight.
    pub(crate) fn restart_listing(&mut self) {
        self.current_page = 1;
        self.products.clear();
        self.is_loading = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    SearchQueryChanged(String),
    CategorySelected(Option<CategoryId>),
    LoadMoreProducts,
    RefreshProducts,
    Search,
}

impl CatalogEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CatalogEvent::SearchQueryChanged(_) => "search_query_changed",
            CatalogEvent::CategorySelected(_) => "category_selected",
            CatalogEvent::LoadMoreProducts => "load_more_products",
            CatalogEvent::RefreshProducts => "refresh_products",
            CatalogEvent::Search => "search",
        }
    }
}
