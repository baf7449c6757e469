use async_trait::async_trait;
use shared::{
    domain::{Category, CategoryId, Product, ProductId},
    error::CatalogError,
};

mod controller;
pub mod error;
mod executor;
pub mod reducer;
pub mod state;

pub use controller::{CatalogSessionController, SessionSettings, StateStream};
pub use error::SessionError;
pub use reducer::StaleFetchPolicy;
pub use state::{BrowsingState, CatalogEvent};

/// Read side of the product catalog.
///
/// Listing and search share the same paging rules: the matching products are
/// split into pages of `page_size`, 1-indexed, and a page past the end is an
/// empty success.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn fetch_products(
        &self,
        page: usize,
        page_size: usize,
        category_id: Option<&CategoryId>,
    ) -> Result<Vec<Product>, CatalogError>;

    async fn fetch_product(&self, id: &ProductId) -> Result<Product, CatalogError>;

    /// Case-insensitive substring match against name or description.
    async fn search(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Product>, CatalogError>;
}

#[async_trait]
pub trait CategorySource: Send + Sync {
    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError>;
    async fn fetch_category(&self, id: &CategoryId) -> Result<Category, CatalogError>;
}

/// Source that fails every call; stands in when no backend is configured.
pub struct UnavailableSource;

#[async_trait]
impl ProductSource for UnavailableSource {
    async fn fetch_products(
        &self,
        page: usize,
        _page_size: usize,
        _category_id: Option<&CategoryId>,
    ) -> Result<Vec<Product>, CatalogError> {
        Err(CatalogError::source_failure(format!(
            "product source unavailable for page {page}"
        )))
    }

    async fn fetch_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        Err(CatalogError::source_failure(format!(
            "product source unavailable for product {id}"
        )))
    }

    async fn search(
        &self,
        _query: &str,
        page: usize,
        _page_size: usize,
    ) -> Result<Vec<Product>, CatalogError> {
        Err(CatalogError::source_failure(format!(
            "product search unavailable for page {page}"
        )))
    }
}

#[async_trait]
impl CategorySource for UnavailableSource {
    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Err(CatalogError::source_failure("category source unavailable"))
    }

    async fn fetch_category(&self, id: &CategoryId) -> Result<Category, CatalogError> {
        Err(CatalogError::source_failure(format!(
            "category source unavailable for category {id}"
        )))
    }
}
