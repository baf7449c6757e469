use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use session_core::{CategorySource, ProductSource};
use std::{collections::HashSet, fs, path::Path, sync::Arc, time::Duration};
use tracing::debug;

use shared::{
    domain::{Category, CategoryId, Product, ProductId},
    error::CatalogError,
    page::page_slice,
};

mod seed;

pub use seed::{demo_categories, demo_products};

/// Fixed in-memory catalog serving both the product and the category side.
///
/// Cloning is cheap; clones share the same data.
#[derive(Clone)]
pub struct InMemoryCatalog {
    categories: Arc<[Category]>,
    products: Arc<[Product]>,
    latency: Duration,
}

#[derive(Debug, Deserialize)]
struct CatalogSeed {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Result<Self> {
        ensure_unique("category", categories.iter().map(|c| c.id.as_str()))?;
        ensure_unique("product", products.iter().map(|p| p.id.as_str()))?;
        Ok(Self {
            categories: categories.into(),
            products: products.into(),
            latency: Duration::ZERO,
        })
    }

    /// The four-category, ten-product demo storefront.
    pub fn demo() -> Self {
        Self {
            categories: demo_categories().into(),
            products: demo_products().into(),
            latency: Duration::ZERO,
        }
    }

    /// Loads a catalog from a JSON file with `categories` and `products` arrays.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog seed '{}'", path.display()))?;
        let seed: CatalogSeed = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse catalog seed '{}'", path.display()))?;
        debug!(
            path = %path.display(),
            categories = seed.categories.len(),
            products = seed.products.len(),
            "loaded catalog seed"
        );
        Self::new(seed.categories, seed.products)
    }

    /// Delays every call by `latency`, standing in for a remote backend.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn ensure_unique<'a>(entity: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            bail!("duplicate {entity} id '{id}' in catalog seed");
        }
    }
    Ok(())
}

#[async_trait]
impl ProductSource for InMemoryCatalog {
    async fn fetch_products(
        &self,
        page: usize,
        page_size: usize,
        category_id: Option<&CategoryId>,
    ) -> Result<Vec<Product>, CatalogError> {
        self.simulate_latency().await;
        let filtered: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| category_id.map_or(true, |id| &p.category_id == id))
            .collect();
        Ok(page_slice(&filtered, page, page_size)
            .iter()
            .map(|p| (*p).clone())
            .collect())
    }

    async fn fetch_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.simulate_latency().await;
        self.products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("product", id.as_str()))
    }

    async fn search(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Product>, CatalogError> {
        self.simulate_latency().await;
        let matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| p.matches_query(query))
            .collect();
        Ok(page_slice(&matches, page, page_size)
            .iter()
            .map(|p| (*p).clone())
            .collect())
    }
}

#[async_trait]
impl CategorySource for InMemoryCatalog {
    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.simulate_latency().await;
        Ok(self.categories.to_vec())
    }

    async fn fetch_category(&self, id: &CategoryId) -> Result<Category, CatalogError> {
        self.simulate_latency().await;
        self.categories
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("category", id.as_str()))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
